use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Configuration knobs for [`SmtpClient`](super::SmtpClient).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Name announced in `EHLO`/`HELO`.
    pub helo_domain: String,
    /// Connect/read/write deadline in milliseconds; `0` blocks indefinitely.
    pub timeout_ms: u64,
    /// Skip certificate chain and hostname verification on TLS ports.
    ///
    /// **Insecure**: any peer, including an attacker in the middle, is accepted.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            helo_domain: "localhost".to_string(),
            timeout_ms: 0,
            accept_invalid_certs: false,
        }
    }
}

impl ClientOptions {
    /// Return the timeout as a [`Duration`]. A zero timeout disables the
    /// connection/read deadline.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }

    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() {
            "localhost"
        } else {
            trimmed
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_helo_domain(mut self, helo_domain: impl Into<String>) -> Self {
        self.helo_domain = helo_domain.into();
        self
    }

    /// Opt into accepting any certificate. See [`ClientOptions::accept_invalid_certs`].
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Parse options from JSON; missing fields take their default.
    #[cfg(feature = "with-serde")]
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
