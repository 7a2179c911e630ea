use std::io;

use thiserror::Error;

use super::session::SmtpReply;

/// Errors returned by [`SmtpClient`](super::SmtpClient) construction and
/// [`send`](super::SmtpClient::send).
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("host is empty")]
    EmptyHost,
    #[error("invalid port {port}: expected 25, 465 or 587")]
    InvalidPort { port: u16 },
    #[error("invalid mail: '{missing}' is absent")]
    InvalidMessage { missing: &'static str },
    #[error("connection to {host} failed: {source}")]
    Transport {
        host: String,
        #[source]
        source: TransportError,
    },
    #[error("authentication failed: {source}")]
    Auth {
        #[source]
        source: CommandError,
    },
    #[error("sender <{address}> rejected: {source}")]
    SenderRejected {
        address: String,
        #[source]
        source: CommandError,
    },
    #[error("recipient <{address}> rejected: {source}")]
    RecipientRejected {
        address: String,
        #[source]
        source: CommandError,
    },
    #[error("message data transfer failed: {source}")]
    DataTransfer {
        #[source]
        source: CommandError,
    },
    #[error("QUIT failed after the message was accepted: {source}")]
    Quit {
        #[source]
        source: CommandError,
    },
}

impl SmtpError {
    /// `true` when the relay had already accepted the message before the
    /// error occurred, i.e. only the closing `QUIT` exchange failed.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Quit { .. })
    }

    pub(crate) fn transport(host: &str, source: TransportError) -> Self {
        Self::Transport {
            host: host.to_string(),
            source,
        }
    }
}

/// Failure to establish a usable SMTP session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("address resolution failed: {source}")]
    Resolve {
        #[source]
        source: io::Error,
    },
    #[error("TCP connect failed: {source}")]
    Connect {
        #[source]
        source: io::Error,
    },
    #[error("TLS setup failed: {source}")]
    Tls {
        #[source]
        source: native_tls::Error,
    },
    #[error("greeting failed: {source}")]
    Greeting {
        #[source]
        source: CommandError,
    },
    #[error("EHLO/HELO failed: {source}")]
    Hello {
        #[source]
        source: CommandError,
    },
}

/// Failure of a single command/reply exchange.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    #[error("unexpected reply: {reply}")]
    Reply { reply: SmtpReply },
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl CommandError {
    pub(crate) fn io(source: io::Error) -> Self {
        Self::Io { source }
    }

    /// The server reply, when the failure was a negative reply.
    pub fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Reply { reply } => Some(reply),
            _ => None,
        }
    }
}

impl From<io::Error> for CommandError {
    fn from(source: io::Error) -> Self {
        Self::io(source)
    }
}
