use native_tls::TlsConnector;

use super::error::{SmtpError, TransportError};

/// How the connection is protected, derived from the configured port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// Port 25: plain TCP, no STARTTLS.
    Plain,
    /// Ports 465 and 587: TLS handshake right after connecting.
    ImplicitTls,
}

impl Security {
    pub fn for_port(port: u16) -> Result<Self, SmtpError> {
        match port {
            25 => Ok(Self::Plain),
            465 | 587 => Ok(Self::ImplicitTls),
            other => Err(SmtpError::InvalidPort { port: other }),
        }
    }
}

/// Build a `TlsConnector`; verification is disabled only when explicitly requested.
pub(crate) fn tls_connector(accept_invalid_certs: bool) -> Result<TlsConnector, TransportError> {
    let mut builder = TlsConnector::builder();
    if accept_invalid_certs {
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
    builder
        .build()
        .map_err(|source| TransportError::Tls { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_map_to_security() {
        assert_eq!(Security::for_port(25).ok(), Some(Security::Plain));
        assert_eq!(Security::for_port(465).ok(), Some(Security::ImplicitTls));
        assert_eq!(Security::for_port(587).ok(), Some(Security::ImplicitTls));
    }

    #[test]
    fn other_ports_are_invalid() {
        for port in [0, 24, 26, 110, 143, 2525, u16::MAX] {
            let err = Security::for_port(port).expect_err("port must be rejected");
            assert!(matches!(err, SmtpError::InvalidPort { port: p } if p == port));
        }
    }
}
