//! Single-shot SMTP submission.
//!
//! [`SmtpClient::send`] opens one connection per call (plain TCP on port 25,
//! implicit TLS on 465/587), authenticates when credentials are configured,
//! runs `MAIL FROM` / `RCPT TO` / `DATA` / `QUIT` and releases the connection
//! on every exit path.

mod error;
mod options;
mod session;
mod transport;

pub use error::{CommandError, SmtpError, TransportError};
pub use options::ClientOptions;
pub use session::SmtpReply;
pub use transport::Security;

use std::fmt;
use std::io::{self, Write as _};
use std::net::{SocketAddr, ToSocketAddrs};

use crate::address::Mailbox;
use crate::message::Mail;

use session::{SmtpSession, SmtpStream};

/// Username/password pair for `AUTH PLAIN`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable relay configuration; every [`send`](Self::send) opens its own connection.
#[derive(Debug, Clone)]
pub struct SmtpClient {
    host: String,
    port: u16,
    security: Security,
    credentials: Option<Credentials>,
    options: ClientOptions,
}

impl SmtpClient {
    /// Validates `host` and `port` (25, 465 or 587). Credentials are attached
    /// only when both `username` and `password` are non-empty.
    pub fn new(host: &str, username: &str, password: &str, port: u16) -> Result<Self, SmtpError> {
        Self::with_options(host, username, password, port, ClientOptions::default())
    }

    pub fn with_options(
        host: &str,
        username: &str,
        password: &str,
        port: u16,
        options: ClientOptions,
    ) -> Result<Self, SmtpError> {
        if host.is_empty() {
            return Err(SmtpError::EmptyHost);
        }
        let security = Security::for_port(port)?;
        let credentials = (!username.is_empty() && !password.is_empty())
            .then(|| Credentials::new(username, password));

        Ok(Self {
            host: host.to_string(),
            port,
            security,
            credentials,
            options,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn security(&self) -> Security {
        self.security
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Delivers `mail` to every `to`, `cc` and `bcc` recipient.
    ///
    /// Fails with [`SmtpError::InvalidMessage`] before any network I/O when an
    /// address field is absent. The first failing step aborts the rest; there
    /// are no retries. A [`SmtpError::Quit`] means the message was already
    /// accepted (see [`SmtpError::is_delivered`]).
    pub fn send(&self, mail: &Mail) -> Result<(), SmtpError> {
        let from = sender(mail)?;
        let addrs = self.resolve()?;
        self.deliver(from, mail, &addrs)
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, SmtpError> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| {
                SmtpError::transport(&self.host, TransportError::Resolve { source })
            })?
            .collect();
        if addrs.is_empty() {
            let source = io::Error::new(io::ErrorKind::NotFound, "no addresses for host");
            return Err(SmtpError::transport(&self.host, TransportError::Resolve { source }));
        }
        Ok(addrs)
    }

    fn connect(&self, addrs: &[SocketAddr]) -> Result<SmtpSession, TransportError> {
        let stream = SmtpStream::connect(addrs, self.options.timeout())?;
        let stream = match self.security {
            Security::Plain => stream,
            Security::ImplicitTls => {
                let connector = transport::tls_connector(self.options.accept_invalid_certs)?;
                stream.into_tls(&self.host, &connector)?
            }
        };
        SmtpSession::open(stream, self.options.helo_name())
    }

    fn deliver(&self, from: &Mailbox, mail: &Mail, addrs: &[SocketAddr]) -> Result<(), SmtpError> {
        #[cfg(feature = "with-tracing")]
        tracing::debug!(host = %self.host, port = self.port, "sending mail");

        let mut session = self
            .connect(addrs)
            .map_err(|source| SmtpError::transport(&self.host, source))?;

        if let Some(credentials) = &self.credentials {
            session
                .auth(credentials, &self.host)
                .map_err(|source| SmtpError::Auth { source })?;
        }

        let sender = from.email().envelope();
        if let Err(source) = session.mail(&sender) {
            return Err(SmtpError::SenderRejected {
                address: sender,
                source,
            });
        }

        for recipient in mail.recipients() {
            let address = recipient.email().envelope();
            if let Err(source) = session.rcpt(&address) {
                return Err(SmtpError::RecipientRejected { address, source });
            }
        }

        let mut data = session
            .data()
            .map_err(|source| SmtpError::DataTransfer { source })?;
        data.write_all(mail.formatted().as_bytes())
            .map_err(|source: io::Error| SmtpError::DataTransfer {
                source: source.into(),
            })?;
        data.close()
            .map_err(|source| SmtpError::DataTransfer { source })?;

        session
            .quit()
            .map_err(|source| SmtpError::Quit { source })?;
        session.close();

        #[cfg(feature = "with-tracing")]
        tracing::debug!(host = %self.host, "mail accepted");
        Ok(())
    }
}

fn sender(mail: &Mail) -> Result<&Mailbox, SmtpError> {
    if let Some(missing) = mail.missing_field() {
        return Err(SmtpError::InvalidMessage { missing });
    }
    mail.from
        .as_ref()
        .ok_or(SmtpError::InvalidMessage { missing: "from" })
}
