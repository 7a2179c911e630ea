use std::fmt;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use native_tls::{HandshakeError, TlsConnector, TlsStream};

use super::Credentials;
use super::error::{CommandError, TransportError};

/// A complete (possibly multi-line) server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        for line in &self.lines {
            write!(f, " {line}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
enum StreamState {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

#[derive(Debug)]
pub(crate) struct SmtpStream {
    state: StreamState,
    buffer: Vec<u8>,
}

impl SmtpStream {
    /// Connects to the first reachable address, applying `timeout` to the
    /// connect and to every subsequent read and write.
    pub(crate) fn connect(
        addrs: &[SocketAddr],
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut last_err = None;
        for addr in addrs {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    stream
                        .set_read_timeout(timeout)
                        .and_then(|()| stream.set_write_timeout(timeout))
                        .map_err(|source| TransportError::Connect { source })?;
                    #[cfg(feature = "with-tracing")]
                    tracing::debug!(%addr, "connected");
                    return Ok(Self {
                        state: StreamState::Plain(stream),
                        buffer: Vec::new(),
                    });
                }
                Err(err) => {
                    #[cfg(feature = "with-tracing")]
                    tracing::debug!(%addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(TransportError::Connect {
            source: last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                )
            }),
        })
    }

    /// Wraps the connection in TLS before any SMTP byte is exchanged.
    pub(crate) fn into_tls(
        self,
        domain: &str,
        connector: &TlsConnector,
    ) -> Result<Self, TransportError> {
        let Self { state, buffer } = self;
        let plain = match state {
            StreamState::Plain(stream) => stream,
            StreamState::Tls(stream) => {
                return Ok(Self {
                    state: StreamState::Tls(stream),
                    buffer,
                });
            }
        };
        let tls = complete_handshake(connector, domain, plain)?;
        #[cfg(feature = "with-tracing")]
        tracing::debug!(domain, "TLS established");
        Ok(Self {
            state: StreamState::Tls(Box::new(tls)),
            buffer,
        })
    }

    pub(crate) fn is_encrypted(&self) -> bool {
        matches!(self.state, StreamState::Tls(_))
    }

    pub(crate) fn send_command(&mut self, command: &str) -> io::Result<()> {
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.write_all(&data)
    }

    pub(crate) fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match &mut self.state {
            StreamState::Plain(stream) => {
                stream.write_all(data)?;
                stream.flush()
            }
            StreamState::Tls(stream) => {
                stream.write_all(data)?;
                stream.flush()
            }
        }
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, CommandError> {
        let mut lines = Vec::new();
        let mut code: Option<u16> = None;
        loop {
            let line = self.read_line()?;
            if line.len() < 3 {
                return Err(CommandError::Protocol(format!("invalid reply: {line}")));
            }
            let parsed_code = line
                .get(..3)
                .and_then(|digits| digits.parse::<u16>().ok())
                .ok_or_else(|| CommandError::Protocol(format!("invalid code in line: {line}")))?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(CommandError::Protocol(format!(
                        "inconsistent reply codes: {existing} vs {parsed_code}"
                    )));
                }
            } else {
                code = Some(parsed_code);
            }
            let is_last = line.as_bytes().get(3) != Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if is_last {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.unwrap_or_default(),
            lines,
        })
    }

    fn read_line(&mut self) -> Result<String, CommandError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<_>>();
                if line.ends_with(b"\r\n") {
                    line.truncate(line.len() - 2);
                } else if line.ends_with(b"\n") {
                    line.truncate(line.len() - 1);
                }
                return String::from_utf8(line)
                    .map_err(|err| CommandError::Protocol(format!("utf8 error: {err}")));
            }

            let mut buf = [0u8; 512];
            let read = match &mut self.state {
                StreamState::Plain(stream) => stream.read(&mut buf),
                StreamState::Tls(stream) => stream.read(&mut buf),
            }?;
            if read == 0 {
                return Err(CommandError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }

    fn shutdown(&mut self) {
        if let StreamState::Tls(stream) = &mut self.state {
            stream.shutdown().ok();
        }
    }
}

fn complete_handshake(
    connector: &TlsConnector,
    domain: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, TransportError> {
    match connector.connect(domain, stream) {
        Ok(tls) => Ok(tls),
        Err(HandshakeError::Failure(err)) => Err(TransportError::Tls { source: err }),
        Err(HandshakeError::WouldBlock(mut mid)) => loop {
            match mid.handshake() {
                Ok(tls) => break Ok(tls),
                Err(HandshakeError::Failure(err)) => {
                    break Err(TransportError::Tls { source: err });
                }
                Err(HandshakeError::WouldBlock(next)) => mid = next,
            }
        },
    }
}

fn expect(reply: SmtpReply, codes: &[u16]) -> Result<SmtpReply, CommandError> {
    if codes.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(CommandError::Reply { reply })
    }
}

fn is_loopback_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// One SMTP session: greeting and hello done, ready for envelope commands.
#[derive(Debug)]
pub(crate) struct SmtpSession {
    stream: SmtpStream,
    extensions: Vec<String>,
}

impl SmtpSession {
    /// Reads the 220 greeting and introduces ourselves with `EHLO`, falling back to `HELO`.
    pub(crate) fn open(stream: SmtpStream, helo: &str) -> Result<Self, TransportError> {
        let mut session = Self {
            stream,
            extensions: Vec::new(),
        };

        let greeting = session
            .stream
            .read_reply()
            .and_then(|reply| expect(reply, &[220]))
            .map_err(|source| TransportError::Greeting { source })?;
        session.trace_reply(&greeting);

        let ehlo = session
            .command(&format!("EHLO {helo}"))
            .map_err(|source| TransportError::Hello { source })?;
        if ehlo.is_positive_completion() {
            session.extensions = ehlo.lines.into_iter().skip(1).collect();
            return Ok(session);
        }

        session
            .command(&format!("HELO {helo}"))
            .and_then(|reply| expect(reply, &[250]))
            .map_err(|source| TransportError::Hello { source })?;
        Ok(session)
    }

    /// Whether the server listed `keyword` in its EHLO reply.
    pub(crate) fn supports(&self, keyword: &str) -> bool {
        self.extensions.iter().any(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
        })
    }

    /// `AUTH PLAIN` with an initial response. Credentials are only sent over
    /// TLS or to a loopback host.
    pub(crate) fn auth(&mut self, credentials: &Credentials, host: &str) -> Result<(), CommandError> {
        if !self.stream.is_encrypted() && !is_loopback_host(host) {
            return Err(CommandError::Protocol(
                "refusing to send credentials over an unencrypted connection".to_string(),
            ));
        }
        if !self.supports("AUTH") {
            return Err(CommandError::Protocol(
                "server does not advertise AUTH".to_string(),
            ));
        }
        let payload = format!("\0{}\0{}", credentials.username, credentials.password);
        let encoded = general_purpose::STANDARD.encode(payload.as_bytes());
        self.command(&format!("AUTH PLAIN {encoded}"))
            .and_then(|reply| expect(reply, &[235]))
            .map(drop)
    }

    pub(crate) fn mail(&mut self, from: &str) -> Result<(), CommandError> {
        let command = if self.supports("8BITMIME") {
            format!("MAIL FROM:<{from}> BODY=8BITMIME")
        } else {
            format!("MAIL FROM:<{from}>")
        };
        self.command(&command)
            .and_then(|reply| expect(reply, &[250]))
            .map(drop)
    }

    pub(crate) fn rcpt(&mut self, to: &str) -> Result<(), CommandError> {
        self.command(&format!("RCPT TO:<{to}>"))
            .and_then(|reply| expect(reply, &[250, 251]))
            .map(drop)
    }

    /// Issues `DATA` and returns the stream the message is written into.
    pub(crate) fn data(&mut self) -> Result<DataStream<'_>, CommandError> {
        self.command("DATA")
            .and_then(|reply| expect(reply, &[354]))?;
        Ok(DataStream {
            stream: &mut self.stream,
            line_start: true,
            after_cr: false,
        })
    }

    pub(crate) fn quit(&mut self) -> Result<(), CommandError> {
        self.command("QUIT")
            .and_then(|reply| expect(reply, &[221]))
            .map(drop)
    }

    /// Shuts TLS down cleanly, then drops the socket.
    pub(crate) fn close(mut self) {
        self.stream.shutdown();
    }

    fn command(&mut self, command: &str) -> Result<SmtpReply, CommandError> {
        #[cfg(feature = "with-tracing")]
        {
            let shown = if command.starts_with("AUTH ") {
                "AUTH PLAIN <redacted>"
            } else {
                command
            };
            tracing::debug!("C: {shown}");
        }
        self.stream.send_command(command)?;
        let reply = self.stream.read_reply()?;
        self.trace_reply(&reply);
        Ok(reply)
    }

    fn trace_reply(&self, _reply: &SmtpReply) {
        #[cfg(feature = "with-tracing")]
        tracing::debug!("S: {_reply}");
    }
}

/// Writer for the message content between `DATA` and the final `.`.
///
/// Bare `\n` is written as `\r\n` and a `.` opening a line is doubled.
pub(crate) struct DataStream<'a> {
    stream: &'a mut SmtpStream,
    line_start: bool,
    after_cr: bool,
}

impl Write for DataStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = Vec::with_capacity(buf.len() + 16);
        for &byte in buf {
            if self.line_start && byte == b'.' {
                out.push(b'.');
            }
            if byte == b'\n' && !self.after_cr {
                out.push(b'\r');
            }
            out.push(byte);
            self.after_cr = byte == b'\r';
            self.line_start = byte == b'\n';
        }
        self.stream.write_all(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DataStream<'_> {
    /// Terminates the content with `<CRLF>.<CRLF>` and waits for the server to accept it.
    pub(crate) fn close(self) -> Result<SmtpReply, CommandError> {
        let terminator: &[u8] = if self.line_start {
            b".\r\n"
        } else if self.after_cr {
            b"\n.\r\n"
        } else {
            b"\r\n.\r\n"
        };
        self.stream.write_all(terminator)?;
        let reply = self.stream.read_reply()?;
        #[cfg(feature = "with-tracing")]
        tracing::debug!("S: {reply}");
        expect(reply, &[250])
    }
}
