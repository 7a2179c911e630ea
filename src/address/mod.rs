//! Mail addresses and mailboxes.
//!
//! [`Address`] is a validated `local@domain` pair used in the SMTP envelope;
//! [`Mailbox`] adds an optional display name and is what message headers render.

mod domain;
mod error;
mod local;

pub use error::AddressError;

use std::fmt::{self, Write as _};
use std::str::FromStr;

use domain::check_domain;
use local::{is_phrase, is_valid_local};

/// A validated `local@domain` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    local: String,
    domain: String,
    ascii_domain: String,
}

impl Address {
    pub fn new(local: &str, domain: &str) -> Result<Self, AddressError> {
        let total = local.len() + 1 + domain.len();
        if total > 254 {
            return Err(AddressError::TooLong(total));
        }
        if local.is_empty() || local.len() > 64 || !is_valid_local(local) {
            return Err(AddressError::InvalidLocal(local.to_string()));
        }

        let mut reasons = Vec::new();
        let ascii_domain = check_domain(domain, &mut reasons);
        match ascii_domain {
            Some(ascii_domain) if reasons.is_empty() => Ok(Self {
                local: local.to_string(),
                domain: domain.to_string(),
                ascii_domain,
            }),
            _ => Err(AddressError::invalid_domain(reasons)),
        }
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Form used in `MAIL FROM` / `RCPT TO`: the domain in its IDNA ASCII encoding.
    pub fn envelope(&self) -> String {
        format!("{}@{}", self.local, self.ascii_domain)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.len() > 254 {
            return Err(AddressError::TooLong(input.len()));
        }
        let (local, domain) = input.rsplit_once('@').ok_or(AddressError::MissingAt)?;
        Self::new(local, domain)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

/// An address with an optional display name, e.g. `John Doe <john@example.com>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox {
    name: Option<String>,
    email: Address,
}

impl Mailbox {
    /// Fails when `name` contains control characters (CR and LF included),
    /// which would otherwise break out of the header line it is rendered into.
    pub fn new(name: Option<String>, email: Address) -> Result<Self, AddressError> {
        if let Some(name) = &name {
            if name.chars().any(char::is_control) {
                return Err(AddressError::InvalidName(name.clone()));
            }
        }
        Ok(Self { name, email })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> &Address {
        &self.email
    }
}

impl From<Address> for Mailbox {
    fn from(email: Address) -> Self {
        Self { name: None, email }
    }
}

impl FromStr for Mailbox {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let Some(rest) = input.strip_suffix('>') else {
            if input.contains(['<', '>']) {
                return Err(AddressError::UnbalancedBrackets(input.to_string()));
            }
            return Ok(Self::from(input.parse::<Address>()?));
        };
        let open = rest
            .rfind('<')
            .ok_or_else(|| AddressError::UnbalancedBrackets(input.to_string()))?;
        let email: Address = rest[open + 1..].parse()?;
        let name = unquote(rest[..open].trim());
        Self::new((!name.is_empty()).then_some(name), email)
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return fmt::Display::fmt(&self.email, f);
        }
        if is_phrase(name) {
            f.write_str(name)?;
        } else {
            f.write_char('"')?;
            for c in name.chars() {
                if matches!(c, '"' | '\\') {
                    f.write_char('\\')?;
                }
                f.write_char(c)?;
            }
            f.write_char('"')?;
        }
        write!(f, " <{}>", self.email)
    }
}

fn unquote(name: &str) -> String {
    let Some(inner) = name
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return name.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
