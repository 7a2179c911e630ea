use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must contain an '@' separating local part and domain")]
    MissingAt,
    #[error("total length {0} > 254")]
    TooLong(usize),
    #[error("invalid local part '{0}'")]
    InvalidLocal(String),
    #[error("invalid domain: {}", .reasons.join("; "))]
    InvalidDomain { reasons: Vec<String> },
    #[error("display name '{}' contains control characters", .0.escape_debug())]
    InvalidName(String),
    #[error("unbalanced angle brackets in mailbox '{0}'")]
    UnbalancedBrackets(String),
}

impl AddressError {
    pub(crate) fn invalid_domain(reasons: Vec<String>) -> Self {
        Self::InvalidDomain { reasons }
    }
}
