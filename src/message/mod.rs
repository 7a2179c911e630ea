//! The message handed to [`SmtpClient::send`](crate::SmtpClient::send) and its wire rendering.

use crate::address::Mailbox;

/// A single message. Address collections are `Option` so that an *absent*
/// collection can be told apart from a present but empty one; only messages
/// with all four present are sendable (see [`Mail::is_valid`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mail {
    pub from: Option<Mailbox>,
    pub to: Option<Vec<Mailbox>>,
    pub cc: Option<Vec<Mailbox>>,
    pub bcc: Option<Vec<Mailbox>>,
    pub subject: String,
    pub body: String,
}

impl Mail {
    /// Sendable mail from `from` with empty recipient lists, subject and body.
    pub fn new(from: Mailbox) -> Self {
        Self {
            from: Some(from),
            to: Some(Vec::new()),
            cc: Some(Vec::new()),
            bcc: Some(Vec::new()),
            subject: String::new(),
            body: String::new(),
        }
    }

    pub fn to(mut self, mailbox: Mailbox) -> Self {
        self.to.get_or_insert_with(Vec::new).push(mailbox);
        self
    }

    pub fn cc(mut self, mailbox: Mailbox) -> Self {
        self.cc.get_or_insert_with(Vec::new).push(mailbox);
        self
    }

    pub fn bcc(mut self, mailbox: Mailbox) -> Self {
        self.bcc.get_or_insert_with(Vec::new).push(mailbox);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// `true` when `from`, `to`, `cc` and `bcc` are all present. Empty lists are fine.
    pub fn is_valid(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Name of the first absent address field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.from.is_none() {
            Some("from")
        } else if self.to.is_none() {
            Some("to")
        } else if self.cc.is_none() {
            Some("cc")
        } else if self.bcc.is_none() {
            Some("bcc")
        } else {
            None
        }
    }

    /// Envelope recipients: `to`, then `cc`, then `bcc`.
    pub fn recipients(&self) -> impl Iterator<Item = &Mailbox> {
        [&self.to, &self.cc, &self.bcc]
            .into_iter()
            .flatten()
            .flat_map(|list| list.iter())
    }

    /// Renders headers and body as sent after `DATA`.
    ///
    /// `Bcc` is never rendered. The `Cc:` line is emitted whenever `to` is
    /// non-empty, even if `cc` itself is empty, and is omitted together with
    /// `To:` when `to` is empty.
    pub fn formatted(&self) -> String {
        let mut msg = String::new();

        msg.push_str("From: ");
        if let Some(from) = &self.from {
            msg.push_str(&from.to_string());
        }
        msg.push_str("\r\n");

        let to = join_mailboxes(self.to.as_deref());
        if !to.is_empty() {
            msg.push_str(&format!("To: {to}\r\n"));
            let cc = join_mailboxes(self.cc.as_deref());
            msg.push_str(&format!("Cc: {cc}\r\n"));
        }

        msg.push_str(&format!("Subject: {}\r\n", self.subject));
        msg.push_str("\r\n");
        msg.push_str(&self.body);
        msg
    }
}

/// Each mailbox followed by `;`, the trailing separator included.
fn join_mailboxes(list: Option<&[Mailbox]>) -> String {
    list.unwrap_or_default()
        .iter()
        .map(|mailbox| format!("{mailbox};"))
        .collect()
}

#[cfg(test)]
mod tests;
