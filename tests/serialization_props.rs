//! Property-based tests for message rendering.

use mailsend_lib::{Address, Mail, Mailbox};
use proptest::prelude::*;

fn mailbox_strategy(domain: &'static str) -> impl Strategy<Value = Mailbox> {
    (
        "[a-z0-9]{1,8}",
        prop::option::of("[A-Z][a-z]{1,6}( [A-Z][a-z]{1,6})?"),
    )
        .prop_map(move |(local, name)| {
            #[allow(clippy::expect_used, reason = "generated parts are always valid")]
            let email = Address::new(&local, domain).expect("generated address is valid");
            #[allow(clippy::expect_used, reason = "generated names are printable")]
            Mailbox::new(name, email).expect("generated mailbox is valid")
        })
}

fn mailboxes(domain: &'static str, max: usize) -> impl Strategy<Value = Vec<Mailbox>> {
    prop::collection::vec(mailbox_strategy(domain), 0..=max)
}

fn mail_strategy() -> impl Strategy<Value = Mail> {
    (
        mailbox_strategy("from.example"),
        mailboxes("to.example", 3),
        mailboxes("cc.example", 3),
        mailboxes("bcc.hidden", 3),
        "[a-zA-Z0-9 ]{0,20}",
        "[a-zA-Z0-9 \n]{0,60}",
    )
        .prop_map(|(from, to, cc, bcc, subject, body)| Mail {
            from: Some(from),
            to: Some(to),
            cc: Some(cc),
            bcc: Some(bcc),
            subject,
            body,
        })
}

proptest! {
    /// Same input, byte-identical output.
    #[test]
    fn rendering_is_deterministic(mail in mail_strategy()) {
        let copy = mail.clone();
        prop_assert_eq!(mail.formatted(), copy.formatted());
    }

    /// Blind copies never leak into the rendered message.
    #[test]
    fn bcc_never_rendered(mail in mail_strategy()) {
        let rendered = mail.formatted();
        prop_assert!(!rendered.contains("bcc.hidden"), "bcc leaked: {:?}", rendered);
        prop_assert!(!rendered.contains("Bcc:"));
    }

    /// Without `To` recipients neither `To:` nor `Cc:` is emitted, whatever `cc` holds.
    #[test]
    fn empty_to_drops_to_and_cc(mut mail in mail_strategy()) {
        mail.to = Some(Vec::new());
        let rendered = mail.formatted();
        prop_assert!(!rendered.contains("\r\nTo: "));
        prop_assert!(!rendered.contains("\r\nCc: "));
    }

    /// With `To` recipients and no `Cc`, an empty `Cc:` line is still emitted.
    #[test]
    fn empty_cc_line_follows_to(mut mail in mail_strategy(), extra in mailbox_strategy("to.example")) {
        mail.to.get_or_insert_with(Vec::new).push(extra);
        mail.cc = Some(Vec::new());
        let rendered = mail.formatted();
        prop_assert!(rendered.contains("\r\nCc: \r\nSubject: "), "{:?}", rendered);
    }

    /// The header block always ends with the subject and a blank line before the raw body.
    #[test]
    fn body_follows_blank_line(mail in mail_strategy()) {
        let rendered = mail.formatted();
        let expected_tail = format!("Subject: {}\r\n\r\n{}", mail.subject, mail.body);
        prop_assert!(rendered.ends_with(&expected_tail));
        prop_assert!(rendered.starts_with("From: "));
    }
}
