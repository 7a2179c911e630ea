use super::Mail;
use crate::address::Mailbox;

fn mailbox(s: &str) -> Mailbox {
    s.parse().expect("valid mailbox")
}

fn sample() -> Mail {
    Mail::new(mailbox("a@x.com"))
        .to(mailbox("b@x.com"))
        .subject("hi")
        .body("there")
}

#[test]
fn new_mail_is_valid_with_empty_lists() {
    let mail = Mail::new(mailbox("a@x.com"));
    assert!(mail.is_valid());
    assert_eq!(mail.to.as_deref(), Some(&[][..]));
}

#[test]
fn absent_fields_are_reported_in_order() {
    let mut mail = sample();
    mail.cc = None;
    mail.bcc = None;
    assert!(!mail.is_valid());
    assert_eq!(mail.missing_field(), Some("cc"));

    let empty = Mail::default();
    assert_eq!(empty.missing_field(), Some("from"));
}

#[test]
fn recipients_follow_to_cc_bcc_order() {
    let mail = Mail::new(mailbox("a@x.com"))
        .bcc(mailbox("z@x.com"))
        .cc(mailbox("c@x.com"))
        .to(mailbox("b@x.com"))
        .to(mailbox("b2@x.com"));
    let order: Vec<String> = mail.recipients().map(|m| m.email().envelope()).collect();
    assert_eq!(order, ["b@x.com", "b2@x.com", "c@x.com", "z@x.com"]);
}

#[test]
fn formats_minimal_message() {
    let rendered = sample().formatted();
    assert_eq!(
        rendered,
        "From: a@x.com\r\nTo: b@x.com;\r\nCc: \r\nSubject: hi\r\n\r\nthere"
    );
}

#[test]
fn empty_cc_still_emits_cc_line_when_to_present() {
    let rendered = sample().formatted();
    assert!(rendered.contains("\r\nCc: \r\n"), "{rendered:?}");
}

#[test]
fn empty_to_omits_to_and_cc_lines() {
    let mail = Mail::new(mailbox("a@x.com"))
        .cc(mailbox("c@x.com"))
        .subject("s");
    let rendered = mail.formatted();
    assert_eq!(rendered, "From: a@x.com\r\nSubject: s\r\n\r\n");
    assert!(!rendered.contains("To:"));
    assert!(!rendered.contains("Cc:"));
}

#[test]
fn bcc_is_not_rendered() {
    let mail = sample().bcc(mailbox("Hidden Person <secret@x.com>"));
    let rendered = mail.formatted();
    assert!(!rendered.contains("secret@x.com"));
    assert!(!rendered.contains("Bcc"));
}

#[test]
fn absent_from_renders_empty_header() {
    let mut mail = sample();
    mail.from = None;
    assert!(mail.formatted().starts_with("From: \r\nTo: b@x.com;\r\n"));
}

#[test]
fn full_message_snapshot() {
    let mail = Mail::new(mailbox("John Doe <john@mail.example.com>"))
        .to(mailbox("hello@mail.example.com"))
        .to(mailbox("\"Doe, Jane\" <jane@mail.example.com>"))
        .cc(mailbox("boss@mail.example.com"))
        .bcc(mailbox("audit@mail.example.com"))
        .subject("hello")
        .body("world\nsecond line");

    insta::assert_snapshot!(mail.formatted().replace("\r\n", "\n"), @r#"
    From: John Doe <john@mail.example.com>
    To: hello@mail.example.com;"Doe, Jane" <jane@mail.example.com>;
    Cc: boss@mail.example.com;
    Subject: hello

    world
    second line
    "#);
}
