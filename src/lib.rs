#![forbid(unsafe_code)]
//! mailsend_lib — minimal SMTP submission client (one connection, one message)

pub mod address;
pub use address::{Address, AddressError, Mailbox};

pub mod message;
pub use message::Mail;

pub mod client;
pub use client::{
    ClientOptions, CommandError, Credentials, Security, SmtpClient, SmtpError, SmtpReply,
    TransportError,
};
