//! TCP/IPv4 header parsing module.
//!
//! This module is responsible for turning raw captured frames into
//! `ParsedPacket` domain values (SRP).

mod tcp_parser;

pub use tcp_parser::{NotApplicable, TcpParser, UnknownLinkPolicy};
