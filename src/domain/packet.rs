//! Link-layer types and the parsed TCP/IPv4 packet.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};

/// Link-layer framing of captured frames (a libpcap `DLT_*` value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkType(pub i32);

impl LinkType {
    /// BSD loopback: 4-byte address family header.
    pub const NULL: LinkType = LinkType(0);
    /// Ethernet II: 14-byte header.
    pub const ETHERNET: LinkType = LinkType(1);
    /// Raw IP, no link-layer header.
    pub const RAW: LinkType = LinkType(101);
    /// OpenBSD loopback: same 4-byte header as `NULL`, network byte order.
    pub const LOOP: LinkType = LinkType(108);

    /// Length of the link-layer header, if this framing is recognized.
    pub fn header_len(self) -> Option<usize> {
        match self {
            Self::NULL | Self::LOOP => Some(4),
            Self::ETHERNET => Some(14),
            Self::RAW => Some(0),
            _ => None,
        }
    }

    pub fn is_ethernet(self) -> bool {
        self == Self::ETHERNET
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NULL => write!(f, "NULL"),
            Self::ETHERNET => write!(f, "EN10MB"),
            Self::RAW => write!(f, "RAW"),
            Self::LOOP => write!(f, "LOOP"),
            LinkType(other) => write!(f, "DLT({})", other),
        }
    }
}

/// TCP-over-IPv4 header fields extracted from one captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPacket {
    /// Interface the frame was captured on
    pub interface: String,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    /// Original length on the wire, not the captured length
    pub packet_size: u32,
    /// Capture timestamp from the capture subsystem
    pub timestamp: DateTime<Utc>,
}
