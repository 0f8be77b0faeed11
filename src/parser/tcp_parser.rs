//! TCP/IPv4 header parser implementation.
//!
//! Locates the IPv4 header behind the link-layer framing, then the TCP header
//! behind the (variable length) IPv4 header. Every read goes through a
//! length-checked view, so truncated captures are rejected instead of read
//! past their end.

use std::fmt;
use std::str::FromStr;

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;

use crate::capture::Frame;
use crate::domain::{LinkType, ParsedPacket};

/// Smallest legal IPv4 header length, in 32-bit words.
const MIN_IPV4_HEADER_WORDS: u8 = 5;

/// Why a frame produced no packet. None of these are errors; the frame is
/// simply dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotApplicable {
    /// The capture ends before the IPv4 or TCP header does
    Truncated,
    /// Not an IPv4 packet, or an IPv4 header with an impossible length
    NotIpv4,
    /// IPv4, but the payload is not TCP
    NotTcp,
    /// Link type not recognized and the parser is set to drop those
    UnknownLinkType,
}

impl fmt::Display for NotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Truncated => "truncated",
            Self::NotIpv4 => "not ipv4",
            Self::NotTcp => "not tcp",
            Self::UnknownLinkType => "unknown link type",
        };
        write!(f, "{}", s)
    }
}

/// How to treat frames whose link-layer type has no known header length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownLinkPolicy {
    /// Assume no link-layer header and parse from byte 0
    #[default]
    BestEffort,
    /// Drop the frame
    Drop,
}

impl FromStr for UnknownLinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "besteffort" => Ok(Self::BestEffort),
            "drop" => Ok(Self::Drop),
            other => Err(other.to_string()),
        }
    }
}

/// Parser for TCP-over-IPv4 frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpParser {
    unknown_link: UnknownLinkPolicy,
}

impl TcpParser {
    /// Create a new parser with the best-effort fallback for unknown link types.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_link_policy(mut self, policy: UnknownLinkPolicy) -> Self {
        self.unknown_link = policy;
        self
    }

    /// Byte offset of the IPv4 header for the given framing.
    pub fn link_offset(&self, link_type: LinkType) -> Result<usize, NotApplicable> {
        match (link_type.header_len(), self.unknown_link) {
            (Some(len), _) => Ok(len),
            (None, UnknownLinkPolicy::BestEffort) => Ok(0),
            (None, UnknownLinkPolicy::Drop) => Err(NotApplicable::UnknownLinkType),
        }
    }

    /// Parse one captured frame.
    ///
    /// Only `frame.data` (the captured bytes) is examined. The reported packet
    /// size is the wire length.
    pub fn parse(
        &self,
        frame: &Frame<'_>,
        link_type: LinkType,
        interface: &str,
    ) -> Result<ParsedPacket, NotApplicable> {
        let data = frame.data;
        let ip_offset = self.link_offset(link_type)?;

        if link_type.is_ethernet() {
            let ethernet = EthernetPacket::new(data).ok_or(NotApplicable::Truncated)?;
            if ethernet.get_ethertype() != EtherTypes::Ipv4 {
                return Err(NotApplicable::NotIpv4);
            }
        }

        let ipv4 = data
            .get(ip_offset..)
            .and_then(Ipv4Packet::new)
            .ok_or(NotApplicable::Truncated)?;

        let header_words = ipv4.get_header_length();
        if ipv4.get_version() != 4 || header_words < MIN_IPV4_HEADER_WORDS {
            return Err(NotApplicable::NotIpv4);
        }

        if ipv4.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
            return Err(NotApplicable::NotTcp);
        }

        // IHL counts 32-bit words and includes any options
        let tcp_offset = ip_offset + usize::from(header_words) * 4;
        let tcp = data
            .get(tcp_offset..)
            .and_then(TcpPacket::new)
            .ok_or(NotApplicable::Truncated)?;

        Ok(ParsedPacket {
            interface: interface.to_string(),
            src_ip: ipv4.get_source(),
            dst_ip: ipv4.get_destination(),
            src_port: tcp.get_source(),
            dst_port: tcp.get_destination(),
            packet_size: frame.wire_len,
            timestamp: frame.timestamp,
        })
    }
}
