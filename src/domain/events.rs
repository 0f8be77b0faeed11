//! Domain events for port monitoring.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::ParsedPacket;

/// Timestamp layout of emitted events, in local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A watched-port packet observed on the network.
///
/// This is the primary domain event that our system produces. Field order
/// here is the field order of the emitted JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEvent {
    pub timestamp: String,
    pub interface: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub packet_size: u32,
}

impl NetworkEvent {
    /// Build the event for a matched packet.
    ///
    /// The timestamp comes from the capture, not from the time of formatting.
    pub fn from_packet(packet: &ParsedPacket) -> Self {
        Self {
            timestamp: format_timestamp(packet.timestamp),
            interface: packet.interface.clone(),
            src_ip: packet.src_ip.to_string(),
            dst_ip: packet.dst_ip.to_string(),
            src_port: packet.src_port,
            dst_port: packet.dst_port,
            packet_size: packet.packet_size,
        }
    }
}

/// Render a capture timestamp as `YYYY-MM-DD HH:MM:SS` local time.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}
