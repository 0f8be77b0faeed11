//! Watched-port matching.

use std::sync::Arc;

use crate::domain::{ParsedPacket, WatchedPorts};

/// Matches TCP packets against the watched-port set.
///
/// Cheap to clone; every capture worker holds one over the same shared set.
#[derive(Debug, Clone)]
pub struct PortFilter {
    ports: Arc<WatchedPorts>,
}

impl PortFilter {
    pub fn new(ports: Arc<WatchedPorts>) -> Self {
        Self { ports }
    }

    /// True if either port is watched.
    pub fn matches(&self, port_a: u16, port_b: u16) -> bool {
        self.ports.contains(port_a) || self.ports.contains(port_b)
    }

    /// Check a parsed packet's source and destination ports.
    pub fn matches_packet(&self, packet: &ParsedPacket) -> bool {
        self.matches(packet.src_port, packet.dst_port)
    }

    /// Capture filter expression selecting TCP traffic on any watched port,
    /// e.g. `tcp port 22 or tcp port 80`.
    pub fn filter_expression(&self) -> String {
        self.ports
            .iter()
            .map(|port| format!("tcp port {}", port))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}
