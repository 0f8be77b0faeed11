//! Packet capture abstraction.
//!
//! This module defines the `CaptureBackend` and `CaptureSession` traits and
//! provides a libpcap implementation. Workers only see the traits, so tests
//! drive them with a scripted backend instead of live interfaces.

#[cfg(test)]
pub mod mock;
mod pcap_capture;

pub use pcap_capture::PcapBackend;

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::LinkType;
use crate::error::CaptureError;

/// A network device as reported by the capture subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    /// Administratively and operationally up
    pub is_up: bool,
    pub is_loopback: bool,
    pub addresses: Vec<IpAddr>,
}

impl Device {
    /// One-line summary used by `--list-interfaces`.
    pub fn summary(&self) -> String {
        let mut status = if self.is_up { "UP" } else { "DOWN" }.to_string();
        if self.is_loopback {
            status.push_str(" LOOPBACK");
        }
        let ips: Vec<_> = self.addresses.iter().map(|ip| ip.to_string()).collect();
        format!(
            "{}: {} [{}]",
            self.name,
            status,
            if ips.is_empty() {
                "no IP".to_string()
            } else {
                ips.join(", ")
            }
        )
    }
}

/// Parameters for opening a live capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Snapshot length: maximum bytes captured per frame
    pub snaplen: i32,
    pub promiscuous: bool,
    /// Read timeout; bounds how long a worker blocks between stop-flag checks
    pub read_timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            snaplen: 65535,
            promiscuous: true,
            read_timeout: Duration::from_millis(1000),
        }
    }
}

/// One captured frame, borrowed from the session's buffer.
///
/// Only valid until the next call to `CaptureSession::next_frame`.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Captured bytes, including link-layer framing
    pub data: &'a [u8],
    /// Length of the frame on the wire
    pub wire_len: u32,
    pub timestamp: DateTime<Utc>,
}

/// Result of one receive attempt.
#[derive(Debug)]
pub enum Receive<'a> {
    Frame(Frame<'a>),
    /// Read timeout expired with nothing delivered
    Timeout,
    /// The session was closed; no more frames will arrive
    Closed,
}

/// A live capture session on one interface.
pub trait CaptureSession {
    /// Link-layer type of frames delivered by this session.
    fn link_type(&self) -> LinkType;

    /// Compile and install a capture filter expression.
    fn set_filter(&mut self, expression: &str) -> Result<(), CaptureError>;

    /// Block until a frame arrives, the read timeout expires, or the
    /// session ends.
    fn next_frame(&mut self) -> Result<Receive<'_>, CaptureError>;
}

/// Capture subsystem: device enumeration and session creation.
pub trait CaptureBackend: Send + Sync {
    type Session: CaptureSession;

    /// List all network devices on the host.
    fn devices(&self) -> Result<Vec<Device>, CaptureError>;

    /// Open a live capture session on the named device.
    fn open(
        &self,
        interface: &str,
        settings: &CaptureSettings,
    ) -> Result<Self::Session, CaptureError>;

    /// One summary line per device, for `--list-interfaces`.
    fn list_interfaces(&self) -> Result<Vec<String>, CaptureError> {
        Ok(self.devices()?.iter().map(Device::summary).collect())
    }
}
