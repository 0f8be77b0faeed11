//! libpcap-based capture implementation.

use chrono::{DateTime, Utc};
use pcap::{Active, Capture};

use super::{CaptureBackend, CaptureSession, CaptureSettings, Device, Frame, Receive};
use crate::domain::LinkType;
use crate::error::CaptureError;

/// Capture backend using libpcap through the `pcap` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PcapBackend;

impl PcapBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureBackend for PcapBackend {
    type Session = PcapSession;

    fn devices(&self) -> Result<Vec<Device>, CaptureError> {
        let devices = pcap::Device::list().map_err(|e| CaptureError::Enumeration(e.to_string()))?;

        Ok(devices
            .into_iter()
            .map(|d| Device {
                is_up: d.flags.is_up(),
                is_loopback: d.flags.is_loopback(),
                addresses: d.addresses.iter().map(|a| a.addr).collect(),
                name: d.name,
            })
            .collect())
    }

    fn open(
        &self,
        interface: &str,
        settings: &CaptureSettings,
    ) -> Result<Self::Session, CaptureError> {
        let timeout_ms = i32::try_from(settings.read_timeout.as_millis()).unwrap_or(i32::MAX);

        let cap = Capture::from_device(interface)
            .and_then(|c| {
                c.promisc(settings.promiscuous)
                    .snaplen(settings.snaplen)
                    .timeout(timeout_ms)
                    .open()
            })
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("permission") || msg.contains("Operation not permitted") {
                    return CaptureError::InsufficientPermissions(interface.to_string());
                }
                CaptureError::Open {
                    interface: interface.to_string(),
                    reason: msg,
                }
            })?;

        let link_type = LinkType(cap.get_datalink().0);

        Ok(PcapSession {
            interface: interface.to_string(),
            cap,
            link_type,
        })
    }
}

/// An open libpcap handle. Dropping it closes the handle.
pub struct PcapSession {
    interface: String,
    cap: Capture<Active>,
    link_type: LinkType,
}

impl CaptureSession for PcapSession {
    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn set_filter(&mut self, expression: &str) -> Result<(), CaptureError> {
        self.cap
            .filter(expression, true)
            .map_err(|e| CaptureError::Filter {
                interface: self.interface.clone(),
                expression: expression.to_string(),
                reason: e.to_string(),
            })
    }

    fn next_frame(&mut self) -> Result<Receive<'_>, CaptureError> {
        match self.cap.next_packet() {
            Ok(packet) => {
                let header = packet.header;
                #[allow(clippy::unnecessary_cast)]
                let timestamp = DateTime::<Utc>::from_timestamp(
                    header.ts.tv_sec as i64,
                    (header.ts.tv_usec as u32).saturating_mul(1000),
                )
                .unwrap_or_default();

                Ok(Receive::Frame(Frame {
                    data: packet.data,
                    wire_len: header.len,
                    timestamp,
                }))
            }
            Err(pcap::Error::TimeoutExpired) => Ok(Receive::Timeout),
            Err(pcap::Error::NoMorePackets) => Ok(Receive::Closed),
            Err(e) => Err(CaptureError::Read {
                interface: self.interface.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
