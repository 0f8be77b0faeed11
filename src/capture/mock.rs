//! Scripted capture backend for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use super::{CaptureBackend, CaptureSession, CaptureSettings, Device, Frame, Receive};
use crate::domain::LinkType;
use crate::error::CaptureError;

/// What one interface does when a worker opens it.
#[derive(Debug, Clone)]
pub struct Script {
    pub link_type: LinkType,
    pub frames: Vec<Vec<u8>>,
    pub open_error: Option<String>,
    pub filter_error: Option<String>,
    /// Panic inside `open`
    pub panic_on_open: bool,
    /// After the frames run out, keep timing out instead of closing
    pub idle_forever: bool,
    /// After the frames run out, fail the next read with this reason
    pub read_error: Option<String>,
}

impl Script {
    pub fn frames(link_type: LinkType, frames: Vec<Vec<u8>>) -> Self {
        Self {
            link_type,
            frames,
            open_error: None,
            filter_error: None,
            panic_on_open: false,
            idle_forever: false,
            read_error: None,
        }
    }

    pub fn failing_open(reason: &str) -> Self {
        Self {
            open_error: Some(reason.to_string()),
            ..Self::frames(LinkType::ETHERNET, Vec::new())
        }
    }
}

pub struct MockBackend {
    devices: Result<Vec<Device>, CaptureError>,
    scripts: Mutex<HashMap<String, Script>>,
    /// (interface, expression) for every installed filter
    pub filters: Arc<Mutex<Vec<(String, String)>>>,
    /// Interfaces a session was opened on, in open order
    pub opened: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            devices: Ok(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            filters: Arc::new(Mutex::new(Vec::new())),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_enumeration(reason: &str) -> Self {
        Self {
            devices: Err(CaptureError::Enumeration(reason.to_string())),
            ..Self::new()
        }
    }

    /// Add a device and the script its session will follow.
    pub fn with_device(mut self, name: &str, is_up: bool, script: Script) -> Self {
        if let Ok(devices) = &mut self.devices {
            devices.push(Device {
                name: name.to_string(),
                is_up,
                is_loopback: name == "lo",
                addresses: Vec::new(),
            });
        }
        self.scripts
            .get_mut()
            .unwrap()
            .insert(name.to_string(), script);
        self
    }
}

impl CaptureBackend for MockBackend {
    type Session = MockSession;

    fn devices(&self) -> Result<Vec<Device>, CaptureError> {
        self.devices.clone()
    }

    fn open(
        &self,
        interface: &str,
        _settings: &CaptureSettings,
    ) -> Result<Self::Session, CaptureError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .remove(interface)
            .unwrap_or_else(|| Script::failing_open("no such device"));

        if script.panic_on_open {
            panic!("scripted panic on {}", interface);
        }
        if let Some(reason) = script.open_error {
            return Err(CaptureError::Open {
                interface: interface.to_string(),
                reason,
            });
        }

        self.opened.lock().unwrap().push(interface.to_string());

        Ok(MockSession {
            interface: interface.to_string(),
            link_type: script.link_type,
            pending: script.frames.into(),
            current: Vec::new(),
            filter_error: script.filter_error,
            idle_forever: script.idle_forever,
            read_error: script.read_error,
            filters: Arc::clone(&self.filters),
        })
    }
}

pub struct MockSession {
    interface: String,
    link_type: LinkType,
    pending: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    filter_error: Option<String>,
    idle_forever: bool,
    read_error: Option<String>,
    filters: Arc<Mutex<Vec<(String, String)>>>,
}

/// Fixed capture time for scripted frames: 2023-11-14 22:13:20 UTC.
pub fn capture_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

impl CaptureSession for MockSession {
    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn set_filter(&mut self, expression: &str) -> Result<(), CaptureError> {
        if let Some(reason) = &self.filter_error {
            return Err(CaptureError::Filter {
                interface: self.interface.clone(),
                expression: expression.to_string(),
                reason: reason.clone(),
            });
        }
        self.filters
            .lock()
            .unwrap()
            .push((self.interface.clone(), expression.to_string()));
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Receive<'_>, CaptureError> {
        match self.pending.pop_front() {
            Some(frame) => {
                self.current = frame;
                Ok(Receive::Frame(Frame {
                    data: &self.current,
                    wire_len: self.current.len() as u32,
                    timestamp: capture_time(),
                }))
            }
            None if self.read_error.is_some() => Err(CaptureError::Read {
                interface: self.interface.clone(),
                reason: self.read_error.take().unwrap_or_default(),
            }),
            None if self.idle_forever => {
                std::thread::sleep(std::time::Duration::from_millis(5));
                Ok(Receive::Timeout)
            }
            None => Ok(Receive::Closed),
        }
    }
}

/// IPv4 header (with `option_words` 32-bit words of NOP options) followed
/// by a 20-byte TCP header.
pub fn ipv4_packet(protocol: u8, src_port: u16, dst_port: u16, option_words: u8) -> Vec<u8> {
    let ihl = 5 + option_words;
    let ip_len = usize::from(ihl) * 4;
    let total = ip_len + 20;

    let mut p = vec![0u8; total];
    p[0] = 0x40 | ihl;
    p[2..4].copy_from_slice(&(total as u16).to_be_bytes());
    p[8] = 64;
    p[9] = protocol;
    p[12..16].copy_from_slice(&[192, 168, 1, 10]);
    p[16..20].copy_from_slice(&[192, 168, 1, 20]);
    for b in &mut p[20..ip_len] {
        *b = 1;
    }
    p[ip_len..ip_len + 2].copy_from_slice(&src_port.to_be_bytes());
    p[ip_len + 2..ip_len + 4].copy_from_slice(&dst_port.to_be_bytes());
    p[ip_len + 12] = 0x50;
    p
}

pub fn tcp_packet(src_port: u16, dst_port: u16) -> Vec<u8> {
    ipv4_packet(6, src_port, dst_port, 0)
}

/// Wrap an IP packet in an Ethernet II header.
pub fn ethernet(payload: &[u8], ethertype: u16) -> Vec<u8> {
    let mut f = vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
    f.extend_from_slice(&ethertype.to_be_bytes());
    f.extend_from_slice(payload);
    f
}

/// Wrap an IP packet in a BSD loopback header (AF_INET, host order).
pub fn loopback(payload: &[u8]) -> Vec<u8> {
    let mut f = 2u32.to_ne_bytes().to_vec();
    f.extend_from_slice(payload);
    f
}

pub fn ethernet_tcp(src_port: u16, dst_port: u16) -> Vec<u8> {
    ethernet(&tcp_packet(src_port, dst_port), 0x0800)
}
