//! portwatch - passive multi-interface TCP port monitor.
//!
//! Captures on every interface that is up, one thread per interface, and
//! emits one JSON line for each TCP/IPv4 packet whose source or destination
//! port is on the watch-list.
//!
//! The pipeline for each frame is:
//! capture -> `TcpParser` -> `PortFilter` -> `NetworkEvent` -> `EventSink`.

pub mod capture;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod parser;
pub mod reporter;

pub use capture::{CaptureBackend, CaptureSession, CaptureSettings, PcapBackend};
pub use config::Config;
pub use detector::PortFilter;
pub use domain::{LinkType, NetworkEvent, ParsedPacket, WatchedPorts};
pub use error::{CaptureError, ConfigError, MonitorError};
pub use monitor::{RunSummary, Supervisor, WorkerOutcome, MAX_INTERFACES};
pub use parser::{NotApplicable, TcpParser, UnknownLinkPolicy};
pub use reporter::{EventSink, JsonLinesSink};
