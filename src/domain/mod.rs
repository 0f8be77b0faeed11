//! Domain models for TCP port monitoring.
//!
//! This module contains the core domain types that are independent
//! of any capture backend or output format.

mod events;
mod packet;
mod ports;

pub use events::NetworkEvent;
pub use packet::{LinkType, ParsedPacket};
pub use ports::WatchedPorts;
