//! Reporting module for network events.
//!
//! This module defines the `EventSink` trait (ISP, DIP) and the JSON lines
//! implementation every worker writes through.

mod json_reporter;

pub use json_reporter::{format_event, JsonLinesSink};

use std::io;

use crate::domain::NetworkEvent;

/// Destination for emitted events, shared by all capture workers.
///
/// Implementations must write each event as one unit: concurrent callers
/// never see their output interleaved.
pub trait EventSink: Send + Sync {
    /// Emit one event.
    fn report(&self, event: &NetworkEvent) -> io::Result<()>;
}
