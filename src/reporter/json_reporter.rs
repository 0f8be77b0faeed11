//! Line-delimited JSON event output.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::domain::NetworkEvent;
use crate::reporter::EventSink;

/// Render an event as one JSON object, without a trailing newline.
pub fn format_event(event: &NetworkEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

/// Writes one JSON object per line to a shared writer.
///
/// The line is fully rendered before the lock is taken, then written and
/// flushed under a single lock acquisition.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLinesSink<io::Stdout> {
    /// Sink on the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn report(&self, event: &NetworkEvent) -> io::Result<()> {
        let mut line = format_event(event)?;
        line.push('\n');

        // The lock only guards the writer; a poisoned one is still usable
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}
