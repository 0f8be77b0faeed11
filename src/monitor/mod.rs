//! Multi-interface monitoring.
//!
//! The supervisor discovers interfaces and runs one capture worker thread per
//! interface. Workers share nothing mutable except the event sink.

mod supervisor;
mod worker;

pub use supervisor::{RunSummary, Supervisor};
pub use worker::{CaptureWorker, WorkerStats};

use crate::error::CaptureError;

/// Upper bound on concurrently monitored interfaces.
pub const MAX_INTERFACES: usize = 64;

/// How one capture worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The stop flag was raised or the session was closed
    Finished(WorkerStats),
    /// The session could not be opened, or the filter not installed
    SetupFailed(CaptureError),
    /// The receive loop hit an unrecoverable read error
    ReadFailed {
        stats: WorkerStats,
        error: CaptureError,
    },
    /// The event sink's reader went away; all workers were told to stop
    OutputClosed(WorkerStats),
    /// The worker thread panicked
    Panicked(String),
}

impl WorkerOutcome {
    /// True if the worker got as far as capturing.
    pub fn was_monitored(&self) -> bool {
        matches!(
            self,
            Self::Finished(_) | Self::ReadFailed { .. } | Self::OutputClosed(_)
        )
    }

    pub fn stats(&self) -> Option<&WorkerStats> {
        match self {
            Self::Finished(stats) | Self::ReadFailed { stats, .. } | Self::OutputClosed(stats) => {
                Some(stats)
            }
            _ => None,
        }
    }
}
