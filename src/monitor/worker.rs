//! Per-interface capture worker.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::WorkerOutcome;
use crate::capture::{CaptureBackend, CaptureSession, CaptureSettings, Frame, Receive};
use crate::detector::PortFilter;
use crate::domain::{LinkType, NetworkEvent};
use crate::parser::TcpParser;
use crate::reporter::EventSink;

/// Counters for one worker's receive loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames delivered by the capture session
    pub frames: u64,
    /// Frames that were not TCP over IPv4, or were truncated
    pub skipped: u64,
    /// Events handed to the sink
    pub events: u64,
    /// Events the sink failed to write
    pub write_errors: u64,
}

/// Captures on one interface until stopped.
///
/// The worker opens its own session, so a failure here never touches any
/// other interface.
pub struct CaptureWorker<B: CaptureBackend> {
    backend: Arc<B>,
    interface: String,
    settings: CaptureSettings,
    parser: TcpParser,
    filter: PortFilter,
    sink: Arc<dyn EventSink>,
    running: Arc<AtomicBool>,
}

impl<B: CaptureBackend> CaptureWorker<B> {
    pub fn new(
        backend: Arc<B>,
        interface: String,
        settings: CaptureSettings,
        parser: TcpParser,
        filter: PortFilter,
        sink: Arc<dyn EventSink>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            backend,
            interface,
            settings,
            parser,
            filter,
            sink,
            running,
        }
    }

    /// Open the session, install the port filter and run the receive loop.
    ///
    /// The session is dropped, closing it, on every return path.
    pub fn run(self) -> WorkerOutcome {
        let mut session = match self.backend.open(&self.interface, &self.settings) {
            Ok(session) => session,
            Err(e) => {
                error!("{}", e);
                return WorkerOutcome::SetupFailed(e);
            }
        };

        let link_type = session.link_type();

        let expression = self.filter.filter_expression();
        if let Err(e) = session.set_filter(&expression) {
            error!("{}", e);
            return WorkerOutcome::SetupFailed(e);
        }

        info!("Monitoring interface: {}", self.interface);
        debug!(
            "{}: link type {}, filter '{}'",
            self.interface, link_type, expression
        );

        let mut stats = WorkerStats::default();

        while self.running.load(Ordering::SeqCst) {
            match session.next_frame() {
                Ok(Receive::Frame(frame)) => {
                    if let Err(e) = self.handle_frame(&frame, link_type, &mut stats) {
                        // Nobody is reading events any more; stop every worker
                        error!("Event output closed ({}), stopping monitor", e);
                        self.running.store(false, Ordering::SeqCst);
                        return WorkerOutcome::OutputClosed(stats);
                    }
                }
                // Timeout is expected, go back and check the stop flag
                Ok(Receive::Timeout) => continue,
                Ok(Receive::Closed) => {
                    debug!("Capture session on {} closed", self.interface);
                    break;
                }
                Err(e) => {
                    warn!("{}", e);
                    return WorkerOutcome::ReadFailed { stats, error: e };
                }
            }
        }

        info!(
            "Stopped monitoring {}: {} frames, {} events",
            self.interface, stats.frames, stats.events
        );
        WorkerOutcome::Finished(stats)
    }

    /// Parse, filter and emit one frame.
    ///
    /// Returns an error only when the sink's reader has gone away.
    fn handle_frame(
        &self,
        frame: &Frame<'_>,
        link_type: LinkType,
        stats: &mut WorkerStats,
    ) -> io::Result<()> {
        stats.frames += 1;

        let packet = match self.parser.parse(frame, link_type, &self.interface) {
            Ok(packet) => packet,
            Err(_) => {
                stats.skipped += 1;
                return Ok(());
            }
        };

        // The installed capture filter should already guarantee this
        if !self.filter.matches_packet(&packet) {
            return Ok(());
        }

        let event = NetworkEvent::from_packet(&packet);
        match self.sink.report(&event) {
            Ok(()) => stats.events += 1,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                stats.write_errors += 1;
                return Err(e);
            }
            Err(e) => {
                stats.write_errors += 1;
                warn!("Failed to write event from {}: {}", self.interface, e);
            }
        }
        Ok(())
    }
}
