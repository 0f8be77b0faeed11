//! Interface discovery and worker supervision.

use std::any::Any;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use super::{CaptureWorker, WorkerOutcome};
use crate::capture::{CaptureBackend, CaptureSettings};
use crate::config::Config;
use crate::detector::PortFilter;
use crate::domain::WatchedPorts;
use crate::error::{CaptureError, MonitorError};
use crate::parser::TcpParser;
use crate::reporter::EventSink;

/// Per-interface outcomes of one monitoring run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(String, WorkerOutcome)>,
}

impl RunSummary {
    /// Number of interfaces that were actually captured on.
    pub fn monitored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.was_monitored())
            .count()
    }

    /// Total events emitted across all workers.
    pub fn events(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| outcome.stats())
            .map(|stats| stats.events)
            .sum()
    }

    /// True if any worker stopped because the event output was closed.
    pub fn output_closed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, outcome)| matches!(outcome, WorkerOutcome::OutputClosed(_)))
    }

    pub fn outcome(&self, interface: &str) -> Option<&WorkerOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == interface)
            .map(|(_, outcome)| outcome)
    }
}

/// Runs one capture worker thread per monitored interface.
pub struct Supervisor<B: CaptureBackend + 'static> {
    backend: Arc<B>,
    ports: Arc<WatchedPorts>,
    settings: CaptureSettings,
    parser: TcpParser,
    interfaces: Vec<String>,
    max_interfaces: usize,
    sink: Arc<dyn EventSink>,
    running: Arc<AtomicBool>,
}

impl<B: CaptureBackend + 'static> Supervisor<B> {
    pub fn new(backend: B, config: &Config, sink: Arc<dyn EventSink>) -> Self {
        Self {
            backend: Arc::new(backend),
            ports: Arc::new(config.ports.clone()),
            settings: config.capture.clone(),
            parser: TcpParser::new().with_unknown_link_policy(config.unknown_link),
            interfaces: config.interfaces.clone(),
            max_interfaces: config.max_interfaces,
            sink,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get a handle to stop all workers.
    ///
    /// Clearing the flag makes every worker close its session after its
    /// current read returns.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Names of the interfaces to monitor: up, allowed by configuration,
    /// and at most `max_interfaces` of them.
    pub fn select_interfaces(&self) -> Result<Vec<String>, MonitorError> {
        let devices = self.backend.devices().map_err(|e| match e {
            CaptureError::Enumeration(reason) => MonitorError::EnumerationFailure(reason),
            other => MonitorError::EnumerationFailure(other.to_string()),
        })?;

        if devices.is_empty() {
            return Err(MonitorError::NoInterfacesFound);
        }

        for wanted in &self.interfaces {
            if !devices.iter().any(|d| &d.name == wanted) {
                warn!("Configured interface {} not found", wanted);
            }
        }

        let mut selected = Vec::new();
        for device in devices {
            if !device.is_up {
                debug!("Skipping {}: interface is down", device.name);
                continue;
            }
            if !self.interfaces.is_empty() && !self.interfaces.contains(&device.name) {
                debug!("Skipping {}: not in configured interfaces", device.name);
                continue;
            }
            if selected.len() == self.max_interfaces {
                warn!(
                    "Skipping {}: limit of {} monitored interfaces reached",
                    device.name, self.max_interfaces
                );
                continue;
            }
            selected.push(device.name);
        }

        if selected.is_empty() {
            return Err(MonitorError::NoInterfacesFound);
        }

        Ok(selected)
    }

    /// Monitor every selected interface until all workers have ended.
    ///
    /// Blocks until the running flag is cleared (or every session closes).
    /// Only interface discovery can fail; worker failures are reported in
    /// the summary.
    pub fn run(&self) -> Result<RunSummary, MonitorError> {
        let interfaces = self.select_interfaces()?;
        let filter = PortFilter::new(Arc::clone(&self.ports));

        info!(
            "Watching TCP ports {} on {} interface(s)",
            self.ports,
            interfaces.len()
        );

        let mut handles: Vec<(String, JoinHandle<WorkerOutcome>)> =
            Vec::with_capacity(interfaces.len());
        let mut summary = RunSummary::default();

        for interface in interfaces {
            let worker = CaptureWorker::new(
                Arc::clone(&self.backend),
                interface.clone(),
                self.settings.clone(),
                self.parser,
                filter.clone(),
                Arc::clone(&self.sink),
                Arc::clone(&self.running),
            );

            let spawned = thread::Builder::new()
                .name(format!("portwatch-{}", interface))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push((interface, handle)),
                Err(e) => {
                    error!("Failed to start worker for {}: {}", interface, e);
                    let failure = CaptureError::Open {
                        interface: interface.clone(),
                        reason: format!("failed to spawn worker thread: {}", e),
                    };
                    summary
                        .outcomes
                        .push((interface, WorkerOutcome::SetupFailed(failure)));
                }
            }
        }

        for (interface, handle) in handles {
            let outcome = match handle.join() {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Worker for {} panicked: {}", interface, message);
                    WorkerOutcome::Panicked(message)
                }
            };
            summary.outcomes.push((interface, outcome));
        }

        info!(
            "All workers stopped: {} of {} interface(s) monitored, {} events",
            summary.monitored(),
            summary.outcomes.len(),
            summary.events()
        );

        Ok(summary)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
