//! portwatch - passive TCP port monitor.
//!
//! Events go to stdout as JSON lines; diagnostics go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use portwatch::config::CliOverrides;
use portwatch::{CaptureBackend, Config, JsonLinesSink, PcapBackend, Supervisor};

#[derive(Parser)]
#[command(name = "portwatch")]
#[command(about = "Emit a JSON line for every TCP packet on a watched port, on every interface")]
struct Cli {
    /// Config file (default: $PORTWATCH_CONFIG or /etc/portwatch.conf)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TCP port to watch; repeat for several (replaces configured ports)
    #[arg(short, long = "port", value_name = "PORT")]
    ports: Vec<u16>,

    /// Only monitor this interface; repeat for several
    #[arg(short, long = "interface", value_name = "NAME")]
    interfaces: Vec<String>,

    /// Snapshot length in bytes
    #[arg(long)]
    snaplen: Option<i32>,

    /// Capture read timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Do not put interfaces into promiscuous mode
    #[arg(long)]
    no_promisc: bool,

    /// List network interfaces and exit
    #[arg(short, long)]
    list_interfaces: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli).context("invalid configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.tracing_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let backend = PcapBackend::new();

    if cli.list_interfaces {
        for line in backend.list_interfaces()? {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let sink = Arc::new(JsonLinesSink::stdout());
    let supervisor = Supervisor::new(backend, &config, sink);

    let running = supervisor.running_flag();
    ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal, stopping workers");
        running.store(false, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    let summary = match supervisor.run() {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if summary.output_closed() {
        tracing::error!("Event output closed before shutdown");
        return Ok(ExitCode::FAILURE);
    }

    if summary.monitored() == 0 {
        tracing::error!("No interface could be monitored");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// File and environment first, then command-line flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(CliOverrides {
        ports: cli.ports.clone(),
        interfaces: cli.interfaces.clone(),
        snaplen: cli.snaplen,
        timeout_ms: cli.timeout_ms,
        no_promisc: cli.no_promisc,
        verbose: cli.verbose,
    })?;
    Ok(config)
}
