// # floatipd - Failover IP Daemon
//
// Binds a floating IPv4 address to a local interface while a peer's MAC
// address is absent from the segment, and releases it when the peer answers
// at that address again.
//
// The daemon is a thin integration layer:
// 1. Parse flags and `FLOATIP_*` environment variables
// 2. Install the log subscriber
// 3. Wire the arp-scan scanner and the iproute2 configurator into the monitor
// 4. Run until single-shot completion, SIGTERM or SIGINT
//
// ## Example
//
// ```bash
// sudo floatipd --mac AA:BB:CC:DD:EE:FF --ip 192.168.1.100 --interface eth0
//
// # one cycle, no changes
// sudo floatipd -m AA:BB:CC:DD:EE:FF -a 192.168.1.100 -i eth0 --once --dry-run
// ```

mod cli;
mod logging;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;
use floatip_arp_scan::ArpScanner;
use floatip_core::{Monitor, MonitorConfig, critical};
use floatip_iproute::IprouteInterface;
use std::process::ExitCode;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes
///
/// - 0: Single-shot completion, clean shutdown, `--help` or `--version`
/// - 1: Any configuration, preflight or startup failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatipExitCode {
    /// Normal exit
    Success = 0,
    /// Invalid configuration or failed preflight
    Failure = 1,
}

impl From<FloatipExitCode> for ExitCode {
    fn from(code: FloatipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Exit code for a command line that did not parse into a [`Cli`]
fn parse_exit_code(kind: ErrorKind) -> FloatipExitCode {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => FloatipExitCode::Success,
        _ => FloatipExitCode::Failure,
    }
}

/// Exit code for a finished monitor run; fatal errors are reported as critical
fn daemon_exit_code(result: floatip_core::Result<()>) -> FloatipExitCode {
    match result {
        Ok(()) => FloatipExitCode::Success,
        Err(e) => {
            critical!("{}", e);
            FloatipExitCode::Failure
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = parse_exit_code(e.kind());
            let _ = e.print();
            return code.into();
        }
    };

    if let Err(e) = logging::init(cli.log_policy()) {
        eprintln!("{}", e);
        return FloatipExitCode::Failure.into();
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            critical!("Configuration error: {}", e);
            return FloatipExitCode::Failure.into();
        }
    };

    info!("Starting floatipd {}", env!("CARGO_PKG_VERSION"));
    match serde_json::to_string(&config) {
        Ok(json) => debug!("Effective configuration: {}", json),
        Err(e) => debug!("Could not serialize configuration: {}", e),
    }

    // One logical thread: iterations are strictly sequential
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            critical!("Failed to create tokio runtime: {}", e);
            return FloatipExitCode::Failure.into();
        }
    };

    daemon_exit_code(rt.block_on(run_daemon(config))).into()
}

/// Wire the system backends into a monitor and run it
async fn run_daemon(config: MonitorConfig) -> floatip_core::Result<()> {
    let scanner = ArpScanner::from_settings(&config.scan);
    let interface = IprouteInterface::new();

    // Nothing consumes monitor events here; dropping the receiver turns
    // emission into a no-op.
    let (monitor, _) = Monitor::new(config, Box::new(scanner), Box::new(interface))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let signals = tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received {}", signal),
            Err(e) => {
                warn!("{}; only Ctrl-C will stop the daemon", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        }
        let _ = shutdown_tx.send(());
    });

    let result = monitor.run_with_shutdown(Some(shutdown_rx)).await;
    signals.abort();
    result
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> anyhow::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for Ctrl-C
#[cfg(not(unix))]
async fn wait_for_shutdown() -> anyhow::Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for Ctrl-C: {}", e))?;
    Ok("SIGINT")
}
