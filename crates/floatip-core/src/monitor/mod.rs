//! Monitor driver loop
//!
//! The Monitor is responsible for:
//! - Verifying privileges, the scan tool and the interface before starting
//! - Alternating presence detection and interface reconciliation
//! - Sleeping `scan_interval` between iterations (continuous mode)
//! - Stopping after one cycle (single-shot mode)
//!
//! ## State Machine
//!
//! ```text
//! ┌──────────────┐    ┌───────────┐    ┌─────────────┐
//! │ Initializing │───▶│ Detecting │───▶│ Reconciling │
//! └──────────────┘    └───────────┘    └─────────────┘
//!        │ fatal            ▲             │        │
//!        ▼                  │  continuous │        │ single-shot
//!     (error)         ┌──────────┐        │        ▼
//!                     │ Sleeping │◀───────┘  ┌────────────┐
//!                     └──────────┘           │ Terminated │
//!                                            └────────────┘
//! ```
//!
//! Iterations never overlap: the next detection starts only after the
//! previous sleep has completed, and the sleep is the only suspension point
//! that is not an external tool invocation.

use crate::config::{MonitorConfig, RunMode};
use crate::detector::{self, Presence, PresenceObservation};
use crate::error::{Error, Result};
use crate::reconciler::{self, ReconcileOutcome};
use crate::traits::{InterfaceConfigurator, PresenceScanner, Sleeper, TokioSleeper};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Capacity of the monitoring event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Driver states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Initializing,
    Detecting,
    Reconciling(PresenceObservation),
    Sleeping,
    Terminated,
}

/// Events emitted by the Monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Preflight checks passed
    Started {
        interface: String,
        target_ip: std::net::Ipv4Addr,
    },

    /// A detection finished
    PresenceObserved { presence: Presence },

    /// A reconciliation finished
    Reconciled { outcome: ReconcileOutcome },

    /// Sleeping before the next iteration
    Sleeping { duration: Duration },

    /// Monitor stopped
    Stopped { reason: String },
}

/// Presence-driven failover monitor
///
/// ## Lifecycle
///
/// 1. Create with [`Monitor::new()`]
/// 2. Start with [`Monitor::run()`], or drive manually with [`Monitor::step()`]
/// 3. Runs until single-shot completion, a fatal startup error, or shutdown
pub struct Monitor {
    /// Immutable configuration
    config: Arc<MonitorConfig>,

    /// Presence scanner
    scanner: Box<dyn PresenceScanner>,

    /// Interface configurator
    interface: Box<dyn InterfaceConfigurator>,

    /// Inter-iteration sleep
    sleeper: Box<dyn Sleeper>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<MonitorEvent>,
}

impl Monitor {
    /// Create a new monitor
    ///
    /// # Parameters
    ///
    /// - `config`: Monitor configuration (validated here)
    /// - `scanner`: Presence scanner implementation
    /// - `interface`: Interface configurator implementation
    ///
    /// # Returns
    ///
    /// A tuple of (monitor, event_receiver) where event_receiver yields monitor events
    pub fn new(
        config: MonitorConfig,
        scanner: Box<dyn PresenceScanner>,
        interface: Box<dyn InterfaceConfigurator>,
    ) -> Result<(Self, mpsc::Receiver<MonitorEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let monitor = Self {
            config: Arc::new(config),
            scanner,
            interface,
            sleeper: Box::new(TokioSleeper),
            event_tx: tx,
        };

        Ok((monitor, rx))
    }

    /// Replace the inter-iteration sleeper
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run the monitor until it terminates
    ///
    /// Continuous mode only returns on Ctrl-C or a fatal startup error.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Single-shot completion or shutdown signal
    /// - `Err(Error)`: Fatal startup error; no iteration ran
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run with a programmatic shutdown signal instead of Ctrl-C
    ///
    /// Intended for tests and for embedding the monitor in a larger program.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let mut state = MonitorState::Initializing;

        loop {
            if state == MonitorState::Terminated {
                info!("Single-shot cycle complete");
                self.emit_event(MonitorEvent::Stopped {
                    reason: "Single-shot cycle complete".to_string(),
                });
                return Ok(());
            }

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(MonitorEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    return Ok(());
                }

                next = self.step(state) => {
                    state = next?;
                }
            }
        }
    }

    /// Advance the state machine by one transition
    ///
    /// Only `Initializing` can fail; every later state resolves runtime
    /// problems into an observation or an outcome.
    pub async fn step(&self, state: MonitorState) -> Result<MonitorState> {
        match state {
            MonitorState::Initializing => {
                self.initialize().await?;
                Ok(MonitorState::Detecting)
            }
            MonitorState::Detecting => {
                let observation = detector::detect(&self.config, self.scanner.as_ref()).await;
                debug!(
                    "{} is {} at {} on {} (observed {})",
                    self.config.target_mac,
                    observation.presence,
                    self.config.target_ip,
                    self.config.interface,
                    observation.observed_at.to_rfc3339()
                );
                self.emit_event(MonitorEvent::PresenceObserved {
                    presence: observation.presence,
                });
                Ok(MonitorState::Reconciling(observation))
            }
            MonitorState::Reconciling(observation) => {
                let outcome =
                    reconciler::reconcile(&observation, &self.config, self.interface.as_ref())
                        .await;
                debug!("Reconciliation outcome: {}", outcome);
                self.emit_event(MonitorEvent::Reconciled { outcome });

                match self.config.run_mode {
                    RunMode::SingleShot => Ok(MonitorState::Terminated),
                    RunMode::Continuous => Ok(MonitorState::Sleeping),
                }
            }
            MonitorState::Sleeping => {
                let duration = self.config.scan_interval();
                debug!("Sleeping {:?} before next scan", duration);
                self.emit_event(MonitorEvent::Sleeping { duration });
                self.sleeper.sleep(duration).await;
                Ok(MonitorState::Detecting)
            }
            MonitorState::Terminated => Ok(MonitorState::Terminated),
        }
    }

    /// Preflight checks
    ///
    /// Order matters for diagnostics: privilege first, then the interface
    /// tooling and the scan tool, then the interface itself.
    pub async fn initialize(&self) -> Result<()> {
        self.config.validate()?;

        self.interface.ensure_privileged().await?;

        self.interface.ensure_available().await?;

        self.scanner.ensure_available().await?;

        if !self.interface.interface_exists(&self.config.interface).await? {
            return Err(Error::interface_not_found(format!(
                "{} (check `ip link show`)",
                self.config.interface
            )));
        }

        info!(
            "Monitoring {} for {} at {} (interval {}s, {:?}{})",
            self.config.interface,
            self.config.target_mac,
            self.config.target_ip,
            self.config.scan_interval_secs,
            self.config.run_mode,
            if self.config.dry_run { ", dry-run" } else { "" }
        );
        self.emit_event(MonitorEvent::Started {
            interface: self.config.interface.clone(),
            target_ip: self.config.target_ip,
        });

        Ok(())
    }

    /// Emit a monitor event
    fn emit_event(&self, event: MonitorEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
