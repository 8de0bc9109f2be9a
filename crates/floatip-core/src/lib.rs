// # floatip-core
//
// Core library for the presence-driven failover IP manager.
//
// ## Architecture Overview
//
// The library implements a small sense → decide → act loop:
// - **PresenceScanner**: Trait for observing (MAC, IP) neighbors on a segment
// - **InterfaceConfigurator**: Trait for listing/adding/removing interface addresses
// - **Sleeper**: Trait for the single suspension point between iterations
// - **detector**: Turns a scan into a present/absent verdict
// - **reconciler**: Makes the interface match the verdict, idempotently
// - **Monitor**: Driver state machine (Initializing → Detecting → Reconciling → Sleeping)
//
// ## Design Principles
//
// 1. **Stateless reconciliation**: every iteration re-reads the interface state
// 2. **Fail open toward absence**: a failed scan means the peer is absent
// 3. **At most one mutation per iteration**: never add a bound address or remove an unbound one
// 4. **Library-first**: the daemon only wires concrete scanner/interface implementations

pub mod config;
pub mod detector;
pub mod error;
pub mod exec;
pub mod logging;
pub mod monitor;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::{MacAddr, MonitorConfig, RunMode, ScanSettings};
pub use detector::{Presence, PresenceObservation};
pub use error::{Error, Result};
pub use logging::{LogPolicy, Severity};
pub use monitor::{Monitor, MonitorEvent, MonitorState};
pub use reconciler::{MANAGED_PREFIX_LEN, ReconcileOutcome};
pub use traits::{InterfaceConfigurator, Neighbor, PresenceScanner, Sleeper, TokioSleeper};
