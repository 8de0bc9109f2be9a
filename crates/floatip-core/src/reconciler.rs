//! Interface reconciliation
//!
//! Makes the interface's address set match the presence verdict:
//!
//! | verdict  | managed IP must be |
//! |----------|--------------------|
//! | present  | unbound            |
//! | absent   | bound              |
//!
//! The bound set is read fresh before every decision and at most one
//! mutating call is made per invocation.

use crate::config::MonitorConfig;
use crate::detector::{Presence, PresenceObservation};
use crate::traits::InterfaceConfigurator;
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, error, info};

/// Prefix length used when binding or unbinding the managed IP
pub const MANAGED_PREFIX_LEN: u8 = 24;

/// Result of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Already in the desired state
    Unchanged { bound: bool },
    /// Managed IP was bound
    Added,
    /// Managed IP was unbound
    Removed,
    /// Dry-run: managed IP would have been bound
    WouldAdd,
    /// Dry-run: managed IP would have been unbound
    WouldRemove,
    /// Listing or mutating failed; the next iteration re-evaluates
    Failed { error: String },
}

impl ReconcileOutcome {
    /// Whether a mutating call was issued
    pub fn mutated(&self) -> bool {
        matches!(self, Self::Added | Self::Removed)
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged { bound: true } => f.write_str("no-op (bound)"),
            Self::Unchanged { bound: false } => f.write_str("no-op (unbound)"),
            Self::Added => f.write_str("added"),
            Self::Removed => f.write_str("removed"),
            Self::WouldAdd => f.write_str("would add"),
            Self::WouldRemove => f.write_str("would remove"),
            Self::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// Whether the managed IP should be bound locally for this verdict
pub fn should_bind(presence: Presence) -> bool {
    presence == Presence::Absent
}

/// Bring the interface in line with the observation
pub async fn reconcile(
    observation: &PresenceObservation,
    config: &MonitorConfig,
    interface: &dyn InterfaceConfigurator,
) -> ReconcileOutcome {
    let ip = config.target_ip;
    let name = config.interface.as_str();

    let bound = match interface.list_addresses(name).await {
        Ok(addresses) => addresses.contains(&ip),
        Err(e) => {
            error!("Failed to list addresses on {}: {}", name, e);
            return ReconcileOutcome::Failed {
                error: e.to_string(),
            };
        }
    };

    let desired = should_bind(observation.presence);
    if bound == desired {
        debug!(
            "{} is {} on {}, nothing to do ({} {})",
            ip,
            if bound { "bound" } else { "not bound" },
            name,
            config.target_mac,
            observation.presence
        );
        return ReconcileOutcome::Unchanged { bound };
    }

    if desired {
        apply_add(config, interface, ip).await
    } else {
        apply_remove(config, interface, ip).await
    }
}

async fn apply_add(
    config: &MonitorConfig,
    interface: &dyn InterfaceConfigurator,
    ip: Ipv4Addr,
) -> ReconcileOutcome {
    let name = config.interface.as_str();

    if config.dry_run {
        info!(
            "[dry-run] {} absent, would add {}/{} to {}",
            config.target_mac, ip, MANAGED_PREFIX_LEN, name
        );
        return ReconcileOutcome::WouldAdd;
    }

    match interface.add_address(name, ip, MANAGED_PREFIX_LEN).await {
        Ok(()) => {
            info!(
                "{} absent, added {}/{} to {}",
                config.target_mac, ip, MANAGED_PREFIX_LEN, name
            );
            ReconcileOutcome::Added
        }
        Err(e) => {
            error!("Failed to add {}/{} to {}: {}", ip, MANAGED_PREFIX_LEN, name, e);
            ReconcileOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

async fn apply_remove(
    config: &MonitorConfig,
    interface: &dyn InterfaceConfigurator,
    ip: Ipv4Addr,
) -> ReconcileOutcome {
    let name = config.interface.as_str();

    if config.dry_run {
        info!(
            "[dry-run] {} present at {}, would remove {}/{} from {}",
            config.target_mac, ip, ip, MANAGED_PREFIX_LEN, name
        );
        return ReconcileOutcome::WouldRemove;
    }

    match interface.remove_address(name, ip, MANAGED_PREFIX_LEN).await {
        Ok(()) => {
            info!(
                "{} present at {}, removed {}/{} from {}",
                config.target_mac, ip, ip, MANAGED_PREFIX_LEN, name
            );
            ReconcileOutcome::Removed
        }
        Err(e) => {
            error!(
                "Failed to remove {}/{} from {}: {}",
                ip, MANAGED_PREFIX_LEN, name, e
            );
            ReconcileOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
