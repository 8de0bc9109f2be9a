//! Presence detection
//!
//! Answers one question per iteration: does the target hardware address
//! currently respond at the target network address on this interface?
//!
//! The verdict is always [`Presence::Present`] or [`Presence::Absent`].
//! A failed or empty scan counts as absence so that the loop keeps running.

use crate::config::MonitorConfig;
use crate::traits::{Neighbor, PresenceScanner};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, warn};

/// Presence verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Present,
    Absent,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Present => f.write_str("present"),
            Presence::Absent => f.write_str("absent"),
        }
    }
}

/// A verdict, valid only for the instant it was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceObservation {
    pub presence: Presence,
    pub observed_at: DateTime<Utc>,
}

impl PresenceObservation {
    pub fn new(presence: Presence) -> Self {
        Self {
            presence,
            observed_at: Utc::now(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.presence == Presence::Present
    }
}

/// Scan the configured interface and decide presence
pub async fn detect(config: &MonitorConfig, scanner: &dyn PresenceScanner) -> PresenceObservation {
    let neighbors = match scanner.scan(&config.interface).await {
        Ok(neighbors) => neighbors,
        Err(e) => {
            debug!(
                "{} scan on {} failed, treating {} as absent: {}",
                scanner.name(),
                config.interface,
                config.target_mac,
                e
            );
            return PresenceObservation::new(Presence::Absent);
        }
    };

    debug!(
        "{} scan on {} returned {} neighbor(s)",
        scanner.name(),
        config.interface,
        neighbors.len()
    );

    PresenceObservation::new(evaluate(config, &neighbors))
}

/// Decide presence from a scan result
pub fn evaluate(config: &MonitorConfig, neighbors: &[Neighbor]) -> Presence {
    let matches: Vec<&Neighbor> = neighbors
        .iter()
        .filter(|n| n.mac == config.target_mac)
        .collect();

    if matches.is_empty() {
        debug!("{} not found on {}", config.target_mac, config.interface);
        return Presence::Absent;
    }

    if matches.iter().any(|n| n.ip == config.target_ip) {
        debug!("{} found at {}", config.target_mac, config.target_ip);
        return Presence::Present;
    }

    let seen_at: Vec<String> = matches.iter().map(|n| n.ip.to_string()).collect();
    warn!(
        "{} answered at {} but not at {}, treating as absent",
        config.target_mac,
        seen_at.join(", "),
        config.target_ip
    );
    Presence::Absent
}
