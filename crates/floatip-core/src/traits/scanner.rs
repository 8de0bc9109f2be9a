// # Presence Scanner Trait
//
// Defines the interface for observing which hardware addresses answer on a
// local segment.
//
// ## Implementations
//
// - arp-scan based: `floatip-arp-scan` crate
//
// ## Usage
//
// ```rust,ignore
// use floatip_core::PresenceScanner;
//
// let scanner = /* PresenceScanner implementation */;
// scanner.ensure_available().await?;
//
// for neighbor in scanner.scan("eth0").await? {
//     println!("{} is at {}", neighbor.mac, neighbor.ip);
// }
// ```

use crate::config::MacAddr;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// One (hardware address, network address) pair observed on a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
}

impl Neighbor {
    pub fn new(mac: MacAddr, ip: Ipv4Addr) -> Self {
        Self { mac, ip }
    }
}

/// Trait for presence scanner implementations
///
/// Scanners are **observers**: they report what answered on the segment and
/// make no decisions about what that means.
///
/// ## Retries
///
/// Any retrying against packet loss is done inside the scan itself (for
/// example `arp-scan --retry`). Callers invoke [`scan`](Self::scan) once per
/// iteration.
#[async_trait]
pub trait PresenceScanner: Send + Sync {
    /// Verify that the scan capability can be used at all
    ///
    /// Called once before the loop starts. An error here is fatal and should
    /// be [`Error::MissingDependency`](crate::Error::MissingDependency) with
    /// install instructions where possible.
    async fn ensure_available(&self) -> Result<(), crate::Error>;

    /// Scan the segment attached to `interface`
    ///
    /// # Returns
    ///
    /// - `Ok(neighbors)`: Every responding (MAC, IP) pair, possibly empty
    /// - `Err(Error)`: The scan could not be performed
    async fn scan(&self, interface: &str) -> Result<Vec<Neighbor>, crate::Error>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
