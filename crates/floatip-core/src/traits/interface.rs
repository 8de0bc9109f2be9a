// # Interface Configurator Trait
//
// Defines the interface for reading and changing the addresses bound to a
// network interface.
//
// ## Implementations
//
// - iproute2 based (Linux): `floatip-iproute` crate

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/// Trait for interface configuration implementations
///
/// Every method reflects the live state of the host. Implementations must not
/// cache address sets between calls.
///
/// Mutations are single atomic operations: either the address transitions or
/// it does not. A rejected mutation is reported as an error, never as success.
#[async_trait]
pub trait InterfaceConfigurator: Send + Sync {
    /// Verify the process may change interface configuration
    async fn ensure_privileged(&self) -> Result<(), crate::Error>;

    /// Verify the tooling behind this configurator can be used at all
    ///
    /// Called once before the loop starts. Failures should be
    /// [`Error::MissingDependency`](crate::Error::MissingDependency).
    async fn ensure_available(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Whether an interface with this name exists
    async fn interface_exists(&self, interface: &str) -> Result<bool, crate::Error>;

    /// IPv4 addresses currently bound to `interface`
    async fn list_addresses(&self, interface: &str) -> Result<BTreeSet<Ipv4Addr>, crate::Error>;

    /// Bind `ip/prefix_len` to `interface`
    async fn add_address(
        &self,
        interface: &str,
        ip: Ipv4Addr,
        prefix_len: u8,
    ) -> Result<(), crate::Error>;

    /// Unbind `ip/prefix_len` from `interface`
    async fn remove_address(
        &self,
        interface: &str,
        ip: Ipv4Addr,
        prefix_len: u8,
    ) -> Result<(), crate::Error>;
}
