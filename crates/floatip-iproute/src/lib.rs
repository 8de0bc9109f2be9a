// # iproute2 Interface Configurator
//
// This crate provides an `InterfaceConfigurator` that drives the iproute2
// `ip` command.
//
// ## Commands
//
// | operation        | command                                   |
// |------------------|-------------------------------------------|
// | interface_exists | `ip -o link show dev <if>`                |
// | list_addresses   | `ip -o -4 addr show dev <if>`             |
// | add_address      | `ip addr add <ip>/<prefix> dev <if>`      |
// | remove_address   | `ip addr del <ip>/<prefix> dev <if>`      |
//
// Each mutation is one `ip` invocation, which the kernel applies atomically.
//
// ## Platform Support
//
// The privilege check uses the effective uid and is only meaningful on Unix.
// A missing `ip` binary is reported as a missing dependency with install
// instructions, both during preflight and on any later invocation.

use floatip_core::exec;
use floatip_core::traits::InterfaceConfigurator;
use floatip_core::{Error, Result};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing::debug;

/// Path to the `ip` command for network interface configuration.
pub const IP_CMD: &str = "/sbin/ip";

/// Installation hint attached to missing-tool errors
const INSTALL_HINT: &str =
    "install iproute2 (Debian/Ubuntu: `apt-get install iproute2`, Fedora: `dnf install iproute`)";

/// iproute2 based interface configurator
#[derive(Debug, Clone)]
pub struct IprouteInterface {
    ip_cmd: PathBuf,
}

impl IprouteInterface {
    pub fn new() -> Self {
        Self::with_command(IP_CMD)
    }

    /// Use a different `ip` binary
    pub fn with_command(ip_cmd: impl Into<PathBuf>) -> Self {
        Self {
            ip_cmd: ip_cmd.into(),
        }
    }

    fn missing(&self, reason: &str) -> Error {
        Error::missing_dependency(
            self.ip_cmd.display().to_string(),
            format!("{}; {}", reason, INSTALL_HINT),
        )
    }

    /// A spawn failure because the binary is gone becomes a missing dependency
    fn spawn_error(&self, err: Error) -> Error {
        match err {
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => self.missing("not found"),
            other => other,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<exec::ExecResult> {
        exec::exec(&self.ip_cmd, args)
            .await
            .map_err(|e| self.spawn_error(e))
    }

    async fn run_checked(&self, args: &[&str]) -> Result<String> {
        exec::exec_checked(&self.ip_cmd, args)
            .await
            .map_err(|e| self.spawn_error(e))
    }

    async fn change_address(
        &self,
        op: &str,
        interface: &str,
        ip: Ipv4Addr,
        prefix_len: u8,
    ) -> Result<()> {
        let args = address_args(op, interface, ip, prefix_len);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_checked(&args).await?;
        debug!("ip addr {} {}/{} dev {} applied", op, ip, prefix_len, interface);
        Ok(())
    }
}

impl Default for IprouteInterface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InterfaceConfigurator for IprouteInterface {
    async fn ensure_privileged(&self) -> Result<()> {
        let euid = effective_uid();
        if euid != 0 {
            return Err(Error::privilege(format!(
                "changing interface addresses requires root (effective uid is {}); \
                 run floatipd as root or via sudo",
                euid
            )));
        }
        Ok(())
    }

    async fn ensure_available(&self) -> Result<()> {
        let metadata = match tokio::fs::metadata(&self.ip_cmd).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(self.missing("not found"));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        if !metadata.is_file() || !is_executable(&metadata) {
            return Err(self.missing("not an executable file"));
        }

        Ok(())
    }

    async fn interface_exists(&self, interface: &str) -> Result<bool> {
        let result = self.run(&["-o", "link", "show", "dev", interface]).await?;
        Ok(result.success())
    }

    async fn list_addresses(&self, interface: &str) -> Result<BTreeSet<Ipv4Addr>> {
        let output = self
            .run_checked(&["-o", "-4", "addr", "show", "dev", interface])
            .await?;
        Ok(parse_addresses(&output))
    }

    async fn add_address(&self, interface: &str, ip: Ipv4Addr, prefix_len: u8) -> Result<()> {
        self.change_address("add", interface, ip, prefix_len).await
    }

    async fn remove_address(&self, interface: &str, ip: Ipv4Addr, prefix_len: u8) -> Result<()> {
        self.change_address("del", interface, ip, prefix_len).await
    }
}

/// Arguments for `ip addr add|del`
pub fn address_args(op: &str, interface: &str, ip: Ipv4Addr, prefix_len: u8) -> Vec<String> {
    vec![
        "addr".to_string(),
        op.to_string(),
        format!("{}/{}", ip, prefix_len),
        "dev".to_string(),
        interface.to_string(),
    ]
}

/// Parse `ip -o -4 addr show` output into the bound IPv4 addresses
pub fn parse_addresses(output: &str) -> BTreeSet<Ipv4Addr> {
    let mut addresses = BTreeSet::new();
    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            if token != "inet" {
                continue;
            }
            let Some(cidr) = tokens.next() else {
                break;
            };
            let addr = cidr.split('/').next().unwrap_or(cidr);
            if let Ok(ip) = addr.parse::<Ipv4Addr>() {
                addresses.insert(ip);
            }
        }
    }
    addresses
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[cfg(unix)]
fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}

#[cfg(not(unix))]
fn effective_uid() -> u32 {
    u32::MAX
}
