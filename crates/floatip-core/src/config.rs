//! Configuration types for floatip
//!
//! A [`MonitorConfig`] is built once at startup, validated, and then shared
//! immutably with the detector, the reconciler and the monitor loop.

use crate::logging::LogPolicy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Linux limits interface names to IFNAMSIZ - 1 bytes
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Main monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Hardware address whose presence is watched
    pub target_mac: MacAddr,

    /// Network address the peer answers on; also the managed (floating) IP
    pub target_ip: Ipv4Addr,

    /// Interface to scan and to bind the managed IP on (e.g., "eth0")
    pub interface: String,

    /// Pause between iterations (in seconds)
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    /// Continuous loop or a single detect/reconcile cycle
    #[serde(default)]
    pub run_mode: RunMode,

    /// Log mutating actions instead of performing them
    #[serde(default)]
    pub dry_run: bool,

    /// Log filtering policy
    #[serde(default)]
    pub log: LogPolicy,

    /// External scanner settings
    #[serde(default)]
    pub scan: ScanSettings,
}

impl MonitorConfig {
    /// Create a new configuration with defaults for everything but the target triple
    pub fn new(target_mac: MacAddr, target_ip: Ipv4Addr, interface: impl Into<String>) -> Self {
        Self {
            target_mac,
            target_ip,
            interface: interface.into(),
            scan_interval_secs: default_scan_interval_secs(),
            run_mode: RunMode::default(),
            dry_run: false,
            log: LogPolicy::default(),
            scan: ScanSettings::default(),
        }
    }

    /// Set the scan interval
    pub fn with_scan_interval_secs(mut self, secs: u64) -> Self {
        self.scan_interval_secs = secs;
        self
    }

    /// Set the run mode
    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    /// Enable or disable dry-run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the log policy
    pub fn with_log_policy(mut self, log: LogPolicy) -> Self {
        self.log = log;
        self
    }

    /// Set the scanner settings
    pub fn with_scan_settings(mut self, scan: ScanSettings) -> Self {
        self.scan = scan;
        self
    }

    /// Pause between iterations
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.target_mac.is_zero() {
            return Err(crate::Error::config(
                "target hardware address cannot be 00:00:00:00:00:00",
            ));
        }

        if self.target_ip.is_unspecified() || self.target_ip.is_broadcast() {
            return Err(crate::Error::config(format!(
                "target network address {} cannot be used as a managed IP",
                self.target_ip
            )));
        }

        if self.interface.is_empty() {
            return Err(crate::Error::config("interface name is required"));
        }

        if self.interface.len() > MAX_INTERFACE_NAME_LEN {
            return Err(crate::Error::config(format!(
                "interface name '{}' is longer than {} characters",
                self.interface, MAX_INTERFACE_NAME_LEN
            )));
        }

        if self
            .interface
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == ':')
        {
            return Err(crate::Error::config(format!(
                "interface name '{}' contains invalid characters",
                self.interface
            )));
        }

        self.scan.validate()?;

        Ok(())
    }
}

/// Loop mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Loop forever, sleeping `scan_interval` between cycles
    #[default]
    Continuous,
    /// Exactly one detect/reconcile cycle
    SingleShot,
}

/// External scanner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Path of the scan tool
    #[serde(default = "default_scan_tool")]
    pub tool: PathBuf,

    /// Retries performed by the scan tool itself
    #[serde(default = "default_scan_retries")]
    pub retries: u32,
}

impl ScanSettings {
    /// Validate the scanner settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.tool.as_os_str().is_empty() {
            return Err(crate::Error::config("scan tool path cannot be empty"));
        }
        if self.retries == 0 {
            return Err(crate::Error::config("scan retries must be > 0"));
        }
        Ok(())
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            tool: default_scan_tool(),
            retries: default_scan_retries(),
        }
    }
}

fn default_scan_interval_secs() -> u64 {
    10
}

fn default_scan_tool() -> PathBuf {
    PathBuf::from("/usr/sbin/arp-scan")
}

fn default_scan_retries() -> u32 {
    3
}

/// A 48-bit hardware (MAC) address
///
/// Parsed from colon-separated hex octets in either case; equality compares
/// octets, so `AA:BB:..` and `aa:bb:..` are the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(crate::Error::config("target hardware address is required"));
        }

        let invalid = || {
            crate::Error::config(format!(
                "invalid hardware address '{}', expected six colon-separated hex octets",
                s
            ))
        };

        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || part.len() > 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
