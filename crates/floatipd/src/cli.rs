//! Command line and environment configuration
//!
//! Every option can be given as a flag or through its `FLOATIP_*`
//! environment variable; flags win.

use clap::Parser;
use clap::builder::FalseyValueParser;
use floatip_core::{Error, LogPolicy, MacAddr, MonitorConfig, RunMode, ScanSettings, Severity};
use std::net::Ipv4Addr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "floatipd", version)]
#[command(
    about = "Bind a floating IP while a peer's MAC address is absent from the local segment."
)]
pub struct Cli {
    /// Hardware address of the peer to watch (e.g. AA:BB:CC:DD:EE:FF)
    #[arg(short = 'm', long = "mac", env = "FLOATIP_MAC", value_name = "MAC")]
    pub mac: Option<String>,

    /// Address the peer answers on; bound locally while the peer is absent
    #[arg(short = 'a', long = "ip", env = "FLOATIP_IP", value_name = "IPV4")]
    pub ip: Option<String>,

    /// Interface to scan and to manage the address on
    #[arg(short = 'i', long = "interface", env = "FLOATIP_INTERFACE", value_name = "IFACE")]
    pub interface: Option<String>,

    /// Seconds to sleep between scans
    #[arg(
        short = 't',
        long = "interval",
        env = "FLOATIP_INTERVAL",
        default_value_t = 10,
        value_name = "SECS"
    )]
    pub interval: u64,

    /// Log what would change without touching the interface
    #[arg(short = 'd', long = "dry-run", env = "FLOATIP_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Run a single scan/reconcile cycle and exit
    #[arg(short = '1', long = "once", env = "FLOATIP_ONCE", value_parser = FalseyValueParser::new())]
    pub once: bool,

    /// Only print critical messages
    #[arg(short = 'q', long = "quiet", env = "FLOATIP_QUIET", value_parser = FalseyValueParser::new())]
    pub quiet: bool,

    /// Minimum log level: DEBUG, INFO, WARN, ERROR or CRITICAL
    #[arg(
        short = 'l',
        long = "log-level",
        env = "FLOATIP_LOG_LEVEL",
        default_value = "INFO",
        value_name = "LEVEL"
    )]
    pub log_level: Severity,

    /// Prefix log lines with the date and time
    #[arg(short = 'T', long = "log-datetime", env = "FLOATIP_LOG_DATETIME", value_parser = FalseyValueParser::new())]
    pub log_datetime: bool,

    /// Path to the arp-scan binary
    #[arg(
        long = "scan-tool",
        env = "FLOATIP_SCAN_TOOL",
        default_value = "/usr/sbin/arp-scan",
        value_name = "PATH"
    )]
    pub scan_tool: PathBuf,

    /// Retries arp-scan performs for each host
    #[arg(
        long = "scan-retries",
        env = "FLOATIP_SCAN_RETRIES",
        default_value_t = 3,
        value_name = "N"
    )]
    pub scan_retries: u32,
}

impl Cli {
    /// Logging policy; available before the rest is validated
    pub fn log_policy(&self) -> LogPolicy {
        LogPolicy {
            min_severity: self.log_level,
            quiet: self.quiet,
            show_datetime: self.log_datetime,
        }
    }

    /// Build and validate the monitor configuration
    pub fn into_config(self) -> Result<MonitorConfig, Error> {
        let log = self.log_policy();

        let mac: MacAddr = required(self.mac.as_deref(), "--mac", "FLOATIP_MAC")?.parse()?;

        let ip_text = required(self.ip.as_deref(), "--ip", "FLOATIP_IP")?;
        let ip: Ipv4Addr = ip_text.trim().parse().map_err(|_| {
            Error::config(format!(
                "invalid IPv4 address '{}', expected dotted quad like 192.168.1.100",
                ip_text
            ))
        })?;

        let interface = required(self.interface.as_deref(), "--interface", "FLOATIP_INTERFACE")?;

        let run_mode = if self.once {
            RunMode::SingleShot
        } else {
            RunMode::Continuous
        };

        let config = MonitorConfig::new(mac, ip, interface.trim())
            .with_scan_interval_secs(self.interval)
            .with_run_mode(run_mode)
            .with_dry_run(self.dry_run)
            .with_log_policy(log)
            .with_scan_settings(ScanSettings {
                tool: self.scan_tool,
                retries: self.scan_retries,
            });

        config.validate()?;
        Ok(config)
    }
}

fn required<'a>(value: Option<&'a str>, flag: &str, env: &str) -> Result<&'a str, Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::config(format!(
            "{} is required. Set it via {} or export {}=...",
            flag.trim_start_matches('-'),
            flag,
            env
        ))),
    }
}
