// # arp-scan Presence Scanner
//
// This crate provides a `PresenceScanner` backed by the `arp-scan` binary.
//
// ## Invocation
//
// ```text
// arp-scan --interface=<if> --localnet --retry=<n> --quiet
// ```
//
// `--retry` makes arp-scan itself resend unanswered requests, which absorbs
// transient packet loss without any retry logic on our side.
//
// ## Output
//
// Responding hosts are printed one per line as `<ip>\t<mac>[\t...]`.
// Banner, summary and blank lines do not parse as such and are skipped.

use floatip_core::config::{MacAddr, ScanSettings};
use floatip_core::exec;
use floatip_core::traits::{Neighbor, PresenceScanner};
use floatip_core::{Error, Result};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing::debug;

/// Installation hint attached to missing-tool errors
const INSTALL_HINT: &str =
    "install arp-scan (Debian/Ubuntu: `apt-get install arp-scan`, Fedora: `dnf install arp-scan`) \
     or point --scan-tool at the binary";

/// arp-scan based presence scanner
#[derive(Debug, Clone)]
pub struct ArpScanner {
    /// Path to the arp-scan binary
    tool: PathBuf,

    /// Retries performed by arp-scan per host
    retries: u32,
}

impl ArpScanner {
    pub fn new(tool: impl Into<PathBuf>, retries: u32) -> Self {
        Self {
            tool: tool.into(),
            retries,
        }
    }

    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self::new(settings.tool.clone(), settings.retries)
    }

    /// Command-line arguments for a scan of `interface`
    pub fn scan_args(&self, interface: &str) -> Vec<String> {
        vec![
            format!("--interface={}", interface),
            "--localnet".to_string(),
            format!("--retry={}", self.retries),
            "--quiet".to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl PresenceScanner for ArpScanner {
    async fn ensure_available(&self) -> Result<()> {
        let tool = self.tool.display().to_string();

        let metadata = match tokio::fs::metadata(&self.tool).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::missing_dependency(
                    tool,
                    format!("not found; {}", INSTALL_HINT),
                ));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        if !metadata.is_file() || !is_executable(&metadata) {
            return Err(Error::missing_dependency(
                tool,
                format!("not an executable file; {}", INSTALL_HINT),
            ));
        }

        Ok(())
    }

    async fn scan(&self, interface: &str) -> Result<Vec<Neighbor>> {
        let args = self.scan_args(interface);
        let result = exec::exec(&self.tool, args.as_slice()).await?;

        if !result.success() {
            return Err(Error::scan(format!(
                "{} exited with {}: {}",
                exec::command_line(&self.tool, args.as_slice()),
                result.exit_code,
                result.combined_output()
            )));
        }

        let neighbors = parse_output(&result.stdout);
        debug!("arp-scan on {} found {} host(s)", interface, neighbors.len());
        Ok(neighbors)
    }

    fn name(&self) -> &'static str {
        "arp-scan"
    }
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

/// Parse arp-scan output into (MAC, IP) neighbors
pub fn parse_output(output: &str) -> Vec<Neighbor> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Neighbor> {
    let mut fields = line.split_whitespace();
    let ip: Ipv4Addr = fields.next()?.parse().ok()?;
    let mac: MacAddr = fields.next()?.parse().ok()?;
    Some(Neighbor::new(mac, ip))
}
