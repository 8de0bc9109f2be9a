//! Log severity and filtering policy
//!
//! Diagnostics are emitted through `tracing`. The daemon installs a
//! subscriber that consults [`LogPolicy::allows`] for every event:
//!
//! - events sent with [`critical!`](crate::critical) always surface
//! - everything else is dropped in quiet mode
//! - otherwise events below `min_severity` are dropped

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracing target reserved for critical events.
pub const CRITICAL_TARGET: &str = "floatip::critical";

/// Emit a critical event.
///
/// Critical events bypass quiet mode and the severity threshold.
///
/// ```rust,ignore
/// floatip_core::critical!("arp-scan not found, install it with `apt-get install arp-scan`");
/// ```
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::error!(target: $crate::logging::CRITICAL_TARGET, $($arg)+)
    };
}

/// Ordered log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    #[serde(alias = "WARNING")]
    Warn,
    Error,
    Critical,
}

impl Severity {
    /// Map tracing metadata onto a severity
    pub fn from_metadata(meta: &tracing::Metadata<'_>) -> Self {
        if meta.target() == CRITICAL_TARGET {
            return Severity::Critical;
        }
        Self::from_level(meta.level())
    }

    /// Map a tracing level onto a severity; TRACE folds into DEBUG
    pub fn from_level(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::INFO => Severity::Info,
            _ => Severity::Debug,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(crate::Error::config(format!(
                "unknown log level '{}'. Valid levels: DEBUG, INFO, WARN, ERROR, CRITICAL",
                other
            ))),
        }
    }
}

/// Log filtering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogPolicy {
    /// Minimum severity for non-critical events
    #[serde(default)]
    pub min_severity: Severity,

    /// Suppress everything except critical events
    #[serde(default)]
    pub quiet: bool,

    /// Prefix each line with the local date and time
    #[serde(default)]
    pub show_datetime: bool,
}

impl LogPolicy {
    /// Decide whether an event surfaces
    pub fn allows(&self, severity: Severity, critical: bool) -> bool {
        if critical || severity == Severity::Critical {
            return true;
        }
        if self.quiet {
            return false;
        }
        severity >= self.min_severity
    }

    /// Decide from tracing metadata
    pub fn allows_metadata(&self, meta: &tracing::Metadata<'_>) -> bool {
        self.allows(
            Severity::from_metadata(meta),
            meta.target() == CRITICAL_TARGET,
        )
    }
}
