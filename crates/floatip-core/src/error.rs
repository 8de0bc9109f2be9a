//! Error types for floatip
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for floatip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for floatip
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required external tool is missing or not executable
    #[error("Missing dependency {tool}: {remediation}")]
    MissingDependency {
        /// Path or name of the tool
        tool: String,
        /// How to fix it
        remediation: String,
    },

    /// The process lacks interface-configuration privilege
    #[error("Insufficient privilege: {0}")]
    Privilege(String),

    /// The configured interface does not exist
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    /// Presence scan errors
    #[error("Scan error: {0}")]
    Scan(String),

    /// Interface configuration errors
    #[error("Interface error: {0}")]
    Interface(String),

    /// An external command exited unsuccessfully
    #[error("Command `{command}` failed with exit code {exit_code}: {output}")]
    Command {
        /// The command line that was run
        command: String,
        /// Exit code (-1 when killed by a signal)
        exit_code: i32,
        /// Captured stderr/stdout
        output: String,
    },

    /// I/O errors (spawning processes, reading metadata)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing dependency error
    pub fn missing_dependency(tool: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self::MissingDependency {
            tool: tool.into(),
            remediation: remediation.into(),
        }
    }

    /// Create a privilege error
    pub fn privilege(msg: impl Into<String>) -> Self {
        Self::Privilege(msg.into())
    }

    /// Create an "interface not found" error
    pub fn interface_not_found(name: impl Into<String>) -> Self {
        Self::InterfaceNotFound(name.into())
    }

    /// Create a scan error
    pub fn scan(msg: impl Into<String>) -> Self {
        Self::Scan(msg.into())
    }

    /// Create an interface error
    pub fn interface(msg: impl Into<String>) -> Self {
        Self::Interface(msg.into())
    }

    /// Whether this error must stop the daemon before the loop starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::MissingDependency { .. }
                | Self::Privilege(_)
                | Self::InterfaceNotFound(_)
        )
    }
}
