//! External command execution
//!
//! Scanner and interface implementations drive system tools (`arp-scan`,
//! `ip`). Commands are spawned directly with an argument vector, never
//! through a shell, so interface names and addresses need no quoting.
//!
//! # Example
//!
//! ```ignore
//! use floatip_core::exec;
//!
//! let result = exec::exec("/sbin/ip", &["-o", "-4", "addr", "show", "dev", "eth0"]).await?;
//! if result.success() {
//!     println!("{}", result.stdout);
//! }
//! ```

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success, -1 = killed by a signal).
    pub exit_code: i32,
    /// Captured stdout, trimmed.
    pub stdout: String,
    /// Captured stderr, trimmed.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Render a program and its arguments for logs and error messages
pub fn command_line<S: AsRef<OsStr>>(program: impl AsRef<Path>, args: &[S]) -> String {
    let mut line = program.as_ref().display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Runs a command to completion and captures its output.
///
/// The child is killed if the returned future is dropped, so cancelling an
/// iteration never leaves a scan running in the background.
///
/// # Returns
///
/// * `Ok(ExecResult)` - The command ran (successfully or not)
/// * `Err(Error::Io)` - The command could not be spawned
pub async fn exec<S: AsRef<OsStr>>(program: impl AsRef<Path>, args: &[S]) -> Result<ExecResult> {
    let program = program.as_ref();
    let line = command_line(program, args);
    tracing::debug!(command = %line, "Executing command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    let result = ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if result.success() {
        tracing::trace!(command = %line, "Command succeeded");
    } else {
        tracing::debug!(
            command = %line,
            exit_code = result.exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Runs a command and turns a non-zero exit into [`Error::Command`].
///
/// # Returns
///
/// * `Ok(String)` - The stdout output on success
/// * `Err(Error)` - If the command cannot be spawned or exits non-zero
pub async fn exec_checked<S: AsRef<OsStr>>(program: impl AsRef<Path>, args: &[S]) -> Result<String> {
    let program = program.as_ref();
    let result = exec(program, args).await?;
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(Error::Command {
            command: command_line(program, args),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_result_combined() {
        let result = ExecResult {
            exit_code: 2,
            stdout: "stdout".to_string(),
            stderr: "stderr".to_string(),
        };
        assert!(!result.success());
        assert_eq!(result.combined_output(), "stdout\nstderr");
    }

    #[test]
    fn test_exec_result_stderr_only() {
        let result = ExecResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: "RTNETLINK answers: File exists".to_string(),
        };
        assert_eq!(result.combined_output(), "RTNETLINK answers: File exists");
    }

    #[test]
    fn test_command_line_rendering() {
        assert_eq!(
            command_line("/sbin/ip", &["addr", "add", "10.0.0.1/24", "dev", "eth0"]),
            "/sbin/ip addr add 10.0.0.1/24 dev eth0"
        );
    }

    #[tokio::test]
    async fn test_exec_captures_stdout() {
        let result = exec("/bin/sh", &["-c", "echo hello"]).await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "hello");
    }

    #[tokio::test]
    async fn test_exec_reports_exit_code() {
        let result = exec("/bin/sh", &["-c", "exit 42"]).await.unwrap();
        assert_eq!(result.exit_code, 42);
    }

    #[tokio::test]
    async fn test_exec_checked_failure() {
        match exec_checked("/bin/sh", &["-c", "echo nope >&2; exit 1"]).await {
            Err(Error::Command {
                exit_code, output, ..
            }) => {
                assert_eq!(exit_code, 1);
                assert_eq!(output, "nope");
            }
            other => panic!("Expected Command error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exec_missing_program_is_io_error() {
        let result = exec("/nonexistent/floatip-tool", &["--help"]).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
