//! Bounded subprocess execution.

use std::ffi::OsString;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{OracleError, OracleResult};

/// Output of a process that finished within its limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,

    /// Terminating signal, if any.
    pub signal: Option<i32>,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ProcessOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Context recorded when a process exceeds its wall-clock limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeoutDetail {
    /// Command line as text, for logs and `--dump`.
    pub argv: Vec<String>,
    pub limit_ms: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bounded {
    Finished(ProcessOutput),
    TimedOut(TimeoutDetail),
}

/// Run `argv` without a shell, capturing both output streams, and kill it if
/// it is still running after `limit`.
///
/// Stdin is closed. Spawn failures are oracle errors; everything the child
/// does after starting is reported through [`Bounded`].
pub async fn run_bounded(argv: &[OsString], limit: Duration) -> OracleResult<Bounded> {
    let start = Instant::now();

    let (exe, args) = argv.split_first().ok_or(OracleError::EmptyCommand)?;

    let child = Command::new(exe)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| OracleError::Spawn {
            program: exe.to_string_lossy().into_owned(),
            source,
        })?;

    // Dropping the wait future on expiry drops the child, which kills it.
    let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_elapsed) => {
            return Ok(Bounded::TimedOut(TimeoutDetail {
                argv: display_argv(argv),
                limit_ms: limit.as_millis() as u64,
                elapsed_ms: start.elapsed().as_millis() as u64,
            }));
        }
    };

    Ok(Bounded::Finished(ProcessOutput {
        exit_code: output.status.code(),
        signal: termination_signal(&output.status),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Lossy text form of a command line. Only for records; the process itself
/// always receives the original bytes.
pub fn display_argv(argv: &[OsString]) -> Vec<String> {
    argv.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(unix)]
fn termination_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
