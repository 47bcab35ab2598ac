//! Packwiz tool invocation
//!
//! Runs packwiz under a hard timeout and captures combined stdout/stderr.
//! Spawn failures and timeouts are folded into the captured output instead
//! of being raised: the sync loop treats every tool problem as one more
//! retryable attempt, bounded only by its budget.

use anyhow::{bail, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Timeout for one packwiz invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for collecting output from child process pipes.
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Exit status and combined output of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    fn failed(output: impl Into<String>) -> Self {
        ToolOutput {
            success: false,
            output: output.into(),
        }
    }
}

/// Check that packwiz is installed and on PATH.
pub fn check_packwiz_available() -> Result<()> {
    if which::which("packwiz").is_err() {
        bail!("packwiz is required but was not found on PATH. Install it from https://packwiz.infra.link/");
    }
    Ok(())
}

/// Run `packwiz <args>` in the pack directory.
pub fn run_packwiz(args: &[&str], pack_dir: &Path, timeout: Duration) -> ToolOutput {
    run_tool("packwiz", args, pack_dir, timeout)
}

pub(crate) fn run_tool(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> ToolOutput {
    let mut child = match Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => return ToolOutput::failed(format!("Failed to spawn {program}: {err}")),
    };

    // Drain the pipes before waiting: a child blocked on a full pipe buffer
    // would otherwise never exit.
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    let (stdout_tx, stdout_rx) = mpsc::channel();
    let (stderr_tx, stderr_rx) = mpsc::channel();

    if let Some(stdout) = stdout_handle {
        thread::spawn(move || {
            let _ = stdout_tx.send(read_stream_to_string(stdout));
        });
    } else {
        let _ = stdout_tx.send(String::new());
    }

    if let Some(stderr) = stderr_handle {
        thread::spawn(move || {
            let _ = stderr_tx.send(read_stream_to_string(stderr));
        });
    } else {
        let _ = stderr_tx.send(String::new());
    }

    let wait_result = match child.wait_timeout(timeout) {
        Ok(result) => result,
        Err(err) => {
            kill_child(&mut child);
            return ToolOutput::failed(format!("Failed to wait for {program}: {err}"));
        }
    };

    if wait_result.is_none() {
        // Kill before draining so the reader threads see EOF promptly.
        kill_child(&mut child);
    }

    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let combined = format!("{stdout}{stderr}");

    match wait_result {
        Some(status) => ToolOutput {
            success: status.success(),
            output: combined,
        },
        None => ToolOutput::failed(format!(
            "{combined}\nCommand timed out after {}s",
            timeout.as_secs()
        )),
    }
}

fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    if stream.read_to_end(&mut buf).is_err() && buf.is_empty() {
        return "[error reading output]".to_string();
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Kill and reap a timed-out child. Errors are ignored since the process
/// may have already exited.
fn kill_child(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}
