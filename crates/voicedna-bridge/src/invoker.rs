//! Deadline-bounded subprocess execution.
//!
//! The invoker spawns an executable with a discrete argument vector, drains
//! its stdout/stderr on background threads, and polls for exit. A process
//! still running at the deadline is killed and reaped before `run` returns.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::LaunchError;

/// Default per-stream capture limit (64 KiB).
pub const DEFAULT_OUTPUT_CAP: usize = 64 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for pipe readers after the child is gone.
const READER_GRACE: Duration = Duration::from_millis(200);

/// Result of one subprocess run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout followed by stderr, lossily decoded.
    pub captured_text: String,
    /// Whether the deadline expired and the process was killed.
    pub timed_out: bool,
    /// Wall time from spawn to reap.
    pub elapsed: Duration,
}

impl ProcessOutcome {
    /// Returns true if the process exited on its own with code 0.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs external executables with a deadline.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    output_cap: usize,
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self {
            output_cap: DEFAULT_OUTPUT_CAP,
        }
    }

    /// Sets the per-stream capture limit in bytes.
    pub fn output_cap(mut self, bytes: usize) -> Self {
        self.output_cap = bytes;
        self
    }

    /// Runs `executable` with `args`, waiting at most `deadline`.
    ///
    /// Each argument is passed to the OS as-is; nothing goes through a shell.
    pub fn run(
        &self,
        executable: &Path,
        args: &[String],
        deadline: Duration,
    ) -> Result<ProcessOutcome, LaunchError> {
        tracing::debug!(
            executable = %executable.display(),
            args = ?redact_args(args),
            deadline_ms = deadline.as_millis() as u64,
            "launching engine process"
        );

        let mut cmd = Command::new(executable);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| LaunchError::SpawnFailed {
            executable: executable.to_path_buf(),
            source,
        })?;

        let captures: Vec<Capture> = [
            child.stdout.take().map(|s| Capture::spawn(s, self.output_cap)),
            child.stderr.take().map(|s| Capture::spawn(s, self.output_cap)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let (exit_code, timed_out) = loop {
            match child.try_wait() {
                Ok(Some(status)) => break (status.code(), false),
                Ok(None) => {
                    let elapsed = start.elapsed();
                    if elapsed >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        break (None, true);
                    }
                    std::thread::sleep(POLL_INTERVAL.min(deadline - elapsed));
                }
                Err(e) => {
                    // The child can no longer be observed; make sure it does not linger.
                    tracing::warn!(error = %e, "failed to poll engine process");
                    let _ = child.kill();
                    let _ = child.wait();
                    break (None, false);
                }
            }
        };

        let captured_text = collect(&captures);
        let elapsed = start.elapsed();

        if timed_out {
            tracing::warn!(
                executable = %executable.display(),
                elapsed_ms = elapsed.as_millis() as u64,
                "engine process exceeded deadline and was killed"
            );
        } else {
            tracing::debug!(
                exit_code = ?exit_code,
                elapsed_ms = elapsed.as_millis() as u64,
                "engine process exited"
            );
        }

        Ok(ProcessOutcome {
            exit_code,
            captured_text,
            timed_out,
            elapsed,
        })
    }
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self::new()
    }
}

/// Masks the value following any `--password` flag for logging.
pub fn redact_args(args: &[String]) -> Vec<&str> {
    let mut out = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            out.push("***");
            mask_next = false;
        } else {
            mask_next = arg == "--password";
            out.push(arg.as_str());
        }
    }
    out
}

/// A pipe drained on its own thread into a capped shared buffer.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl Capture {
    fn spawn<R: Read + Send + 'static>(mut reader: R, cap: usize) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = std::thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let mut buf = sink.lock().unwrap_or_else(|e| e.into_inner());
                        let room = cap.saturating_sub(buf.len());
                        buf.extend_from_slice(&chunk[..n.min(room)]);
                    }
                }
            }
        });
        Self { buf, handle }
    }

    fn text(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Waits briefly for the readers, then joins whatever they captured.
///
/// Readers blocked past the grace period (a grandchild holding the pipe open)
/// are left behind; they finish on their own when the pipe closes.
fn collect(captures: &[Capture]) -> String {
    let start = Instant::now();
    while !captures.iter().all(|c| c.handle.is_finished()) && start.elapsed() < READER_GRACE {
        std::thread::sleep(Duration::from_millis(2));
    }

    let mut text = String::new();
    for capture in captures {
        let part = capture.text();
        if part.is_empty() {
            continue;
        }
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&part);
    }
    text
}
