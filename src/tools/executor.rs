//! Process Executor
//!
//! Runs an external program with an argument vector, captures both output
//! streams and enforces a wall-clock timeout.
//!
//! # Security
//!
//! - Programs are spawned directly with `tokio::process::Command`, never via
//!   `sh -c`, so argument contents are never interpreted by a shell
//! - stdin is attached to the null device
//! - Output is capped at a configurable size
//!
//! # Cleanup
//!
//! On Unix every child is placed in its own process group. When the timeout
//! elapses the whole group receives `SIGKILL` and the child is reaped before
//! `execute` returns, so nothing outlives the call.

use super::timeout::ExecutionTimeout;
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command as TokioCommand};
use tracing::{debug, info, warn};

/// Default output cap per stream (16 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 16 * 1024 * 1024;

/// Failures that prevent a result from being produced at all
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of one process execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the process exited with status 0
    pub success: bool,

    /// Standard output (lossy UTF-8, truncated if too large)
    pub stdout: String,

    /// Standard error (lossy UTF-8, truncated if too large)
    pub stderr: String,

    /// Exit code; a negated signal number if the process was killed by a signal,
    /// `None` if it timed out
    pub exit_code: Option<i32>,

    /// OS process id of the spawned child
    pub pid: Option<u32>,

    /// Execution duration in milliseconds
    pub duration_ms: f64,

    /// Whether execution timed out
    pub timed_out: bool,
}

impl ExecutionResult {
    fn completed(
        status: ExitStatus,
        stdout: String,
        stderr: String,
        pid: Option<u32>,
        duration_ms: f64,
    ) -> Self {
        Self {
            success: status.success(),
            stdout,
            stderr,
            exit_code: exit_code(&status),
            pid,
            duration_ms,
            timed_out: false,
        }
    }

    fn timeout(pid: Option<u32>, duration_ms: f64) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            pid,
            duration_ms,
            timed_out: true,
        }
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        if self.timed_out {
            format!("Timeout after {:.0}ms", self.duration_ms)
        } else if self.success {
            format!(
                "Success (exit code: {:?}, {:.0}ms, {} bytes output)",
                self.exit_code,
                self.duration_ms,
                self.stdout.len()
            )
        } else {
            format!(
                "Failed (exit code: {:?}, {:.0}ms, {} bytes output)",
                self.exit_code,
                self.duration_ms,
                self.stdout.len() + self.stderr.len()
            )
        }
    }
}

/// Configuration for process execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Timeout for execution (default: 30 seconds)
    pub timeout: ExecutionTimeout,

    /// Maximum captured bytes per stream (default: 16 MiB)
    pub max_output_size: usize,

    /// Working directory for the child (default: inherited)
    pub working_dir: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: ExecutionTimeout::default(),
            max_output_size: DEFAULT_MAX_OUTPUT_BYTES,
            working_dir: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a new executor config with custom timeout
    pub fn with_timeout(timeout: ExecutionTimeout) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Set the output cap
    pub fn max_output_size(mut self, size: usize) -> Self {
        self.max_output_size = size;
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: Option<String>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// Executor for argv-only subprocess execution
///
/// # Example
///
/// ```no_run
/// use netops_mcp::tools::ProcessExecutor;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let executor = ProcessExecutor::new();
///     let args = vec!["-s".to_string(), "https://example.com".to_string()];
///
///     let result = executor.execute("curl", &args).await?;
///     println!("{}", result.summary());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    config: ExecutorConfig,
}

impl ProcessExecutor {
    /// Create a new executor with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new executor with custom configuration
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the config
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `program` with `args` and wait for it, bounded by the timeout
    ///
    /// A non-zero exit is not an error; inspect [`ExecutionResult::exit_code`].
    /// A timeout is reported as `Ok` with `timed_out` set.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] if the process cannot be spawned or waiting
    /// on it fails.
    pub async fn execute(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<ExecutionResult, ExecutionError> {
        let start = Instant::now();
        let cmd_str = describe_command(program, args);

        let mut command = TokioCommand::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        if let Some(ref dir) = self.config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
            program: program.to_string(),
            source,
        })?;
        metrics::PROCESSES_SPAWNED_TOTAL.inc();

        let pid = child.id();
        info!(pid = ?pid, "Executing: {}", cmd_str);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let max = self.config.max_output_size;

        let waited = self
            .config
            .timeout
            .run(async {
                tokio::try_join!(child.wait(), read_stream(stdout, max), read_stream(stderr, max))
            })
            .await;

        let duration_ms = start.elapsed().as_millis() as f64;

        let (status, stdout, stderr) = match waited {
            Ok(Ok(collected)) => collected,
            Ok(Err(source)) => {
                terminate(pid, &mut child).await;
                return Err(ExecutionError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
            Err(elapsed) => {
                warn!(pid = ?pid, "Command {}: {}", elapsed, cmd_str);
                metrics::PROCESS_TIMEOUTS_TOTAL.inc();
                terminate(pid, &mut child).await;
                return Ok(ExecutionResult::timeout(pid, duration_ms));
            }
        };

        let result = ExecutionResult::completed(
            status,
            truncate_output(&stdout, max),
            truncate_output(&stderr, max),
            pid,
            duration_ms,
        );

        if result.success {
            debug!("Command succeeded: {} ({})", cmd_str, result.summary());
        } else {
            warn!("Command failed: {} ({})", cmd_str, result.summary());
        }

        Ok(result)
    }
}

/// Read a captured stream to its end, keeping at most `max` bytes
///
/// The stream is drained past the cap so the child never blocks on a full pipe.
async fn read_stream<R>(stream: Option<R>, max: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return Ok(Vec::new());
    };

    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        // Keep one byte past the cap so truncation can be detected
        let room = (max + 1).saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(kept)
}

/// Kill the child's process group and reap the child
///
/// `pid` is the id captured at spawn. The group outlives the child while any
/// member is alive, so it is signalled even if the child was already reaped.
async fn terminate(pid: Option<u32>, child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            // SAFETY: killpg has no memory-safety preconditions; the group id
            // is the child's pid because it was spawned with process_group(0).
            let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if rc != 0 {
                debug!(pid, "killpg failed: {}", std::io::Error::last_os_error());
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    // Errors here mean the child was already reaped
    if let Err(e) = child.kill().await {
        debug!("Failed to kill process: {}", e);
    }
}

#[cfg(unix)]
fn exit_code(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|signal| -signal))
}

#[cfg(not(unix))]
fn exit_code(status: &ExitStatus) -> Option<i32> {
    status.code()
}

/// Log-safe rendering of a command line
fn describe_command(program: &str, args: &[String]) -> String {
    if args.len() > 3 {
        format!("{:?} ... ({} args)", program, args.len())
    } else {
        format!("{:?} {:?}", program, args)
    }
}

/// Decode captured bytes and cap them at `max_len` bytes, adding an ellipsis
/// if truncated
fn truncate_output(bytes: &[u8], max_len: usize) -> String {
    let mut s = String::from_utf8_lossy(bytes).into_owned();
    if bytes.len() > max_len {
        let mut cut = max_len.saturating_sub(3).min(s.len());
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Poll until `pid` has exited; orphans are reaped by init, so allow a moment
    async fn wait_until_gone(pid: i32) -> bool {
        for _ in 0..50 {
            let status = std::fs::read_to_string(format!("/proc/{}/stat", pid));
            let gone = match status {
                Err(_) => true,
                // Zombie state still counts as terminated
                Ok(stat) => stat.split_whitespace().nth(2) == Some("Z"),
            };
            if gone {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_execute_echo() {
        let executor = ProcessExecutor::new();
        let result = executor.execute("echo", &args(&["hello world"])).await.unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "hello world\n");
        assert!(result.stderr.is_empty());
        assert!(!result.timed_out);
        assert!(result.pid.is_some());
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let executor = ProcessExecutor::new();
        let result = executor.execute("false", &[]).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_execute_captures_stderr() {
        let executor = ProcessExecutor::new();
        let result = executor
            .execute("sh", &args(&["-c", "echo oops >&2; exit 3"]))
            .await
            .unwrap();

        assert!(result.stdout.is_empty());
        assert_eq!(result.stderr, "oops\n");
        assert_eq!(result.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let executor = ProcessExecutor::new();
        let result = executor
            .execute("echo", &args(&["test; echo injected", "$(id)"]))
            .await
            .unwrap();

        assert_eq!(result.stdout, "test; echo injected $(id)\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_and_reaps() {
        let config = ExecutorConfig::with_timeout(ExecutionTimeout::new(Duration::from_millis(300)));
        let executor = ProcessExecutor::with_config(config);

        let result = executor.execute("sleep", &args(&["10"])).await.unwrap();

        assert!(!result.success);
        assert!(result.timed_out);
        assert!(result.exit_code.is_none());
        assert!(result.duration_ms < 5000.0);

        let pid = result.pid.expect("timed out child should have had a pid");
        let alive = unsafe { libc::kill(pid as libc::pid_t, 0) } == 0;
        assert!(!alive, "child {} still exists after timeout", pid);
    }

    #[tokio::test]
    async fn test_timeout_kills_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

        let config = ExecutorConfig::with_timeout(ExecutionTimeout::from_secs(1));
        let executor = ProcessExecutor::with_config(config);
        let result = executor.execute("sh", &args(&["-c", &script])).await.unwrap();
        assert!(result.timed_out);

        let grandchild: i32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        assert!(
            wait_until_gone(grandchild).await,
            "grandchild {} survived the timeout",
            grandchild
        );
    }

    #[tokio::test]
    async fn test_timeout_kills_group_after_parent_exits() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        // The shell exits at once; the background sleep keeps stdout open
        let script = format!("sleep 30 & echo $! > {}", pid_file.display());

        let config = ExecutorConfig::with_timeout(ExecutionTimeout::from_secs(1));
        let executor = ProcessExecutor::with_config(config);
        let result = executor.execute("sh", &args(&["-c", &script])).await.unwrap();
        assert!(result.timed_out);

        let grandchild: i32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(
            wait_until_gone(grandchild).await,
            "grandchild {} survived the timeout",
            grandchild
        );
    }

    #[tokio::test]
    async fn test_output_truncation() {
        let config = ExecutorConfig::default().max_output_size(100);
        let executor = ProcessExecutor::with_config(config);

        let result = executor.execute("seq", &args(&["1000"])).await.unwrap();

        assert!(result.success);
        assert_eq!(result.stdout.len(), 100);
        assert!(result.stdout.ends_with("..."));
    }

    #[tokio::test]
    async fn test_nonexistent_command() {
        let executor = ProcessExecutor::new();

        let err = executor
            .execute("this-command-does-not-exist-12345", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Spawn { .. }));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[tokio::test]
    async fn test_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let config = ExecutorConfig::default()
            .working_dir(Some(canonical.to_string_lossy().into_owned()));
        let executor = ProcessExecutor::with_config(config);

        let result = executor.execute("pwd", &[]).await.unwrap();

        assert!(result.success);
        assert_eq!(result.stdout.trim(), canonical.to_string_lossy());
    }

    #[tokio::test]
    async fn test_signal_exit_code_is_negated() {
        let executor = ProcessExecutor::new();
        let result = executor
            .execute("sh", &args(&["-c", "kill -9 $$"]))
            .await
            .unwrap();

        assert_eq!(result.exit_code, Some(-9));
    }

    #[test]
    fn test_execution_result_summary() {
        let ok = ExecutionResult {
            success: true,
            stdout: "output".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
            pid: None,
            duration_ms: 100.0,
            timed_out: false,
        };
        assert!(ok.summary().contains("Success"));

        let failed = ExecutionResult {
            success: false,
            exit_code: Some(1),
            ..ok.clone()
        };
        assert!(failed.summary().contains("Failed"));

        assert!(ExecutionResult::timeout(None, 5000.0).summary().contains("Timeout"));
    }

    #[test]
    fn test_truncate_output() {
        assert_eq!(truncate_output(b"hello", 10), "hello");
        assert_eq!(truncate_output(b"hello", 5), "hello");
        assert_eq!(truncate_output(b"hello world", 5), "he...");
        assert_eq!(truncate_output(b"", 10), "");
    }

    #[test]
    fn test_truncate_output_respects_char_boundaries() {
        // 'é' is two bytes; a cut inside it must back off
        let text = "aééé".as_bytes();
        let truncated = truncate_output(text, 5);
        assert_eq!(truncated, "a...");
    }

    #[test]
    fn test_describe_command() {
        assert_eq!(describe_command("curl", &args(&["-s"])), r#""curl" ["-s"]"#);
        assert_eq!(
            describe_command("curl", &args(&["-s", "-X", "GET", "https://x"])),
            r#""curl" ... (4 args)"#
        );
    }
}
