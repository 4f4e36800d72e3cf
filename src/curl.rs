//! Command Proxy Tool
//!
//! Forwards a caller-supplied argument string to an external HTTP client
//! (`curl` by default) and turns whatever happens into text.
//!
//! Every path ends in a [`ToolOutcome`]: program output is returned as
//! [`ToolOutcome::Output`], anything the proxy had to synthesize (exit codes,
//! timeouts, spawn failures, sentinels) as [`ToolOutcome::Diagnostic`].

use crate::config::CurlConfig;
use crate::tools::{
    split, ExecutionError, ExecutionResult, ExecutionTimeout, ExecutorConfig, ProcessExecutor,
    TokenizeError, ToolOutcome,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Returned when the client exits 0 without writing anything
pub const NO_OUTPUT_SENTINEL: &str = "Command executed successfully with no output";

/// Failures that end an invocation early
#[derive(Debug, thiserror::Error)]
enum InvocationError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("timed out after {after}")]
    TimedOut { after: String },
}

/// Proxy for an external HTTP client
#[derive(Debug, Clone)]
pub struct CurlProxy {
    program: String,
    label: String,
    executor: ProcessExecutor,
    manual_executor: ProcessExecutor,
}

impl CurlProxy {
    /// Build a proxy from configuration
    pub fn new(config: &CurlConfig) -> Self {
        let base = ExecutorConfig::default()
            .max_output_size(config.max_output_bytes)
            .working_dir(config.working_dir.clone());

        Self::with_program(&config.program).with_executors(
            ExecutorConfig {
                timeout: ExecutionTimeout::from_secs(config.timeout_secs),
                ..base.clone()
            },
            ExecutorConfig {
                timeout: ExecutionTimeout::from_secs(config.manual_timeout_secs),
                ..base
            },
        )
    }

    /// Build a proxy for `program` with the default 30s/5s budgets
    pub fn with_program(program: impl Into<String>) -> Self {
        let program = program.into();
        let label = program_label(&program);
        Self {
            program,
            label,
            executor: ProcessExecutor::with_config(ExecutorConfig::with_timeout(
                ExecutionTimeout::proxy(),
            )),
            manual_executor: ProcessExecutor::with_config(ExecutorConfig::with_timeout(
                ExecutionTimeout::manual(),
            )),
        }
    }

    /// Replace the executor settings for invocations and manual lookups
    pub fn with_executors(mut self, invoke: ExecutorConfig, manual: ExecutorConfig) -> Self {
        self.executor = ProcessExecutor::with_config(invoke);
        self.manual_executor = ProcessExecutor::with_config(manual);
        self
    }

    /// Program being proxied
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the client with `args` (shell-style) and select what to return
    ///
    /// Precedence: stdout, then stderr, then a message naming a non-zero exit
    /// code, then [`NO_OUTPUT_SENTINEL`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use netops_mcp::curl::CurlProxy;
    ///
    /// # async fn run() {
    /// let proxy = CurlProxy::with_program("curl");
    /// let body = proxy.invoke("-s https://example.com").await;
    /// println!("{}", body);
    /// # }
    /// ```
    pub async fn invoke(&self, args: &str) -> ToolOutcome {
        match self.try_invoke(args).await {
            Ok(result) => select_output(&result, &self.label),
            Err(InvocationError::TimedOut { after }) => ToolOutcome::Diagnostic(format!(
                "Error: {} command timed out after {}",
                self.label, after
            )),
            Err(e) => {
                warn!("{} invocation failed: {}", self.label, e);
                ToolOutcome::Diagnostic(format!("Error executing {}: {}", self.label, e))
            }
        }
    }

    async fn try_invoke(&self, args: &str) -> Result<ExecutionResult, InvocationError> {
        let argv = split(args)?;
        debug!(tokens = argv.len(), "Tokenized {} arguments", self.label);
        self.run(&self.executor, &argv).await
    }

    /// Fetch the client's manual, falling back to its short help
    pub async fn manual(&self) -> ToolOutcome {
        match self.try_manual().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} manual lookup failed: {}", self.label, e);
                ToolOutcome::Diagnostic(format!("Error getting {} manual: {}", self.label, e))
            }
        }
    }

    async fn try_manual(&self) -> Result<ToolOutcome, InvocationError> {
        for flag in ["--manual", "--help"] {
            let result = self
                .run(&self.manual_executor, &[flag.to_string()])
                .await?;
            if !result.stdout.is_empty() {
                info!("Returning {} output ({} bytes)", flag, result.stdout.len());
                return Ok(ToolOutcome::Output(result.stdout));
            }
            debug!("{} {} produced no output", self.label, flag);
        }

        Ok(ToolOutcome::Diagnostic(format!(
            "{} help not available",
            capitalize(&self.label)
        )))
    }

    async fn run(
        &self,
        executor: &ProcessExecutor,
        argv: &[String],
    ) -> Result<ExecutionResult, InvocationError> {
        let result = executor.execute(&self.program, argv).await?;
        if result.timed_out {
            return Err(InvocationError::TimedOut {
                after: executor.config().timeout.describe(),
            });
        }
        Ok(result)
    }
}

/// Pick the text to return for a completed execution
///
/// The order matters and is relied on by callers: an empty-output success is
/// reported with the sentinel even though it is not an error.
pub fn select_output(result: &ExecutionResult, label: &str) -> ToolOutcome {
    if !result.stdout.is_empty() {
        return ToolOutcome::Output(result.stdout.clone());
    }
    if !result.stderr.is_empty() {
        return ToolOutcome::Output(result.stderr.clone());
    }
    match result.exit_code {
        Some(0) => ToolOutcome::Diagnostic(NO_OUTPUT_SENTINEL.to_string()),
        Some(code) => {
            ToolOutcome::Diagnostic(format!("{} command failed with exit code {}", label, code))
        }
        None => ToolOutcome::Diagnostic(format!(
            "{} command failed without an exit code",
            label
        )),
    }
}

/// Name used in messages: the program's file name (`/usr/bin/curl` -> `curl`)
fn program_label(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| program.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
