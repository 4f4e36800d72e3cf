//! Tool Execution Subsystem
//!
//! Safe subprocess execution for the proxy tools.
//!
//! # Security Features
//!
//! - **List Invocation**: arguments are tokenized with shell quoting rules and
//!   passed as a vector, never through a shell
//! - **Timeout Enforcement**: every execution has a wall-clock budget
//! - **Process Groups**: timed out children are killed together with anything
//!   they spawned
//! - **Output Limits**: captured output is capped per stream
//!
//! # Architecture
//!
//! - `tokenize.rs`: shell-style argument splitting
//! - `executor.rs`: subprocess execution with timeout handling
//! - `timeout.rs`: timeout budgets
//! - `outcome.rs`: output vs. diagnostic result type
//!
//! # Example
//!
//! ```no_run
//! use netops_mcp::tools::{split, ProcessExecutor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let executor = ProcessExecutor::new();
//!     let args = split("-s -o /dev/null -w '%{http_code}' https://example.com")?;
//!
//!     let output = executor.execute("curl", &args).await?;
//!     println!("Exit code: {:?}", output.exit_code);
//!     println!("Stdout: {}", output.stdout);
//!
//!     Ok(())
//! }
//! ```

mod executor;
mod outcome;
mod timeout;
mod tokenize;

pub use executor::{
    ExecutionError, ExecutionResult, ExecutorConfig, ProcessExecutor, DEFAULT_MAX_OUTPUT_BYTES,
};
pub use outcome::ToolOutcome;
pub use timeout::{ExecutionTimeout, TimedOut, MANUAL_TIMEOUT_SECS, PROXY_TIMEOUT_SECS};
pub use tokenize::{split, TokenizeError};
