//! Tool Outcome
//!
//! Result of a proxied tool call before it is flattened to text at the MCP
//! boundary.

use std::fmt;

/// What a tool call produced
///
/// `Output` carries text the external program wrote. `Diagnostic` carries a
/// message synthesized by the proxy (timeouts, spawn failures, exit codes,
/// sentinels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Output(String),
    Diagnostic(String),
}

impl ToolOutcome {
    /// Borrow the text regardless of variant
    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Output(text) | ToolOutcome::Diagnostic(text) => text,
        }
    }

    /// Flatten into the text returned to remote callers
    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Output(text) | ToolOutcome::Diagnostic(text) => text,
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, ToolOutcome::Diagnostic(_))
    }

    /// Label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ToolOutcome::Output(_) => "output",
            ToolOutcome::Diagnostic(_) => "diagnostic",
        }
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<ToolOutcome> for String {
    fn from(outcome: ToolOutcome) -> Self {
        outcome.into_text()
    }
}
