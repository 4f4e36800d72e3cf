//! Curl tools over MCP
//!
//! Every call yields a successful text result. Failures of the client
//! program are described in that text rather than reported as tool errors,
//! so callers always get something readable back.

use super::{server_implementation, tool_span};
use crate::curl::CurlProxy;
use crate::metrics;
use crate::tools::ToolOutcome;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ErrorData as McpError, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, Instrument};

pub const CURL_SERVER_NAME: &str = "Curl MCP Server";

/// Arguments of the `curl` tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CurlRequest {
    /// The arguments to pass to curl (e.g. '-X GET https://api.example.com')
    pub args: String,
}

/// MCP server exposing the curl proxy
#[derive(Clone)]
pub struct CurlServer {
    proxy: Arc<CurlProxy>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CurlServer {
    pub fn new(proxy: Arc<CurlProxy>) -> Self {
        Self {
            proxy,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Execute a curl command with specified arguments. The argument string is split with shell quoting rules (no shell is involved) and passed to curl. Returns curl's standard output, or its standard error when there is no output, or a short status line."
    )]
    async fn curl(
        &self,
        Parameters(request): Parameters<CurlRequest>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = observe("curl", self.proxy.invoke(&request.args)).await;
        Ok(CallToolResult::success(vec![Content::text(outcome.into_text())]))
    }

    #[tool(description = "Display the curl manual page (falls back to the --help text).")]
    async fn curl_manual(&self) -> Result<CallToolResult, McpError> {
        let outcome = observe("curl_manual", self.proxy.manual()).await;
        Ok(CallToolResult::success(vec![Content::text(outcome.into_text())]))
    }
}

#[tool_handler]
impl ServerHandler for CurlServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: server_implementation(CURL_SERVER_NAME),
            instructions: Some(
                "Run curl with the `curl` tool (pass the arguments as one string, quoted as in a shell). Use `curl_manual` to look up options.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Run one tool call inside its span and record its metrics
async fn observe<F>(tool: &'static str, call: F) -> ToolOutcome
where
    F: Future<Output = ToolOutcome>,
{
    let span = tool_span(tool);
    let started = Instant::now();
    let outcome = call.instrument(span.clone()).await;
    let elapsed = started.elapsed();

    span.in_scope(|| {
        debug!(
            kind = outcome.kind(),
            bytes = outcome.text().len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Tool call finished"
        );
    });
    metrics::record_tool_call(tool, outcome.kind(), elapsed);
    outcome
}
