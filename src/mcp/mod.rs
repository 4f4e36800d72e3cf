//! MCP Tool Servers
//!
//! Two independent MCP servers built on `rmcp`:
//!
//! - [`CurlServer`]: `curl` and `curl_manual`, proxying the local HTTP client
//! - [`BigIpServer`]: `obj_list`, reading LTM objects from an F5 BIG-IP
//!
//! Both are served over streamable HTTP by [`crate::server`].

pub mod bigip;
pub mod curl;

pub use bigip::{BigIpServer, ObjListRequest, BIGIP_SERVER_NAME};
pub use curl::{CurlRequest, CurlServer, CURL_SERVER_NAME};

use rmcp::model::Implementation;
use tracing::{info_span, Span};
use uuid::Uuid;

/// Identity advertised during MCP initialization
pub(crate) fn server_implementation(name: &str) -> Implementation {
    Implementation {
        name: name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ..Implementation::from_build_env()
    }
}

/// Span for one tool call, keyed by a fresh invocation id
pub(crate) fn tool_span(tool: &'static str) -> Span {
    let invocation_id = Uuid::new_v4();
    info_span!("tool_call", tool, %invocation_id)
}
