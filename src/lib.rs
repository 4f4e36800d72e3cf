//! netops-mcp Library
//!
//! MCP tool servers for network operations: a proxy for the local `curl`
//! client and an F5 BIG-IP object lister, both served over streamable HTTP.

pub mod bigip;
pub mod config;
pub mod curl;
pub mod logging;
pub mod mcp;
pub mod metrics;
pub mod server;
pub mod tools;
