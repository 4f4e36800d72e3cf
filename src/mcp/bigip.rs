//! BIG-IP object listing over MCP

use super::{server_implementation, tool_span};
use crate::bigip::ObjectLister;
use crate::metrics;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ErrorData as McpError, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Instrument};

pub const BIGIP_SERVER_NAME: &str = "F5 MCP Server";

/// Arguments of the `obj_list` tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ObjListRequest {
    /// LTM object type, e.g. 'pool', 'virtual', 'node' or 'monitor/http'
    pub obj_type: String,

    /// Optional object name, e.g. 'web_pool' or '/Common/web_pool'
    #[serde(default)]
    pub obj_name: Option<String>,
}

/// MCP server exposing BIG-IP object listing
#[derive(Clone)]
pub struct BigIpServer {
    lister: Arc<dyn ObjectLister>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BigIpServer {
    pub fn new(lister: Arc<dyn ObjectLister>) -> Self {
        Self {
            lister,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "List BIG-IP LTM objects. Without obj_name, returns the names of all objects of obj_type; with obj_name, returns that object's full properties."
    )]
    async fn obj_list(
        &self,
        Parameters(request): Parameters<ObjListRequest>,
    ) -> Result<CallToolResult, McpError> {
        let span = tool_span("obj_list");
        let started = Instant::now();

        let listed = self
            .lister
            .list_objects(&request.obj_type, request.obj_name.as_deref())
            .instrument(span.clone())
            .await;

        span.in_scope(|| match listed {
            Ok(listing) => {
                info!(obj_type = %request.obj_type, count = listing.len(), "Listed objects");
                metrics::record_tool_call("obj_list", "ok", started.elapsed());
                Ok(CallToolResult::structured(json!({ "result": listing.to_json() })))
            }
            Err(e) => {
                warn!(obj_type = %request.obj_type, "Object listing failed: {}", e);
                let status = if e.is_invalid_input() { "invalid" } else { "error" };
                metrics::record_tool_call("obj_list", status, started.elapsed());
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        })
    }
}

#[tool_handler]
impl ServerHandler for BigIpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: server_implementation(BIGIP_SERVER_NAME),
            instructions: Some(
                "Inspect F5 BIG-IP LTM configuration with `obj_list` (e.g. obj_type 'pool' or 'virtual').".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigip::{BigIpError, ObjectListing};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::Mutex;

    /// Canned lister that records the calls it receives
    #[derive(Default)]
    struct FakeLister {
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl ObjectLister for FakeLister {
        async fn list_objects(
            &self,
            obj_type: &str,
            obj_name: Option<&str>,
        ) -> Result<ObjectListing, BigIpError> {
            self.calls
                .lock()
                .unwrap()
                .push((obj_type.to_string(), obj_name.map(str::to_string)));

            match (obj_type, obj_name) {
                ("pool", None) => Ok(ObjectListing::Names(vec![
                    "web_pool".to_string(),
                    "api_pool".to_string(),
                ])),
                ("pool", Some("web_pool")) => {
                    let mut props = Map::new();
                    props.insert("name".to_string(), json!("web_pool"));
                    props.insert("loadBalancingMode".to_string(), json!("round-robin"));
                    Ok(ObjectListing::Objects(vec![props]))
                }
                ("../sys", _) => Err(BigIpError::InvalidObjectType(obj_type.to_string())),
                _ => Err(BigIpError::Status {
                    status: 404,
                    message: "Object not found".to_string(),
                }),
            }
        }
    }

    fn request(obj_type: &str, obj_name: Option<&str>) -> Parameters<ObjListRequest> {
        Parameters(ObjListRequest {
            obj_type: obj_type.to_string(),
            obj_name: obj_name.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_obj_list_names() {
        let lister = Arc::new(FakeLister::default());
        let server = BigIpServer::new(lister.clone());

        let result = server.obj_list(request("pool", None)).await.unwrap();

        assert_ne!(result.is_error, Some(true));
        assert_eq!(
            result.structured_content,
            Some(json!({"result": ["web_pool", "api_pool"]}))
        );
        assert_eq!(
            lister.calls.lock().unwrap().as_slice(),
            &[("pool".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_obj_list_single_object() {
        let server = BigIpServer::new(Arc::new(FakeLister::default()));

        let result = server
            .obj_list(request("pool", Some("web_pool")))
            .await
            .unwrap();

        let structured = result.structured_content.expect("structured content");
        assert_eq!(structured["result"][0]["loadBalancingMode"], "round-robin");
    }

    #[tokio::test]
    async fn test_obj_list_failure_is_tool_error() {
        let server = BigIpServer::new(Arc::new(FakeLister::default()));

        let result = server.obj_list(request("virtual", None)).await.unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert_eq!(text, "BIG-IP returned 404: Object not found");
    }

    #[tokio::test]
    async fn test_invalid_input_is_counted_separately() {
        let server = BigIpServer::new(Arc::new(FakeLister::default()));

        let result = server.obj_list(request("../sys", None)).await.unwrap();
        assert_eq!(result.is_error, Some(true));

        let calls = metrics::MCP_TOOL_CALLS_TOTAL
            .with_label_values(&["obj_list", "invalid"])
            .get();
        assert!(calls >= 1.0);
    }

    #[test]
    fn test_request_name_is_optional() {
        let request: ObjListRequest = serde_json::from_value(json!({"obj_type": "pool"})).unwrap();
        assert_eq!(request.obj_name, None);
    }

    #[test]
    fn test_server_info() {
        let server = BigIpServer::new(Arc::new(FakeLister::default()));
        assert_eq!(server.get_info().server_info.name, BIGIP_SERVER_NAME);

        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "obj_list");
    }
}
