//! In-process SSE tool server for tests.
//!
//! Advertises `get_figma_data`, records the initialize request and every
//! argument object it receives, and rejects any other tool name.

use rmcp::{
    RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData, InitializeRequestParam,
        InitializeResult, ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
    transport::sse_server::SseServer,
};
use serde_json::{Map, Value};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use crate::mcp::Endpoint;

#[derive(Clone, Default)]
pub struct FigmaStub {
    pub init: Arc<Mutex<Option<Value>>>,
    pub seen: Arc<Mutex<Vec<Map<String, Value>>>>,
}

impl ServerHandler for FigmaStub {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, ErrorData> {
        *self.init.lock().unwrap() = serde_json::to_value(&request).ok();
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let schema = serde_json::json!({"type": "object"})
            .as_object()
            .cloned()
            .unwrap_or_default();
        Ok(ListToolsResult {
            tools: vec![Tool::new(
                "get_figma_data",
                "Fetch layout information for a Figma file",
                Arc::new(schema),
            )],
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        if request.name != "get_figma_data" {
            return Err(ErrorData::invalid_params("unknown tool", None));
        }
        let args = request.arguments.unwrap_or_default();
        let key = args
            .get("fileKey")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.seen.lock().unwrap().push(args);
        Ok(CallToolResult::success(vec![Content::text(format!(
            "design {key}"
        ))]))
    }
}

/// A loopback address nothing is listening on (bound once, then released).
pub fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn endpoint_for(addr: SocketAddr) -> Endpoint {
    Endpoint::parse(&format!("http://{addr}/sse")).unwrap()
}

/// Start the stub; call the returned closure to shut it down.
pub async fn start() -> (Endpoint, FigmaStub, impl FnOnce()) {
    let addr = free_addr();
    let stub = FigmaStub::default();
    let handle = stub.clone();
    let ct = SseServer::serve(addr)
        .await
        .unwrap()
        .with_service(move || handle.clone());
    (endpoint_for(addr), stub, move || ct.cancel())
}
