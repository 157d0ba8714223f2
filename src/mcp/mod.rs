//! MCP session plumbing (SSE transport via rmcp).
//!
//! Endpoint::parse -> connect -> Session { list_operations, call_tool, close }
//! `ToolInvoker` is the seam the conversion loop talks to; `Session` is the
//! only production implementation.
//!
use anyhow::{Result, bail};
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    transport::SseClientTransport,
};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

use crate::error::ClientError;
use crate::{log_debug, log_error, log_trace};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3030/sse";
pub const DEFAULT_CLIENT_NAME: &str = "mcp-client-cli";
pub const DEFAULT_CLIENT_VERSION: &str = "1.0.0";

/// A validated SSE endpoint (http or https only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parse a user-supplied endpoint.
    ///
    /// - Surrounding whitespace is ignored.
    /// - Only `http` / `https` schemes are accepted (the transport is SSE over HTTP).
    ///
    /// Examples:
    /// - "http://localhost:3030/sse" -> ok
    /// - "ws://localhost:3030/sse"   -> error (unsupported scheme)
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("Endpoint string is empty");
        }
        let url = match Url::parse(trimmed) {
            Ok(u) => u,
            Err(e) => bail!("Endpoint '{trimmed}' is not a valid URL: {e}"),
        };
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => bail!("Unsupported endpoint scheme '{other}' (expected http or https)"),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Name/version announced during the initialize handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub name: String,
    pub version: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_CLIENT_NAME.to_string(),
            version: DEFAULT_CLIENT_VERSION.to_string(),
        }
    }
}

/// Metadata for one remotely exposed tool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub description: String,
}

/// Pull descriptors out of a serialized `tools/list` response.
/// Entries without a name are skipped; a missing description becomes "".
pub fn descriptors_from_json(value: &Value) -> Vec<OperationDescriptor> {
    value
        .get("tools")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|t| {
                    let name = t.get("name")?.as_str()?.to_string();
                    let description = t
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default()
                        .to_string();
                    Some(OperationDescriptor { name, description })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Capability set declared by this client: prompts, https-only resources, tools.
///
/// MCP client capabilities have no dedicated fields for these, so they travel
/// in the `experimental` map.
pub fn declared_capabilities() -> Value {
    serde_json::json!({
        "experimental": {
            "prompts": {},
            "resources": { "schemes": ["https"] },
            "tools": {}
        }
    })
}

fn client_info(identity: &ClientIdentity) -> Result<ClientInfo, serde_json::Error> {
    let capabilities: ClientCapabilities = serde_json::from_value(declared_capabilities())?;
    let mut client_info = Implementation::from_build_env();
    client_info.name = identity.name.clone();
    client_info.version = identity.version.clone();
    Ok(ClientInfo {
        protocol_version: Default::default(),
        capabilities,
        client_info,
    })
}

/// Anything that can invoke a named tool with a JSON argument object.
pub trait ToolInvoker {
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>)
    -> Result<Value, ClientError>;
}

/// The single open channel to the tool server.
pub struct Session {
    endpoint: Endpoint,
    service: RunningService<RoleClient, ClientInfo>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Open the SSE transport and run the initialize handshake.
pub async fn connect(endpoint: &Endpoint, identity: &ClientIdentity) -> Result<Session, ClientError> {
    log_debug!(
        "[mcp] connecting to {} as {}/{}",
        endpoint,
        identity.name,
        identity.version
    );
    let info = client_info(identity).map_err(|e| ClientError::connection(endpoint.as_str(), e))?;

    let transport = SseClientTransport::start(endpoint.as_str().to_string())
        .await
        .map_err(|e| ClientError::connection(endpoint.as_str(), e))?;

    let service = info
        .serve(transport)
        .await
        .map_err(|e| ClientError::connection(endpoint.as_str(), e))?;

    log_debug!("[mcp] handshake complete with {}", endpoint);
    if !endpoint.is_secure() {
        log_debug!("[mcp] endpoint uses plain http");
    }

    Ok(Session {
        endpoint: endpoint.clone(),
        service,
    })
}

impl Session {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Fetch the advertised tool catalog (one page, as served).
    pub async fn list_operations(&self) -> Result<Vec<OperationDescriptor>, ClientError> {
        let resp = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|e| ClientError::connection(self.endpoint.as_str(), e))?;
        let val = serde_json::to_value(&resp)
            .map_err(|e| ClientError::connection(self.endpoint.as_str(), e))?;
        log_trace!("[mcp] tools/list raw: {}", val);
        Ok(descriptors_from_json(&val))
    }

    /// Cancel the running service. Failures are logged, never raised.
    pub async fn close(self) {
        match self.service.cancel().await {
            Ok(reason) => log_debug!("[mcp] session closed: {:?}", reason),
            Err(e) => log_error!("[mcp] error while closing session: {}", e),
        }
    }
}

impl ToolInvoker for Session {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(|e| ClientError::remote_call(name, e))?;
        serde_json::to_value(&result).map_err(|e| ClientError::remote_call(name, e))
    }
}

#[cfg(test)]
pub mod stub;
