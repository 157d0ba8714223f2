//! Typed failures surfaced by the client.
//!
//! Startup failures (`MissingCredential`, `Connection`) are fatal and bubble up
//! to `main`. Per-request failures (`InvalidUrlFormat`, `RemoteCall`) are caught
//! at the loop boundary, printed, and the prompt comes back.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{var} is not set")]
    MissingCredential { var: &'static str },

    #[error("failed to connect to MCP server at {endpoint}: {message}")]
    Connection {
        endpoint: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid Figma URL format: {url}")]
    InvalidUrlFormat { url: String },

    #[error("tool '{tool}' failed: {message}")]
    RemoteCall {
        tool: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ClientError {
    pub fn connection<E>(endpoint: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Connection {
            endpoint: endpoint.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn remote_call<E>(tool: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::RemoteCall {
            tool: tool.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Stable name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::MissingCredential { .. } => "MissingCredential",
            ClientError::Connection { .. } => "ConnectionError",
            ClientError::InvalidUrlFormat { .. } => "InvalidUrlFormat",
            ClientError::RemoteCall { .. } => "RemoteCallError",
        }
    }

    /// Messages of every underlying cause, outermost first (excluding self).
    pub fn trace(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = std::error::Error::source(self);
        while let Some(e) = cur {
            out.push(e.to_string());
            cur = e.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn kinds_are_stable() {
        let e = ClientError::InvalidUrlFormat { url: "x".into() };
        assert_eq!(e.kind(), "InvalidUrlFormat");
        let e = ClientError::MissingCredential {
            var: "ANTHROPIC_API_KEY",
        };
        assert_eq!(e.kind(), "MissingCredential");
        assert_eq!(e.to_string(), "ANTHROPIC_API_KEY is not set");
    }

    #[test]
    fn trace_walks_source_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let e = ClientError::remote_call("get_figma_data", Outer(inner));
        assert_eq!(e.kind(), "RemoteCallError");
        assert_eq!(e.trace(), vec!["outer".to_string(), "pipe closed".to_string()]);
        assert!(e.to_string().contains("get_figma_data"));
    }
}
