//! Test doubles shared by the command modules.

use serde_json::{Map, Value, json};
use std::cell::RefCell;

use crate::error::ClientError;
use crate::mcp::ToolInvoker;

/// Records every call; answers with a canned payload or a remote failure.
#[derive(Default)]
pub struct FakeInvoker {
    pub calls: RefCell<Vec<(String, Map<String, Value>)>>,
    pub fail_with: Option<String>,
}

impl FakeInvoker {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ToolInvoker for FakeInvoker {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        self.calls
            .borrow_mut()
            .push((name.to_string(), arguments.clone()));
        match &self.fail_with {
            Some(msg) => Err(ClientError::remote_call(
                name,
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, msg.clone()),
            )),
            None => Ok(json!({
                "content": [{"type": "text", "text": format!("design {}", arguments["fileKey"])}],
                "isError": false
            })),
        }
    }
}
