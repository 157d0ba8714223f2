/*!
`convert.rs`

One request: Figma URL -> DesignReference -> `get_figma_data` call -> raw result.

The tool catalog fetched at connect time is informational only. A missing
`get_figma_data` entry produces a warning, and calls are still attempted so
the server gets to report its own error.
*/

use anyhow::Result;
use serde_json::{Map, Value};
use std::io::Write;

use crate::cmd::report::Reporter;
use crate::figma::{DesignReference, FieldSet};
use crate::mcp::{OperationDescriptor, ToolInvoker};
use crate::{log_debug, log_info, log_warn};

pub const TOOL_NAME: &str = "get_figma_data";

/// Outcome of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub reference: DesignReference,
    pub arguments: Map<String, Value>,
    pub result: Value,
}

/// Whether the advertised catalog contains the conversion tool.
pub fn catalog_has_tool(tools: &[OperationDescriptor]) -> bool {
    log_info!("{} tool(s) advertised", tools.len());
    let found = tools.iter().any(|t| t.name == TOOL_NAME);
    if !found {
        log_warn!(
            "server does not advertise '{}'; calls will be attempted anyway",
            TOOL_NAME
        );
    }
    found
}

/// Parse `url`, echo what was extracted, and invoke the tool once.
///
/// Errors are `ClientError::InvalidUrlFormat` (nothing was sent) or
/// `ClientError::RemoteCall`, plus I/O errors from the reporter.
pub async fn convert_design<I, W>(
    invoker: &I,
    url: &str,
    fields: FieldSet,
    reporter: &mut Reporter<W>,
) -> Result<Conversion>
where
    I: ToolInvoker,
    W: Write,
{
    reporter.converting(url)?;
    let reference = DesignReference::parse(url, fields)?;
    let arguments = reference.to_arguments();
    reporter.parsed(&reference, &arguments)?;

    log_debug!("[convert] calling {} with {}", TOOL_NAME, Value::Object(arguments.clone()));
    let result = match invoker.call_tool(TOOL_NAME, arguments.clone()).await {
        Ok(v) => v,
        Err(e) => {
            log_debug!(
                "[convert] {} failed: {} (kind={}, trace={:?})",
                TOOL_NAME,
                e,
                e.kind(),
                e.trace()
            );
            return Err(e.into());
        }
    };

    Ok(Conversion {
        reference,
        arguments,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::format::StyleOptions;
    use crate::cmd::testing::FakeInvoker;
    use crate::error::ClientError;
    use serde_json::json;

    fn reporter() -> Reporter<Vec<u8>> {
        Reporter::new(Vec::new(), StyleOptions::plain(), false)
    }

    #[tokio::test]
    async fn sends_fixed_tool_with_extracted_arguments() {
        let fake = FakeInvoker::default();
        let mut r = reporter();
        let conv = convert_design(
            &fake,
            "https://www.figma.com/design/KEY1/Home?node-id=1%3A2-4",
            FieldSet::default(),
            &mut r,
        )
        .await
        .unwrap();

        assert_eq!(conv.reference.file_key, "KEY1");
        let calls = fake.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "get_figma_data");
        assert_eq!(
            Value::Object(calls[0].1.clone()),
            json!({"fileKey":"KEY1","nodeId":"1%3A2-4","depth":4})
        );
        assert_eq!(conv.result["isError"], json!(false));

        let out = String::from_utf8(r.into_inner()).unwrap();
        assert!(out.contains("Converting Figma URL: https://www.figma.com/design/KEY1"));
        assert!(out.contains("File key: KEY1, Node ID: 1%3A2-4, Depth: 4"));
    }

    #[tokio::test]
    async fn invalid_url_sends_nothing() {
        let fake = FakeInvoker::default();
        let mut r = reporter();
        let err = convert_design(&fake, "https://example.com/x", FieldSet::default(), &mut r)
            .await
            .unwrap_err();
        let ce = err.downcast_ref::<ClientError>().unwrap();
        assert_eq!(ce.kind(), "InvalidUrlFormat");
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_failure_is_surfaced() {
        let fake = FakeInvoker::failing("server went away");
        let mut r = reporter();
        let err = convert_design(
            &fake,
            "figma.com/file/K/T",
            FieldSet::default(),
            &mut r,
        )
        .await
        .unwrap_err();
        let ce = err.downcast_ref::<ClientError>().unwrap();
        assert_eq!(ce.kind(), "RemoteCallError");
        assert_eq!(ce.trace(), vec!["server went away".to_string()]);
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn same_url_twice_calls_twice() {
        let fake = FakeInvoker::default();
        let mut r = reporter();
        let url = "https://www.figma.com/file/K/T?node-id=5";
        convert_design(&fake, url, FieldSet::default(), &mut r)
            .await
            .unwrap();
        convert_design(&fake, url, FieldSet::default(), &mut r)
            .await
            .unwrap();
        let calls = fake.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn catalog_lookup() {
        let tools = vec![OperationDescriptor {
            name: "get_figma_data".into(),
            description: String::new(),
        }];
        assert!(catalog_has_tool(&tools));
        assert!(!catalog_has_tool(&[]));
    }
}
