/*!
`report.rs`

Everything the client writes to stdout: connection banner, tool catalog,
prompt, per-request echoes, results and failure diagnostics.

Two modes:
  human  - banners, tables, pretty JSON (styled via `format`)
  json   - one compact JSON document per event; echoes are suppressed

JSON shapes:
  {"status":"connected","endpoint":"...","tools":[{"name":"...","description":"..."}]}
  {"status":"ok","url":"...","arguments":{...},"result":{...}}
  {"status":"error","kind":"InvalidUrlFormat","error":"...","trace":[...]}
*/

use serde_json::{Map, Value, json};
use std::io::{self, Write};

use crate::cmd::convert::Conversion;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::error::ClientError;
use crate::figma::DesignReference;
use crate::mcp::{Endpoint, OperationDescriptor};

pub struct Reporter<W: Write> {
    out: W,
    style: StyleOptions,
    json: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, style: StyleOptions, json: bool) -> Self {
        Self { out, style, json }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn connected(
        &mut self,
        endpoint: &Endpoint,
        tools: &[OperationDescriptor],
    ) -> io::Result<()> {
        if self.json {
            let doc = json!({
                "status": "connected",
                "endpoint": endpoint.as_str(),
                "tools": tools,
            });
            return writeln!(self.out, "{doc}");
        }
        let title = format!(
            "{}Connected to MCP server successfully!",
            emoji("plug", &self.style)
        );
        writeln!(
            self.out,
            "{}",
            box_header(&title, Some(endpoint.as_str()), &self.style)
        )?;
        writeln!(
            self.out,
            "{}",
            color(
                Role::Accent,
                format!("{}Available tools ({}):", emoji("tool", &self.style), tools.len()),
                &self.style
            )
        )?;
        if tools.is_empty() {
            return writeln!(self.out, "{}", color(Role::Dim, "  (none)", &self.style));
        }
        let rows: Vec<Vec<String>> = tools
            .iter()
            .map(|t| vec![t.name.clone(), t.description.replace('\n', " ")])
            .collect();
        writeln!(
            self.out,
            "{}",
            table(&["NAME", "DESCRIPTION"], &rows, &self.style)
        )
    }

    /// Interactive prompt; skipped in JSON mode so stdout stays parseable.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        write!(self.out, "\n{text}")?;
        self.out.flush()
    }

    pub fn converting(&mut self, url: &str) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(
            self.out,
            "{}Converting Figma URL: {url}",
            emoji("design", &self.style)
        )
    }

    pub fn parsed(
        &mut self,
        reference: &DesignReference,
        arguments: &Map<String, Value>,
    ) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(self.out, "{reference}")?;
        writeln!(
            self.out,
            "{} {}",
            color(Role::Secondary, "Arguments:", &self.style),
            Value::Object(arguments.clone())
        )
    }

    pub fn result(&mut self, url: &str, conv: &Conversion) -> io::Result<()> {
        let result = &conv.result;
        if self.json {
            let doc = json!({
                "status": "ok",
                "url": url,
                "fileKey": conv.reference.file_key,
                "arguments": conv.arguments,
                "result": result,
            });
            return writeln!(self.out, "{doc}");
        }
        writeln!(
            self.out,
            "\n{}",
            color(
                Role::Success,
                format!("{}Conversion result:", emoji("success", &self.style)),
                &self.style
            )
        )?;
        let pretty = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
        writeln!(self.out, "{pretty}")
    }

    /// Diagnostic block for a failed iteration.
    ///
    /// `ClientError`s get message, kind and cause chain; anything else gets a
    /// single generic line.
    pub fn failure(&mut self, err: &anyhow::Error) -> io::Result<()> {
        match err.downcast_ref::<ClientError>() {
            Some(e) => self.client_failure(e),
            None => self.generic_failure(err),
        }
    }

    fn client_failure(&mut self, err: &ClientError) -> io::Result<()> {
        let trace = err.trace();
        if self.json {
            let doc = json!({
                "status": "error",
                "kind": err.kind(),
                "error": err.to_string(),
                "trace": trace,
            });
            return writeln!(self.out, "{doc}");
        }
        writeln!(
            self.out,
            "{}",
            color(
                Role::Error,
                format!(
                    "{}Error converting Figma design: {err}",
                    emoji("error", &self.style)
                ),
                &self.style
            )
        )?;
        writeln!(self.out, "  kind:  {}", err.kind())?;
        if !trace.is_empty() {
            writeln!(self.out, "  trace:")?;
            for (i, line) in trace.iter().enumerate() {
                writeln!(self.out, "    {i}: {line}")?;
            }
        }
        Ok(())
    }

    fn generic_failure(&mut self, err: &anyhow::Error) -> io::Result<()> {
        if self.json {
            let doc = json!({
                "status": "error",
                "kind": "Unknown",
                "error": format!("{err:#}"),
                "trace": [],
            });
            return writeln!(self.out, "{doc}");
        }
        writeln!(
            self.out,
            "{}",
            color(
                Role::Warning,
                format!(
                    "{}Error converting Figma design (unexpected): {err:#}",
                    emoji("warn", &self.style)
                ),
                &self.style
            )
        )
    }
}
