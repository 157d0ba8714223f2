/*!
`repl.rs`

The read-parse-call-print loop.

  Reading     --"exit" (any case)-->  Terminating
  Reading     --EOF-------------->    Terminating
  Reading     --other line------->    Dispatching --ok/err--> Reading

A failed conversion prints a diagnostic and the prompt comes back. Only I/O
errors on the input or output streams leave the loop early; the input reader
is dropped on every path out of `run_interactive`.

`run_batch` drives the same dispatch step over URLs given on the command line.
*/

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::cmd::convert::convert_design;
use crate::cmd::report::Reporter;
use crate::figma::FieldSet;
use crate::mcp::ToolInvoker;
use crate::{log_debug, log_info};

pub const PROMPT: &str = "Enter a Figma URL (or 'exit' to quit): ";
pub const EXIT_COMMAND: &str = "exit";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    ExitCommand,
    EndOfInput,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub processed: usize,
    pub failed: usize,
    pub exit: LoopExit,
}

pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// One Dispatching step. Returns `Ok(false)` for a conversion failure that was
/// already reported; `Err` only when the reporter itself cannot write.
async fn dispatch<I, W>(
    invoker: &I,
    url: &str,
    fields: FieldSet,
    reporter: &mut Reporter<W>,
) -> Result<bool>
where
    I: ToolInvoker,
    W: Write,
{
    match convert_design(invoker, url, fields, reporter).await {
        Ok(conv) => {
            reporter.result(url, &conv)?;
            Ok(true)
        }
        Err(e) => {
            reporter.failure(&e)?;
            Ok(false)
        }
    }
}

pub async fn run_interactive<I, R, W>(
    invoker: &I,
    input: R,
    fields: FieldSet,
    reporter: &mut Reporter<W>,
) -> Result<LoopStats>
where
    I: ToolInvoker,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut processed = 0;
    let mut failed = 0;

    let exit = loop {
        reporter.prompt(PROMPT)?;
        let Some(line) = lines.next_line().await? else {
            log_debug!("[repl] end of input");
            break LoopExit::EndOfInput;
        };
        if is_exit_command(&line) {
            break LoopExit::ExitCommand;
        }
        processed += 1;
        if !dispatch(invoker, line.trim(), fields, reporter).await? {
            failed += 1;
        }
    };

    log_info!("[repl] done: {} processed, {} failed", processed, failed);
    Ok(LoopStats {
        processed,
        failed,
        exit,
    })
}

pub async fn run_batch<I, W>(
    invoker: &I,
    urls: &[String],
    fields: FieldSet,
    reporter: &mut Reporter<W>,
) -> Result<LoopStats>
where
    I: ToolInvoker,
    W: Write,
{
    let mut failed = 0;
    for url in urls {
        if !dispatch(invoker, url.trim(), fields, reporter).await? {
            failed += 1;
        }
    }
    Ok(LoopStats {
        processed: urls.len(),
        failed,
        exit: LoopExit::Exhausted,
    })
}
