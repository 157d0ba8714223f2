use anyhow::{Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

mod cmd;
mod error;
mod figma;
mod mcp;
mod utils;

use cmd::format::StyleOptions;
use cmd::report::Reporter;
use cmd::{Overrides, Settings};

/// figma-mcp-client - fetch Figma design data through an MCP tool server
///
/// Connects to an MCP server over SSE (default http://localhost:3030/sse),
/// then reads Figma URLs from stdin and calls `get_figma_data` for each one
/// until `exit` or end of input. URLs given as arguments are converted once
/// each without prompting.
///
/// Extracted per URL:
///   fileKey  figma.com/(file|design)/<KEY>     (required)
///   nodeId   node-id=<ID> query parameter       (optional, --no-node-id)
///   depth    trailing -<1..10> token            (optional, --no-depth)
///
/// Env:
///   ANTHROPIC_API_KEY    required (also read from .env)
///   FIGMA_MCP_ENDPOINT   endpoint fallback if -e not provided
///   NO_COLOR / NO_EMOJI  plain output
///
/// Examples:
///   figma-mcp-client
///   figma-mcp-client -e http://localhost:3030/sse -v
///   figma-mcp-client --json "https://www.figma.com/design/AbC123/Page?node-id=1-2"
#[derive(Parser, Debug)]
#[command(
    name = "figma-mcp-client",
    version,
    author,
    about = "Interactive MCP client for get_figma_data",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,

    /// MCP SSE endpoint (or FIGMA_MCP_ENDPOINT env)
    #[arg(short = 'e', long = "endpoint", value_name = "URL")]
    endpoint: Option<String>,

    /// Config file (JSON or YAML)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not extract node-id from URLs
    #[arg(long)]
    no_node_id: bool,

    /// Do not extract the trailing -<n> depth from URLs
    #[arg(long)]
    no_depth: bool,

    /// Output one JSON document per event
    #[arg(long)]
    json: bool,

    /// Convert these URLs and exit instead of prompting
    #[arg(value_name = "URL")]
    urls: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet));

    // Credential gate runs before anything else is built (.env counts)
    cmd::load_dotenv();
    let _credential = cmd::validate_environment()?;

    // Resolve endpoint / identity / fields (CLI > env > config file > default)
    let overrides = Overrides {
        endpoint: cli.endpoint.clone(),
        config: cli.config.clone(),
        no_node_id: cli.no_node_id,
        no_depth: cli.no_depth,
    };
    let settings = match cmd::resolve_settings(&overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(settings, cli))
}

async fn run(settings: Settings, cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let style = StyleOptions::for_stdout(stdout.is_terminal());
    let mut reporter = Reporter::new(stdout.lock(), style, cli.json);

    // Connect + catalog; failures here exit 1
    let session = cmd::open_session(&settings, &mut reporter).await?;

    let outcome = if cli.urls.is_empty() {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        cmd::run_interactive(&session, stdin, settings.fields, &mut reporter).await
    } else {
        cmd::run_batch(&session, &cli.urls, settings.fields, &mut reporter).await
    };

    // Close on every loop outcome, including I/O errors
    session.close().await;

    let stats = outcome?;
    if stats.exit == cmd::LoopExit::EndOfInput {
        crate::log_debug!("stdin closed");
    }
    if !cli.urls.is_empty() && stats.failed > 0 {
        bail!("{} of {} conversion(s) failed", stats.failed, stats.processed);
    }
    Ok(())
}
