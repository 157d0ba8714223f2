/*!
Command layer: everything between `main` and the MCP session.

  startup.rs  credential gate, .env, config file, Settings
  session.rs  connect + catalog + banner
  convert.rs  URL -> get_figma_data call
  repl.rs     interactive loop + batch mode
  report.rs   stdout rendering (human / JSON)
  format.rs   colour / box / table primitives
*/

pub mod convert;
pub mod format;
pub mod repl;
pub mod report;
pub mod session;
pub mod startup;

#[cfg(test)]
pub mod testing;

pub use repl::{LoopExit, run_batch, run_interactive};
pub use session::open_session;
pub use startup::{Overrides, Settings, load_dotenv, resolve_settings, validate_environment};
