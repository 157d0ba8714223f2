/*!
`session.rs`

Connect, fetch the tool catalog, print the banner. Once the session exists,
any later failure in this sequence closes it before the error propagates.
*/

use anyhow::Result;
use std::io::Write;

use crate::cmd::convert::catalog_has_tool;
use crate::cmd::report::Reporter;
use crate::cmd::startup::Settings;
use crate::mcp::{self, Session};

pub async fn open_session<W: Write>(
    settings: &Settings,
    reporter: &mut Reporter<W>,
) -> Result<Session> {
    let session = mcp::connect(&settings.endpoint, &settings.identity).await?;

    let tools = match session.list_operations().await {
        Ok(t) => t,
        Err(e) => {
            session.close().await;
            return Err(e.into());
        }
    };
    catalog_has_tool(&tools);

    if let Err(e) = reporter.connected(session.endpoint(), &tools) {
        session.close().await;
        return Err(e.into());
    }
    Ok(session)
}
