//! `swechain-mcp serve`: run the MCP server on stdin/stdout.

use anyhow::Result;
use tracing::info;

use crate::mcp;
use crate::tools::ToolKit;

pub async fn execute_serve(kit: ToolKit) -> Result<()> {
    let client = kit.client();
    let settings = client.settings();
    let policy = client.runner().policy();
    info!(
        command = %client.runner().executable(),
        chain_id = %settings.chain_id,
        node = settings.node.as_ref().map(|u| u.as_str()).unwrap_or("<default>"),
        max_attempts = policy.max_attempts,
        timeout = ?policy.attempt_timeout,
        "starting swechain MCP server"
    );
    mcp::serve_stdio(kit).await
}
