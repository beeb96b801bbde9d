/*!
`tools.rs`

Implements `swechain-mcp tools`: print the advertised tool catalog without
touching the chain.

JSON Output Shape:
{
  "status": "ok",
  "count": 11,
  "tools": [
    { "name": "get-keys", "description": "...", "params": ["operation:string"] }
  ]
}
*/

use anyhow::Result;
use clap::Args;
use rmcp::model::Tool;
use serde_json::json;

use crate::cmd::format::{Role, StyleOptions, banner, color, emoji, table, truncate_ellipsis};
use crate::cmd::shared::param_summary;
use crate::mcp;

#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute_tools(args: ToolsArgs) -> Result<()> {
    let tools = mcp::catalog();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog_json(&tools))?);
    } else {
        println!("{}", render_table(&tools, &StyleOptions::detect()));
    }
    Ok(())
}

fn catalog_json(tools: &[Tool]) -> serde_json::Value {
    let items: Vec<_> = tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description.as_deref().unwrap_or(""),
                "params": param_summary(&t.input_schema),
            })
        })
        .collect();
    json!({
        "status": "ok",
        "count": items.len(),
        "tools": items,
    })
}

fn render_table(tools: &[Tool], style: &StyleOptions) -> String {
    let title = format!("{} Tools ({})", emoji("list", style), tools.len());
    let header = banner(title.trim_start(), Some("stdio"), style);
    if tools.is_empty() {
        return format!("{header}\n{}", color(Role::Dim, "(none)", style));
    }

    let rows: Vec<Vec<String>> = tools
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            let params = param_summary(&t.input_schema);
            let desc = t.description.as_deref().unwrap_or("").replace('\n', " ");
            vec![
                (idx + 1).to_string(),
                t.name.to_string(),
                if params.is_empty() { "-".to_string() } else { params.join(", ") },
                truncate_ellipsis(&desc, 90),
            ]
        })
        .collect();

    format!(
        "{header}\n{}",
        table(&["#", "NAME", "PARAMS", "DESCRIPTION"], &rows, style)
    )
}
