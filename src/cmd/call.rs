/*!
`call.rs`

Implements `swechain-mcp call <TOOL>`: run one tool handler in-process, the
same code path the MCP server uses, and print its text answer.

Parameter injection:
  --param KEY=VALUE               (repeatable)
  --param-file params.(json|yaml) (merged; --param overrides file entries)

JSON Success Output:
{
  "status": "ok",
  "tool": "get-keys",
  "elapsed_ms": 42,
  "arguments": { ... },
  "result": { ...tool answer, when it is JSON... }
}
Tool answers that are not JSON (transaction output, `Error: ...` lines)
are reported under "text" instead of "result".

JSON Error Output:
{ "status": "error", "error": "message" }
*/

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

use crate::cmd::format::{Role, StyleOptions, banner, color, emoji, table};
use crate::cmd::shared::{
    build_arguments_from_schema, find_tool_case_insensitive, load_param_file_into_map,
    parse_param_pairs,
};
use crate::mcp;
use crate::tools::ToolKit;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke (case-insensitive)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of a single in-process tool call.
#[derive(Debug)]
pub struct CallOutcome {
    pub tool: String,
    pub arguments: Map<String, Value>,
    pub text: String,
    pub elapsed_ms: u128,
}

pub async fn execute_call(args: CallArgs, kit: &ToolKit) -> Result<()> {
    let provided = match collect_params(&args) {
        Ok(p) => p,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    match invoke(kit, args.tool.trim(), &provided).await {
        Ok(outcome) if args.json => {
            println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
            Ok(())
        }
        Ok(outcome) => {
            print_human(&outcome, &StyleOptions::detect());
            Ok(())
        }
        Err(e) => output_error(args.json, &e.to_string()),
    }
}

fn collect_params(args: &CallArgs) -> Result<HashMap<String, String>> {
    let mut provided = parse_param_pairs(&args.params)?;
    if let Some(path) = &args.param_file {
        load_param_file_into_map(path, &mut provided)?;
    }
    Ok(provided)
}

/// Resolve `tool` in the catalog, build its arguments, and run it.
pub async fn invoke(
    kit: &ToolKit,
    tool: &str,
    provided: &HashMap<String, String>,
) -> Result<CallOutcome> {
    if tool.is_empty() {
        return Err(anyhow!("tool name cannot be empty"));
    }
    let catalog = mcp::catalog();
    let found = find_tool_case_insensitive(&catalog, tool)
        .ok_or_else(|| anyhow!("tool '{tool}' not found"))?;
    let arguments = build_arguments_from_schema(&found.input_schema, provided)
        .context("Failed to build arguments")?;
    debug!(tool = %found.name, ?arguments, "calling tool");

    let started = Instant::now();
    let text = kit
        .dispatch(&found.name, Value::Object(arguments.clone()))
        .await?;
    Ok(CallOutcome {
        tool: found.name.to_string(),
        arguments,
        text,
        elapsed_ms: started.elapsed().as_millis(),
    })
}

fn outcome_json(outcome: &CallOutcome) -> Value {
    let mut base = json!({
        "status": "ok",
        "tool": outcome.tool,
        "elapsed_ms": outcome.elapsed_ms,
        "arguments": outcome.arguments,
    });
    if let Value::Object(map) = &mut base {
        match serde_json::from_str::<Value>(&outcome.text) {
            Ok(parsed) if parsed.is_object() || parsed.is_array() => {
                map.insert("result".to_string(), parsed);
            }
            _ => {
                map.insert("text".to_string(), Value::String(outcome.text.clone()));
            }
        }
    }
    base
}

fn print_human(outcome: &CallOutcome, style: &StyleOptions) {
    let title = format!("{} Call ({})", emoji("tool", style), outcome.tool);
    println!(
        "{}",
        banner(title.trim_start(), Some(&format!("{} ms", outcome.elapsed_ms)), style)
    );

    if !outcome.arguments.is_empty() {
        let mut rows: Vec<Vec<String>> = outcome
            .arguments
            .iter()
            .map(|(k, v)| {
                let shown = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![k.clone(), shown]
            })
            .collect();
        rows.sort_by(|a, b| a[0].cmp(&b[0]));
        println!("{}", color(Role::Accent, "Arguments:", style));
        println!("{}\n", table(&["NAME", "VALUE"], &rows, style));
    }
    println!("{}", outcome.text);
}

fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        let err = json!({"status": "error", "error": msg});
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} Call Error", emoji("error", &style));
        println!("{}", banner(title.trim_start(), None, &style));
        println!("{}", color(Role::Error, msg, &style));
    }
    anyhow::bail!(msg.to_string())
}
