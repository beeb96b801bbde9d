use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod chain;
mod cmd;
mod config;
mod mcp;
mod tools;
mod utils;

use cmd::{CallArgs, ToolsArgs};
use config::{Overrides, Settings};
use tools::ToolKit;

/// swechain MCP server: exposes the `swechaind` issue-market chain as MCP tools.
///
/// Command layout:
///   swechain-mcp [serve]                        MCP server on stdio (default)
///   swechain-mcp tools [--json]                 print the tool catalog
///   swechain-mcp call <TOOL> [--param k=v ...]  run one tool and print its answer
///
/// Global flags / env:
///   -v / -vv             Increase verbosity (RUST_LOG overrides)
///   -q / --quiet         Errors only
///   --config PATH        YAML settings file (SWECHAIN_MCP_CONFIG)
///   --binary CMD         Chain executable or command line (SWECHAIN_BIN)
///   --chain-id ID        Chain id for transactions
///   --node URL           RPC endpoint passed as --node to queries and transactions
///
/// Examples:
///   swechain-mcp --node tcp://localhost:26657
///   swechain-mcp call get-address-for-key --param keyName=alice --json
///   swechain-mcp --binary "docker exec node swechaind" call query-open-auctions --param operation=list
#[derive(Parser, Debug)]
#[command(
    name = "swechain-mcp",
    version,
    about = "MCP server bridging the swechain issue-market chain",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// YAML settings file
    #[arg(long, global = true, env = "SWECHAIN_MCP_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Chain executable, optionally with leading arguments
    #[arg(long, global = true, env = "SWECHAIN_BIN", value_name = "CMD")]
    binary: Option<String>,

    /// Chain id used when signing transactions
    #[arg(long = "chain-id", global = true, value_name = "ID")]
    chain_id: Option<String>,

    /// RPC endpoint for queries and transactions
    #[arg(long, global = true, value_name = "URL")]
    node: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP over stdio (default)
    Serve,

    /// List the tools this server exposes
    Tools(ToolsArgs),

    /// Run a single tool and print its answer
    Call(CallArgs),
}

impl Cli {
    fn toolkit(&self) -> Result<ToolKit> {
        let settings = Settings::load(self.config.as_deref())
            .context("Failed to load settings")?
            .apply(Overrides {
                binary: self.binary.clone(),
                chain_id: self.chain_id.clone(),
                node: self.node.clone(),
            });
        let client = settings
            .build_client()
            .context("Failed to prepare chain client")?;
        Ok(ToolKit::new(client))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    match cli.command.take() {
        None | Some(Commands::Serve) => cmd::execute_serve(cli.toolkit()?).await,
        Some(Commands::Tools(args)) => cmd::execute_tools(args),
        Some(Commands::Call(args)) => {
            let kit = cli.toolkit()?;
            cmd::execute_call(args, &kit).await
        }
    }
}
