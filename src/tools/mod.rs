/*!
Tool handlers.

Each handler validates its arguments, talks to the chain through
[`ChainClient`], and always answers with text: pretty JSON for queries, the
executable's raw output for transactions, or an `Error: ...` line when
validation fails. Handlers never fail at the protocol level.

`ToolKit::dispatch` runs a handler by its hyphenated name from loose JSON
arguments; the MCP server calls the typed handlers directly.
*/

pub mod params;
mod query;
mod tx;

use crate::chain::ChainClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const GET_ADDRESS_FOR_KEY: &str = "get-address-for-key";
pub const GET_BALANCE: &str = "get-balance";
pub const QUERY_OPEN_AUCTIONS: &str = "query-open-auctions";
pub const QUERY_ALL_AUCTIONS: &str = "query-all-auctions";
pub const QUERY_BIDS_FOR_AUCTION: &str = "query-bids-for-auction";
pub const GET_BLOCKCHAIN_STATUS: &str = "get-blockchain-status";
pub const GET_KEYS: &str = "get-keys";
pub const OPEN_AUCTION: &str = "open-auction";
pub const CREATE_BID: &str = "create-bid";
pub const PAY: &str = "pay";
pub const CLOSE_AUCTION: &str = "close-auction";

pub const TOOL_NAMES: [&str; 11] = [
    GET_ADDRESS_FOR_KEY,
    GET_BALANCE,
    QUERY_OPEN_AUCTIONS,
    QUERY_ALL_AUCTIONS,
    QUERY_BIDS_FOR_AUCTION,
    GET_BLOCKCHAIN_STATUS,
    GET_KEYS,
    OPEN_AUCTION,
    CREATE_BID,
    PAY,
    CLOSE_AUCTION,
];

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {source}")]
    InvalidParams {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/* ---- Response envelopes ---- */

/// Query response: `summary` first, then `details`.
#[derive(Debug, Serialize)]
pub struct Report<D> {
    pub summary: String,
    pub details: D,
}

/// Query response with keys in lexical order (`details` before `summary`).
#[derive(Debug, Serialize)]
pub struct SortedReport<D> {
    pub details: D,
    pub summary: String,
}

/// Two-space indented JSON.
pub(crate) fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| format!("Error: failed to encode response: {err}"))
}

/* ---- Toolkit ---- */

/// Shared, immutable handler state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ToolKit {
    client: Arc<ChainClient>,
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, DispatchError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|source| DispatchError::InvalidParams {
        tool: tool.to_string(),
        source,
    })
}

impl ToolKit {
    pub fn new(client: ChainClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }

    /// Run the handler registered under `name` (case-insensitive).
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<String, DispatchError> {
        let Some(tool) = TOOL_NAMES.iter().find(|t| t.eq_ignore_ascii_case(name)) else {
            return Err(DispatchError::UnknownTool(name.to_string()));
        };
        let text = match *tool {
            GET_ADDRESS_FOR_KEY => self.get_address_for_key(parse(tool, args)?).await,
            GET_BALANCE => self.get_balance(parse(tool, args)?).await,
            QUERY_OPEN_AUCTIONS => self.query_open_auctions(parse(tool, args)?).await,
            QUERY_ALL_AUCTIONS => self.query_all_auctions(parse(tool, args)?).await,
            QUERY_BIDS_FOR_AUCTION => self.query_bids_for_auction(parse(tool, args)?).await,
            GET_BLOCKCHAIN_STATUS => self.get_blockchain_status(parse(tool, args)?).await,
            GET_KEYS => self.get_keys(parse(tool, args)?).await,
            OPEN_AUCTION => self.open_auction(parse(tool, args)?).await,
            CREATE_BID => self.create_bid(parse(tool, args)?).await,
            PAY => self.pay(parse(tool, args)?).await,
            CLOSE_AUCTION => self.close_auction(parse(tool, args)?).await,
            other => return Err(DispatchError::UnknownTool(other.to_string())),
        };
        Ok(text)
    }
}
