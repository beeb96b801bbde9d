//! MCP stdio server exposing the tool handlers.
//!
//! Every tool answers with a single text content item. Validation and chain
//! failures are part of that text; only malformed arguments (wrong JSON
//! shape, missing required fields) surface as protocol errors.

use crate::tools::ToolKit;
use crate::tools::params::{
    AddressParams, AuctionIdParams, CloseAuctionParams, CreateBidParams, KeyNameParams,
    OpenAuctionParams, OperationParams, PayParams,
};
use anyhow::{Context, Result};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool},
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::future::Future;
use tracing::info;

const INSTRUCTIONS: &str = "Bridge to the swechain issue-market chain. Query auctions, bids, \
balances and keys, or submit auction, bid and payment transactions. Query tools answer with \
JSON containing 'summary' and 'details'.";

#[derive(Clone)]
pub struct SwechainServer {
    kit: ToolKit,
    tool_router: ToolRouter<Self>,
}

/// Run a handler until it answers or the client cancels the request.
///
/// rmcp only signals cancellation through the request's token; losing the
/// race drops `work`, and with it any child process it is waiting on.
async fn answer(
    ctx: RequestContext<RoleServer>,
    work: impl Future<Output = String>,
) -> Result<CallToolResult, McpError> {
    tokio::select! {
        _ = ctx.ct.cancelled() => {
            info!(request_id = ?ctx.id, "tool call cancelled");
            Err(McpError::internal_error("request cancelled", None))
        }
        body = work => Ok(CallToolResult::success(vec![Content::text(body)])),
    }
}

#[tool_router]
impl SwechainServer {
    pub fn new(kit: ToolKit) -> Self {
        Self {
            kit,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "get-address-for-key",
        description = "Get the cosmos address for a specific key name. Required parameter: keyName (string)."
    )]
    async fn get_address_for_key(
        &self,
        Parameters(params): Parameters<KeyNameParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.get_address_for_key(params)).await
    }

    #[tool(
        name = "get-balance",
        description = "Get token balance for a specific cosmos address. Required parameter: address (string)."
    )]
    async fn get_balance(
        &self,
        Parameters(params): Parameters<AddressParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.get_balance(params)).await
    }

    #[tool(
        name = "query-open-auctions",
        description = "Get all open auctions with detailed bid information and participants. Required parameter: operation (use 'list')."
    )]
    async fn query_open_auctions(
        &self,
        Parameters(params): Parameters<OperationParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.query_open_auctions(params)).await
    }

    #[tool(
        name = "query-all-auctions",
        description = "Get all auctions (open and closed) with detailed information. Required parameter: operation (use 'list')."
    )]
    async fn query_all_auctions(
        &self,
        Parameters(params): Parameters<OperationParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.query_all_auctions(params)).await
    }

    #[tool(
        name = "query-bids-for-auction",
        description = "Get bids for a specific auction or all bids. Required parameter: auctionId (string - use specific ID or 'all')."
    )]
    async fn query_bids_for_auction(
        &self,
        Parameters(params): Parameters<AuctionIdParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.query_bids_for_auction(params)).await
    }

    #[tool(
        name = "get-blockchain-status",
        description = "Get overall blockchain statistics. Required parameter: operation (use 'status')."
    )]
    async fn get_blockchain_status(
        &self,
        Parameters(params): Parameters<OperationParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.get_blockchain_status(params)).await
    }

    #[tool(
        name = "get-keys",
        description = "Get all keys in the keyring with addresses. Required parameter: operation (use 'list')."
    )]
    async fn get_keys(
        &self,
        Parameters(params): Parameters<OperationParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.get_keys(params)).await
    }

    #[tool(
        name = "open-auction",
        description = "Create a new auction. Required: issue, description, from. Optional: status, winner."
    )]
    async fn open_auction(
        &self,
        Parameters(params): Parameters<OpenAuctionParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.open_auction(params)).await
    }

    #[tool(
        name = "create-bid",
        description = "Place a bid on an auction. Required: auctionId, bidder, from. Optional: amount, description."
    )]
    async fn create_bid(
        &self,
        Parameters(params): Parameters<CreateBidParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.create_bid(params)).await
    }

    #[tool(
        name = "pay",
        description = "Send tokens between addresses. Required: from, to, amount (all must be valid)."
    )]
    async fn pay(
        &self,
        Parameters(params): Parameters<PayParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.pay(params)).await
    }

    #[tool(
        name = "close-auction",
        description = "Close/update an auction. Required: auctionId, status, issue, description, winner, from."
    )]
    async fn close_auction(
        &self,
        Parameters(params): Parameters<CloseAuctionParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        answer(ctx, self.kit.close_auction(params)).await
    }
}

#[tool_handler]
impl ServerHandler for SwechainServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

/// Advertised tools with their input schemas, in registration order.
pub fn catalog() -> Vec<Tool> {
    let mut tools = SwechainServer::tool_router().list_all();
    tools.sort_by_key(|t| position(&t.name));
    tools
}

fn position(name: &str) -> usize {
    crate::tools::TOOL_NAMES
        .iter()
        .position(|n| *n == name)
        .unwrap_or(usize::MAX)
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(kit: ToolKit) -> Result<()> {
    let service = SwechainServer::new(kit)
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP stdio server")?;
    info!("MCP server running on stdio");

    let reason = service
        .waiting()
        .await
        .context("MCP server task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}
