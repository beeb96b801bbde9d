//! Argument structs for every tool. Field names are the camelCase names
//! clients send; the JSON schemas advertised over MCP are derived from them.

use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyNameParams {
    #[schemars(description = "Name of the key in the keyring")]
    pub key_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct AddressParams {
    #[schemars(description = "Account address (cosmos1...)")]
    pub address: String,
}

/// Accepted for compatibility; the value is not interpreted.
#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct OperationParams {
    #[schemars(description = "Operation name ('list' or 'status')")]
    pub operation: String,
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuctionIdParams {
    #[schemars(description = "Auction id, or 'all' for every bid")]
    pub auction_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct OpenAuctionParams {
    #[schemars(description = "Issue the auction is about")]
    pub issue: String,
    #[schemars(description = "Free-form auction description")]
    pub description: String,
    #[schemars(description = "Initial status (default 'open')")]
    #[serde(default)]
    pub status: Option<String>,
    #[schemars(description = "Winner address, usually empty")]
    #[serde(default)]
    pub winner: Option<String>,
    #[schemars(description = "Signing address (cosmos1...)")]
    pub from: String,
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBidParams {
    #[schemars(description = "Numeric auction id")]
    pub auction_id: String,
    #[schemars(description = "Bidder address (cosmos1...)")]
    pub bidder: String,
    #[schemars(description = "Bid amount with denomination (default '100token')")]
    #[serde(default)]
    pub amount: Option<String>,
    #[schemars(description = "Bid description")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Signing address (cosmos1...)")]
    pub from: String,
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct PayParams {
    #[schemars(description = "Sender address (cosmos1...)")]
    pub from: String,
    #[schemars(description = "Recipient address (cosmos1...)")]
    pub to: String,
    #[schemars(description = "Amount with denomination, e.g. '50token'")]
    pub amount: String,
}

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseAuctionParams {
    #[schemars(description = "Numeric auction id")]
    pub auction_id: String,
    #[schemars(description = "New status, e.g. 'closed'")]
    pub status: String,
    #[schemars(description = "Issue text to store")]
    pub issue: String,
    #[schemars(description = "Description to store")]
    pub description: String,
    #[schemars(description = "Winner address")]
    pub winner: String,
    #[schemars(description = "Signing address (cosmos1...)")]
    pub from: String,
}
