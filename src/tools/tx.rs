//! Transaction tools. Successful submissions echo the executable's output.

use super::params::{CloseAuctionParams, CreateBidParams, OpenAuctionParams, PayParams};
use super::ToolKit;
use crate::chain::address::is_valid_address;
use tracing::info;

pub const DEFAULT_AUCTION_STATUS: &str = "open";
pub const DEFAULT_BID_AMOUNT: &str = "100token";

fn optional(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

fn is_number(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}

impl ToolKit {
    pub async fn open_auction(&self, params: OpenAuctionParams) -> String {
        let issue = params.issue.trim();
        let description = params.description.trim();
        let from = params.from.trim();
        info!(tool = super::OPEN_AUCTION, issue, from, "creating auction");

        if issue.is_empty() {
            return "Error: 'issue' parameter is required and cannot be empty.".to_string();
        }
        if description.is_empty() {
            return "Error: 'description' parameter is required and cannot be empty.".to_string();
        }
        if from.is_empty() {
            return "Error: 'from' parameter is required and cannot be empty.".to_string();
        }
        if !is_valid_address(from) {
            return "Error: 'from' must be a valid cosmos address (cosmos1...).".to_string();
        }

        let status = match optional(&params.status) {
            "" => DEFAULT_AUCTION_STATUS,
            s => s,
        };
        let winner = optional(&params.winner);

        self.client()
            .submit_tx(
                "issuemarket",
                "create-auction",
                &[issue, description, status, winner],
                from,
            )
            .await
            .unwrap_or_else(|err| format!("Failed to create auction: {err}"))
    }

    pub async fn create_bid(&self, params: CreateBidParams) -> String {
        let auction_id = params.auction_id.trim();
        let bidder = params.bidder.trim();
        let from = params.from.trim();
        info!(tool = super::CREATE_BID, auction_id, bidder, "placing bid");

        if auction_id.is_empty() {
            return "Error: 'auctionId' parameter is required.".to_string();
        }
        if bidder.is_empty() {
            return "Error: 'bidder' parameter is required.".to_string();
        }
        if from.is_empty() {
            return "Error: 'from' parameter is required.".to_string();
        }
        if !is_valid_address(bidder) {
            return "Error: 'bidder' must be a valid cosmos address (cosmos1...).".to_string();
        }
        if !is_valid_address(from) {
            return "Error: 'from' must be a valid cosmos address (cosmos1...).".to_string();
        }
        if !is_number(auction_id) {
            return "Error: 'auctionId' must be a valid number.".to_string();
        }

        let amount = match optional(&params.amount) {
            "" => DEFAULT_BID_AMOUNT,
            a => a,
        };
        let description = match optional(&params.description) {
            "" => format!("Bid for auction {auction_id}"),
            d => d.to_string(),
        };

        self.client()
            .submit_tx(
                "issuemarket",
                "create-bid",
                &[auction_id, bidder, amount, description.as_str()],
                from,
            )
            .await
            .unwrap_or_else(|err| format!("Failed to create bid: {err}"))
    }

    pub async fn pay(&self, params: PayParams) -> String {
        let from = params.from.trim();
        let to = params.to.trim();
        let amount = params.amount.trim();
        info!(tool = super::PAY, from, to, amount, "sending tokens");

        if from.is_empty() || to.is_empty() || amount.is_empty() {
            return "Error: 'from', 'to', and 'amount' parameters are all required.".to_string();
        }
        if !is_valid_address(from) {
            return "Error: 'from' must be a valid cosmos address.".to_string();
        }
        if !is_valid_address(to) {
            return "Error: 'to' must be a valid cosmos address.".to_string();
        }

        self.client()
            .submit_tx("bank", "send", &[from, to, amount], from)
            .await
            .unwrap_or_else(|err| format!("Payment failed: {err}"))
    }

    pub async fn close_auction(&self, params: CloseAuctionParams) -> String {
        let auction_id = params.auction_id.trim();
        let status = params.status.trim();
        let from = params.from.trim();
        info!(tool = super::CLOSE_AUCTION, auction_id, status, "updating auction");

        if auction_id.is_empty() || status.is_empty() || from.is_empty() {
            return "Error: 'auctionId', 'status', and 'from' parameters are required.".to_string();
        }
        if !is_valid_address(from) {
            return "Error: 'from' must be a valid cosmos address.".to_string();
        }
        if !is_number(auction_id) {
            return "Error: 'auctionId' must be a valid number.".to_string();
        }

        self.client()
            .submit_tx(
                "issuemarket",
                "update-auction",
                &[
                    auction_id,
                    params.issue.trim(),
                    params.description.trim(),
                    status,
                    params.winner.trim(),
                ],
                from,
            )
            .await
            .unwrap_or_else(|err| format!("Failed to close auction: {err}"))
    }
}
