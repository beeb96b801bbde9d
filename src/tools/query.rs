use super::params::{AddressParams, AuctionIdParams, KeyNameParams, OperationParams};
use super::{Report, SortedReport, ToolKit, pretty};
use crate::chain::address::is_valid_address;
use crate::chain::aggregate::{SummaryMode, summarize};
use crate::chain::records::{Balance, Bid, Key};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyAddressDetails {
    address: String,
    key_name: String,
}

#[derive(Debug, Serialize)]
struct BalanceDetails {
    address: String,
    balances: Vec<Balance>,
}

#[derive(Debug, Serialize)]
struct BidDetails {
    bids: Vec<Bid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusDetails {
    total_auctions: usize,
    open_auctions: usize,
    total_bids: usize,
    total_keys: usize,
    token_holders: usize,
}

#[derive(Debug, Serialize)]
struct KeyDetails {
    keys: Vec<Key>,
}

impl ToolKit {
    pub async fn get_address_for_key(&self, params: KeyNameParams) -> String {
        let key_name = params.key_name.trim();
        info!(tool = super::GET_ADDRESS_FOR_KEY, key_name, "looking up key address");
        if key_name.is_empty() {
            return "Error: keyName parameter is required and cannot be empty.".to_string();
        }

        match self.client().key_address(key_name).await {
            Ok(address) => pretty(&SortedReport {
                summary: format!("Address for key '{key_name}': {address}"),
                details: KeyAddressDetails {
                    address,
                    key_name: key_name.to_string(),
                },
            }),
            Err(err) => format!("Error getting address for key {key_name}: {err}"),
        }
    }

    pub async fn get_balance(&self, params: AddressParams) -> String {
        let address = params.address.trim();
        info!(tool = super::GET_BALANCE, address, "querying balance");
        if address.is_empty() {
            return "Error: address parameter is required and cannot be empty.".to_string();
        }
        if !is_valid_address(address) {
            return "Error: address must be a valid cosmos address (cosmos1...).".to_string();
        }

        let balances = match self.client().balances(address).await {
            Ok(balances) => balances,
            Err(err) => return format!("Error getting balance for address {address}: {err}"),
        };
        let (amount, denom) = balances
            .first()
            .map(|b| (b.amount.as_str(), b.denom.as_str()))
            .unwrap_or(("0", "token"));

        pretty(&Report {
            summary: format!("Address {address} has {amount} {denom}"),
            details: BalanceDetails {
                address: address.to_string(),
                balances,
            },
        })
    }

    pub async fn query_open_auctions(&self, _params: OperationParams) -> String {
        info!(tool = super::QUERY_OPEN_AUCTIONS, "querying open auctions");
        let snapshot = self.client().snapshot().await;
        let open = snapshot.open_auctions();
        pretty(&summarize(&open, &snapshot.bids, &snapshot.holders, SummaryMode::Open))
    }

    pub async fn query_all_auctions(&self, _params: OperationParams) -> String {
        info!(tool = super::QUERY_ALL_AUCTIONS, "querying all auctions");
        let snapshot = self.client().snapshot().await;
        pretty(&summarize(
            &snapshot.auctions,
            &snapshot.bids,
            &snapshot.holders,
            SummaryMode::All,
        ))
    }

    pub async fn query_bids_for_auction(&self, params: AuctionIdParams) -> String {
        let auction_id = params.auction_id.trim();
        info!(tool = super::QUERY_BIDS_FOR_AUCTION, auction_id, "querying bids");
        if auction_id.is_empty() {
            return "Error: auctionId parameter is required. Use specific auction ID or 'all' for all bids."
                .to_string();
        }

        let wanted = if auction_id.eq_ignore_ascii_case("all") {
            None
        } else {
            match auction_id.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    return format!(
                        "Error: invalid auctionId '{auction_id}'. Must be a number or 'all'."
                    );
                }
            }
        };

        let mut bids = self.client().bids().await;
        let summary = match wanted {
            None => format!("Found {} total bids across all auctions", bids.len()),
            Some(id) => {
                // Negative ids are valid input but never match.
                let id = u64::try_from(id).ok();
                bids.retain(|b| Some(b.auction_id) == id);
                format!("Found {} bids for auction {auction_id}", bids.len())
            }
        };

        pretty(&SortedReport {
            summary,
            details: BidDetails { bids },
        })
    }

    pub async fn get_blockchain_status(&self, _params: OperationParams) -> String {
        info!(tool = super::GET_BLOCKCHAIN_STATUS, "collecting chain status");
        let snapshot = self.client().snapshot().await;
        let keys = self.client().keys().await;

        let details = StatusDetails {
            total_auctions: snapshot.auctions.len(),
            open_auctions: snapshot.open_auctions().len(),
            total_bids: snapshot.bids.len(),
            total_keys: keys.len(),
            token_holders: snapshot.holders.len(),
        };
        pretty(&Report {
            summary: format!(
                "Blockchain has {} total auctions ({} open), {} bids, {} keys, and {} token holders",
                details.total_auctions,
                details.open_auctions,
                details.total_bids,
                details.total_keys,
                details.token_holders
            ),
            details,
        })
    }

    pub async fn get_keys(&self, _params: OperationParams) -> String {
        info!(tool = super::GET_KEYS, "listing keys");
        let keys = self.client().keys().await;
        pretty(&Report {
            summary: format!("Found {} keys in the keyring", keys.len()),
            details: KeyDetails { keys },
        })
    }
}
