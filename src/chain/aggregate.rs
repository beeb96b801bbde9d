//! Joins auctions, bids and token holders into one summary view.
//!
//! The join is a nested scan: every auction walks the whole bid list, so the
//! cost is O(auctions x bids). Both sides are bounded by the page ceiling.
//!
//! `currentBidAmount` is the amount of the *last* matching bid in fetch
//! order. It is not the highest bid and not the most recent one.

use super::records::{Auction, Bid, DenomOwner};
use serde::Serialize;

/// Reported when no bid references the auction.
pub const NO_BID_AMOUNT: &str = "0token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    Open,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidView {
    pub bidder: String,
    pub amount: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionView {
    pub auction_id: u64,
    pub issue: String,
    pub creator: String,
    pub description: String,
    pub status: String,
    pub winner: String,
    pub current_bid_amount: String,
    pub bids: Vec<BidView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    pub name: String,
    pub address: String,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionDetails {
    pub auctions: Vec<AuctionView>,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuctionSummary {
    pub summary: String,
    pub details: AuctionDetails,
}

/// Auctions whose status is `open`, ignoring case and surrounding blanks.
pub fn open_auctions(auctions: &[Auction]) -> Vec<Auction> {
    auctions.iter().filter(|a| a.is_open()).cloned().collect()
}

/// Display name cut from bytes 7..12 of the address. Cosmetic only.
pub fn participant_name(address: &str) -> &str {
    address.get(7..12).unwrap_or(address)
}

fn join_bids(auction: &Auction, bids: &[Bid]) -> AuctionView {
    let mut matched = Vec::new();
    let mut current = NO_BID_AMOUNT.to_string();

    for bid in bids.iter().filter(|b| b.auction_id == auction.id) {
        matched.push(BidView {
            bidder: bid.bidder.clone(),
            amount: bid.amount.clone(),
            description: bid.description.clone(),
        });
        current = bid.amount.clone();
    }

    AuctionView {
        auction_id: auction.id,
        issue: auction.issue.clone(),
        creator: auction.creator.clone(),
        description: auction.description.clone(),
        status: auction.status.clone(),
        winner: auction.winner.clone(),
        current_bid_amount: current,
        bids: matched,
    }
}

fn participant(owner: &DenomOwner) -> ParticipantView {
    ParticipantView {
        name: participant_name(&owner.address).to_string(),
        address: owner.address.clone(),
        balance: format!("{} {}", owner.balance.amount, owner.balance.denom),
    }
}

/// Build the aggregated view. `mode` only changes the summary sentence;
/// callers filter to open auctions beforehand when they want that.
pub fn summarize(
    auctions: &[Auction],
    bids: &[Bid],
    holders: &[DenomOwner],
    mode: SummaryMode,
) -> AuctionSummary {
    let views: Vec<AuctionView> = auctions.iter().map(|a| join_bids(a, bids)).collect();
    let participants = holders.iter().map(participant).collect();

    let summary = match mode {
        SummaryMode::Open if views.is_empty() => "No open auctions found.".to_string(),
        SummaryMode::Open => {
            let with_bids = views.iter().filter(|v| !v.bids.is_empty()).count();
            format!(
                "There are {} open auctions ({} with bids, {} without bids).",
                views.len(),
                with_bids,
                views.len() - with_bids
            )
        }
        SummaryMode::All => format!(
            "There are {} total auctions with {} total bids.",
            auctions.len(),
            bids.len()
        ),
    };

    AuctionSummary {
        summary,
        details: AuctionDetails {
            auctions: views,
            participants,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::records::Coin;
    use serde_json::json;

    fn auction(id: u64, status: &str) -> Auction {
        Auction {
            id,
            issue: format!("issue {id}"),
            description: String::new(),
            status: status.to_string(),
            winner: String::new(),
            creator: "cosmos1creator".to_string(),
        }
    }

    fn bid(auction_id: u64, amount: &str) -> Bid {
        Bid {
            auction_id,
            amount: amount.to_string(),
            description: format!("bid {amount}"),
            creator: String::new(),
            bidder: "cosmos1bidder".to_string(),
        }
    }

    fn holder(address: &str, amount: &str) -> DenomOwner {
        DenomOwner {
            address: address.to_string(),
            balance: Coin {
                amount: amount.to_string(),
                denom: "token".to_string(),
            },
        }
    }

    // Intentional quirk: the last match in fetch order wins, not the maximum.
    #[test]
    fn current_bid_is_last_match_in_fetch_order() {
        let auctions = [auction(1, "open"), auction(2, "open")];
        let bids = [bid(1, "5token"), bid(1, "9token")];
        let s = summarize(&auctions, &bids, &[], SummaryMode::All);
        assert_eq!(s.details.auctions[0].current_bid_amount, "9token");
        assert_eq!(s.details.auctions[0].bids.len(), 2);
        assert_eq!(s.details.auctions[1].current_bid_amount, "0token");
        assert!(s.details.auctions[1].bids.is_empty());
    }

    #[test]
    fn last_match_wins_even_when_smaller() {
        let bids = [bid(1, "900token"), bid(1, "1token")];
        let s = summarize(&[auction(1, "open")], &bids, &[], SummaryMode::Open);
        assert_eq!(s.details.auctions[0].current_bid_amount, "1token");
    }

    #[test]
    fn unmatched_bids_are_ignored() {
        let bids = [bid(7, "3token"), bid(0, "4token")];
        let s = summarize(&[auction(1, "open")], &bids, &[], SummaryMode::Open);
        assert!(s.details.auctions[0].bids.is_empty());
        assert_eq!(s.summary, "There are 1 open auctions (0 with bids, 1 without bids).");
    }

    #[test]
    fn duplicate_auctions_each_get_the_same_bids() {
        let auctions = [auction(4, "open"), auction(4, "open")];
        let bids = [bid(4, "2token")];
        let s = summarize(&auctions, &bids, &[], SummaryMode::All);
        assert_eq!(s.details.auctions.len(), 2);
        assert!(s.details.auctions.iter().all(|a| a.bids.len() == 1));
    }

    #[test]
    fn open_summary_without_auctions() {
        let s = summarize(&[], &[bid(1, "1token")], &[], SummaryMode::Open);
        assert_eq!(s.summary, "No open auctions found.");
        assert!(s.details.auctions.is_empty());
    }

    #[test]
    fn open_summary_counts_auctions_with_and_without_bids() {
        let auctions = [auction(1, "open"), auction(2, "open"), auction(3, "open")];
        let bids = [bid(1, "1token"), bid(3, "2token"), bid(3, "3token")];
        let s = summarize(&auctions, &bids, &[], SummaryMode::Open);
        assert_eq!(s.summary, "There are 3 open auctions (2 with bids, 1 without bids).");
    }

    #[test]
    fn all_summary_counts_every_bid() {
        let auctions = [auction(1, "open"), auction(2, "closed")];
        let bids = [bid(1, "1token"), bid(9, "2token")];
        let s = summarize(&auctions, &bids, &[], SummaryMode::All);
        assert_eq!(s.summary, "There are 2 total auctions with 2 total bids.");
    }

    #[test]
    fn open_filter_is_case_insensitive() {
        let auctions = [
            auction(1, "OPEN"),
            auction(2, " open "),
            auction(3, "closed"),
            auction(4, ""),
        ];
        let ids: Vec<u64> = open_auctions(&auctions).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn participants_keep_order_and_duplicates() {
        let holders = [
            holder("cosmos1alicexyz0000000000000000000000000000", "10"),
            holder("cosmos1bob", "3"),
            holder("cosmos1alicexyz0000000000000000000000000000", "10"),
        ];
        let s = summarize(&[], &[], &holders, SummaryMode::All);
        let p = &s.details.participants;
        assert_eq!(p.len(), 3);
        assert_eq!(p[0].name, "alice");
        assert_eq!(p[0].balance, "10 token");
        assert_eq!(p[1].name, "cosmos1bob");
        assert_eq!(p[2], p[0]);
    }

    #[test]
    fn participant_name_of_short_or_unicode_address() {
        assert_eq!(participant_name("cosmos1"), "cosmos1");
        assert_eq!(participant_name("cosmos1abcde"), "abcde");
        assert_eq!(participant_name("cosmos1ab\u{e9}cdef"), "ab\u{e9}c");
        assert_eq!(participant_name("cosmos\u{e9}abcdef"), "cosmos\u{e9}abcdef");
    }

    #[test]
    fn serialized_shape_uses_camel_case() {
        let s = summarize(&[auction(1, "open")], &[bid(1, "5token")], &[], SummaryMode::Open);
        let v = serde_json::to_value(&s).unwrap();
        let a = &v["details"]["auctions"][0];
        assert_eq!(a["auctionId"], json!(1));
        assert_eq!(a["currentBidAmount"], json!("5token"));
        assert_eq!(a["bids"][0]["bidder"], json!("cosmos1bidder"));
        assert_eq!(v["details"]["participants"], json!([]));
    }
}
