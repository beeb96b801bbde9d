//! Query and transaction vocabulary of the chain executable.

use super::aggregate::open_auctions;
use super::address::is_valid_address;
use super::pager::{JsonObject, PageFetcher, PagePolicy};
use super::records::{
    Auction, Balance, Bid, DenomOwner, Key, objects, parse_auctions, parse_balances, parse_bids,
    parse_denom_owners, parse_keys,
};
use super::runner::{CommandRunner, RunnerError};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_CHAIN_ID: &str = "swechain";
pub const DEFAULT_KEYRING_BACKEND: &str = "test";
pub const DEFAULT_FEES: &str = "200token";
pub const DEFAULT_DENOM: &str = "token";

/// Per-chain flags shared by every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    pub chain_id: String,
    pub keyring_backend: String,
    pub fees: String,
    /// Denomination whose holders are listed as participants.
    pub denom: String,
    /// Appended as `--node` to queries and transactions, never to `keys`.
    pub node: Option<Url>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            keyring_backend: DEFAULT_KEYRING_BACKEND.to_string(),
            fees: DEFAULT_FEES.to_string(),
            denom: DEFAULT_DENOM.to_string(),
            node: None,
        }
    }
}

/// Failure of a single-record lookup. These are surfaced to callers, unlike
/// list queries which degrade to empty collections.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to get key info: {0}")]
    KeyInfo(RunnerError),
    #[error("failed to parse key data: {0}")]
    KeyParse(serde_json::Error),
    #[error("address not found in key data")]
    AddressMissing,
    #[error("invalid cosmos address format: {0}")]
    InvalidAddress(String),
    #[error("failed to query balance: {0}")]
    BalanceQuery(RunnerError),
    #[error("failed to parse balance data: {0}")]
    BalanceParse(serde_json::Error),
}

/// Everything fetched for an auction overview.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub auctions: Vec<Auction>,
    pub bids: Vec<Bid>,
    pub holders: Vec<DenomOwner>,
}

impl MarketSnapshot {
    pub fn open_auctions(&self) -> Vec<Auction> {
        open_auctions(&self.auctions)
    }
}

#[derive(Debug, Clone)]
pub struct ChainClient {
    runner: CommandRunner,
    settings: ChainSettings,
    paging: PagePolicy,
}

fn owned(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl ChainClient {
    pub fn new(runner: CommandRunner, settings: ChainSettings) -> Self {
        Self {
            runner,
            settings,
            paging: PagePolicy::default(),
        }
    }

    pub fn with_paging(mut self, paging: PagePolicy) -> Self {
        self.paging = paging;
        self
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /* ---- Flag builders ---- */

    fn keyring_flags(&self) -> Vec<String> {
        owned(&[
            "--keyring-backend",
            self.settings.keyring_backend.as_str(),
            "--output",
            "json",
        ])
    }

    fn push_node(&self, args: &mut Vec<String>) {
        if let Some(node) = &self.settings.node {
            args.push("--node".to_string());
            args.push(node.to_string());
        }
    }

    fn query_flags(&self) -> Vec<String> {
        let mut flags = self.keyring_flags();
        self.push_node(&mut flags);
        flags
    }

    /// `tx <module> <subcommand> <positional...> --from ... --yes --output json`
    pub fn tx_args(&self, module: &str, subcommand: &str, positional: &[&str], from: &str) -> Vec<String> {
        let mut args = owned(&["tx", module, subcommand]);
        args.extend(owned(positional));
        args.extend(owned(&[
            "--from",
            from,
            "--keyring-backend",
            self.settings.keyring_backend.as_str(),
            "--chain-id",
            self.settings.chain_id.as_str(),
            "--fees",
            self.settings.fees.as_str(),
            "--yes",
            "--output",
            "json",
        ]));
        self.push_node(&mut args);
        args
    }

    /* ---- List queries ---- */

    fn fetcher(&self) -> PageFetcher<'_> {
        PageFetcher::new(&self.runner, self.paging, self.query_flags())
    }

    pub async fn auctions(&self) -> Vec<Auction> {
        let raw = self.fetcher().fetch_all("issuemarket", "list-auction", "Auction").await;
        parse_auctions(&raw)
    }

    pub async fn bids(&self) -> Vec<Bid> {
        let raw = self.fetcher().fetch_all("issuemarket", "list-bid", "Bid").await;
        parse_bids(&raw)
    }

    /// Holders of the configured denomination. Single page; failures yield
    /// an empty list.
    pub async fn denom_owners(&self) -> Vec<DenomOwner> {
        let mut args = owned(&["query", "bank", "denom-owners", self.settings.denom.as_str()]);
        args.extend(self.query_flags());

        let output = match self.runner.run(&args).await {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "fetching denom owners failed");
                return Vec::new();
            }
        };
        match serde_json::from_str::<JsonObject>(&output) {
            Ok(body) => {
                let entries = body
                    .get("denom_owners")
                    .and_then(Value::as_array)
                    .map(|items| objects(items))
                    .unwrap_or_default();
                parse_denom_owners(&entries)
            }
            Err(err) => {
                warn!(error = %err, "denom owners output is not valid JSON");
                Vec::new()
            }
        }
    }

    /// Keyring entries. Failures yield an empty list.
    pub async fn keys(&self) -> Vec<Key> {
        let mut args = owned(&["keys", "list"]);
        args.extend(self.keyring_flags());

        let output = match self.runner.run(&args).await {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "fetching keys failed");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Value>>(&output) {
            Ok(items) => parse_keys(&objects(&items)),
            Err(err) => {
                warn!(error = %err, "key list output is not a JSON array");
                Vec::new()
            }
        }
    }

    /// Auctions, bids and holders, fetched one after another.
    pub async fn snapshot(&self) -> MarketSnapshot {
        let auctions = self.auctions().await;
        let bids = self.bids().await;
        let holders = self.denom_owners().await;
        MarketSnapshot {
            auctions,
            bids,
            holders,
        }
    }

    /* ---- Single lookups ---- */

    pub async fn key_address(&self, key_name: &str) -> Result<String, LookupError> {
        let mut args = owned(&["keys", "show", key_name]);
        args.extend(self.keyring_flags());

        let output = self.runner.run(&args).await.map_err(LookupError::KeyInfo)?;
        let data: JsonObject = serde_json::from_str(&output).map_err(LookupError::KeyParse)?;
        let address = data
            .get("address")
            .and_then(Value::as_str)
            .ok_or(LookupError::AddressMissing)?;
        if !is_valid_address(address) {
            return Err(LookupError::InvalidAddress(address.to_string()));
        }
        Ok(address.to_string())
    }

    pub async fn balances(&self, address: &str) -> Result<Vec<Balance>, LookupError> {
        let mut args = owned(&["query", "bank", "balances", address]);
        args.extend(self.query_flags());

        let output = self.runner.run(&args).await.map_err(LookupError::BalanceQuery)?;
        let data: JsonObject = serde_json::from_str(&output).map_err(LookupError::BalanceParse)?;
        let entries = data
            .get("balances")
            .and_then(Value::as_array)
            .map(|items| objects(items))
            .unwrap_or_default();
        Ok(parse_balances(&entries))
    }

    /* ---- Transactions ---- */

    /// Submit a transaction and return the executable's stdout verbatim.
    pub async fn submit_tx(
        &self,
        module: &str,
        subcommand: &str,
        positional: &[&str],
        from: &str,
    ) -> Result<String, RunnerError> {
        let args = self.tx_args(module, subcommand, positional, from);
        self.runner.run(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::runner::{Executable, RetryPolicy};
    use crate::chain::testing::{ScriptedExecutor, exit_failure};
    use serde_json::json;
    use std::sync::Arc;

    const ALICE: &str = "cosmos1alice0000000000000000000000000000000";

    fn client(exec: Arc<ScriptedExecutor>, settings: ChainSettings) -> ChainClient {
        let runner = CommandRunner::with_executor(Executable::new("swechaind"), exec).with_policy(
            RetryPolicy {
                max_attempts: 1,
                ..RetryPolicy::default()
            },
        );
        ChainClient::new(runner, settings)
    }

    fn with_node() -> ChainSettings {
        ChainSettings {
            node: Some(Url::parse("tcp://localhost:26657").unwrap()),
            ..ChainSettings::default()
        }
    }

    #[test]
    fn tx_arguments_follow_template() {
        let c = client(Arc::new(ScriptedExecutor::queue(vec![])), ChainSettings::default());
        let args = c.tx_args("bank", "send", &["a", "b", "5token"], "a");
        assert_eq!(
            args,
            vec![
                "tx", "bank", "send", "a", "b", "5token", "--from", "a", "--keyring-backend",
                "test", "--chain-id", "swechain", "--fees", "200token", "--yes", "--output", "json"
            ]
        );
    }

    #[test]
    fn node_is_appended_to_transactions() {
        let c = client(Arc::new(ScriptedExecutor::queue(vec![])), with_node());
        let args = c.tx_args("issuemarket", "create-auction", &["i", "d", "open", ""], "a");
        assert_eq!(&args[args.len() - 2..], ["--node", "tcp://localhost:26657"]);
    }

    #[tokio::test]
    async fn keys_commands_never_get_node() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Ok(json!([{"name": "alice", "address": ALICE}]).to_string()),
            Ok(json!({"name": "alice", "address": ALICE}).to_string()),
        ]));
        let c = client(exec.clone(), with_node());
        assert_eq!(c.keys().await.len(), 1);
        assert_eq!(c.key_address("alice").await.unwrap(), ALICE);
        for call in exec.calls() {
            assert!(!call.contains(&"--node".to_string()));
        }
        assert_eq!(
            exec.calls()[1],
            vec!["keys", "show", "alice", "--keyring-backend", "test", "--output", "json"]
        );
    }

    #[tokio::test]
    async fn key_address_errors() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Err(exit_failure("", "key not found")),
            Ok("not json".into()),
            Ok(json!({"name": "bob"}).to_string()),
            Ok(json!({"address": 12}).to_string()),
            Ok(json!({"address": "osmo1xyz"}).to_string()),
        ]));
        let c = client(exec, ChainSettings::default());

        let e = c.key_address("bob").await.unwrap_err().to_string();
        assert!(e.starts_with("failed to get key info: command failed"));
        assert!(e.contains("STDERR: key not found"));
        assert!(matches!(c.key_address("bob").await, Err(LookupError::KeyParse(_))));
        assert!(matches!(c.key_address("bob").await, Err(LookupError::AddressMissing)));
        assert!(matches!(c.key_address("bob").await, Err(LookupError::AddressMissing)));
        assert_eq!(
            c.key_address("bob").await.unwrap_err().to_string(),
            "invalid cosmos address format: osmo1xyz"
        );
    }

    #[tokio::test]
    async fn balances_are_decoded() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Ok(json!({"balances": [{"denom": "token", "amount": "1500"}, "junk"]}).to_string()),
            Ok(json!({"pagination": {}}).to_string()),
            Ok("garbage".into()),
        ]));
        let c = client(exec.clone(), ChainSettings::default());

        let b = c.balances(ALICE).await.unwrap();
        assert_eq!(b, vec![Balance { denom: "token".into(), amount: "1500".into() }]);
        assert!(c.balances(ALICE).await.unwrap().is_empty());
        assert!(matches!(c.balances(ALICE).await, Err(LookupError::BalanceParse(_))));
        assert_eq!(&exec.calls()[0][..4], ["query", "bank", "balances", ALICE]);
    }

    #[tokio::test]
    async fn denom_owner_failures_degrade_to_empty() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Err(exit_failure("", "boom")),
            Ok("[]".into()),
            Ok(json!({
                "denom_owners": [{"address": ALICE, "balance": {"denom": "token", "amount": "7"}}]
            })
            .to_string()),
        ]));
        let c = client(exec.clone(), ChainSettings::default());

        assert!(c.denom_owners().await.is_empty());
        assert!(c.denom_owners().await.is_empty());
        let owners = c.denom_owners().await;
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].balance.amount, "7");
        assert_eq!(&exec.calls()[0][..4], ["query", "bank", "denom-owners", "token"]);
    }

    #[tokio::test]
    async fn key_list_failure_is_empty() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Err(exit_failure("", "keyring locked")),
            Ok(json!({"not": "an array"}).to_string()),
        ]));
        let c = client(exec, ChainSettings::default());
        assert!(c.keys().await.is_empty());
        assert!(c.keys().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_queries_in_order() {
        let exec = Arc::new(ScriptedExecutor::from_fn(|args| {
            let offset = crate::chain::testing::flag_value(args, "--page-offset");
            Ok(match (args[2].as_str(), offset) {
                ("list-auction", Some("0")) => json!({"Auction": [{"id": "1", "status": "open"}, {"id": "2", "status": "closed"}]}),
                ("list-bid", Some("0")) => json!({"Bid": [{"auctionId": "1", "amount": "3token"}]}),
                ("denom-owners", _) => json!({"denom_owners": []}),
                _ => json!({}),
            }
            .to_string())
        }));
        let c = client(exec.clone(), ChainSettings::default());
        let snap = c.snapshot().await;

        assert_eq!(snap.auctions.len(), 2);
        assert_eq!(snap.bids.len(), 1);
        assert!(snap.holders.is_empty());
        assert_eq!(snap.open_auctions().len(), 1);
        let queries: Vec<String> = exec.calls().iter().map(|a| a[2].clone()).collect();
        assert_eq!(
            queries,
            vec!["list-auction", "list-auction", "list-bid", "list-bid", "denom-owners"]
        );
    }
}
