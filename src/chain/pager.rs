//! Paginated list queries (`query <module> <query> --page-offset N ...`).
//!
//! Pages are fetched strictly one after another. Fetching stops on the first
//! empty page, on any runner or decode failure (keeping what was collected),
//! or at the page ceiling. Overlapping pages are not deduplicated.

use super::runner::CommandRunner;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_MAX_PAGES: usize = 10;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

pub type JsonObject = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    pub page_size: usize,
    /// Page ceiling; at most `page_size * max_pages` records are returned.
    pub max_pages: usize,
    /// Pause after each non-empty page.
    pub page_delay: Duration,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

pub struct PageFetcher<'a> {
    runner: &'a CommandRunner,
    policy: PagePolicy,
    flags: Vec<String>,
}

impl<'a> PageFetcher<'a> {
    /// `flags` are appended after the query words on every page request
    /// (keyring backend, output format, node).
    pub fn new(runner: &'a CommandRunner, policy: PagePolicy, flags: Vec<String>) -> Self {
        Self {
            runner,
            policy,
            flags,
        }
    }

    fn page_args(&self, module: &str, query: &str, offset: usize) -> Vec<String> {
        let mut args = vec!["query".to_string(), module.to_string(), query.to_string()];
        args.extend(self.flags.iter().cloned());
        args.extend([
            "--page-offset".to_string(),
            offset.to_string(),
            "--page-limit".to_string(),
            self.policy.page_size.to_string(),
        ]);
        args
    }

    /// Collect the objects under `result_key` across pages.
    pub async fn fetch_all(&self, module: &str, query: &str, result_key: &str) -> Vec<JsonObject> {
        let mut records = Vec::new();

        for page in 0..self.policy.max_pages {
            let offset = page * self.policy.page_size;
            let args = self.page_args(module, query, offset);

            let output = match self.runner.run(&args).await {
                Ok(output) => output,
                Err(err) => {
                    warn!(module, query, offset, error = %err, "page fetch failed; keeping partial results");
                    break;
                }
            };

            let body: Value = match serde_json::from_str(&output) {
                Ok(body) => body,
                Err(err) => {
                    warn!(module, query, offset, error = %err, "page is not valid JSON; keeping partial results");
                    break;
                }
            };

            let Some(items) = body
                .get(result_key)
                .and_then(Value::as_array)
                .filter(|items| !items.is_empty())
            else {
                debug!(module, query, offset, "empty page; done");
                break;
            };

            records.extend(items.iter().filter_map(|item| item.as_object().cloned()));
            debug!(module, query, offset, total = records.len(), "page fetched");

            tokio::time::sleep(self.policy.page_delay).await;
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::runner::{Executable, RetryPolicy};
    use crate::chain::testing::{ScriptedExecutor, exit_failure, flag_value};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn page_of(n: usize, offset: usize) -> String {
        let items: Vec<Value> = (0..n)
            .map(|i| json!({"id": (offset + i).to_string(), "status": "open"}))
            .collect();
        json!({ "Auction": items, "pagination": {} }).to_string()
    }

    fn runner(exec: Arc<ScriptedExecutor>) -> CommandRunner {
        CommandRunner::with_executor(Executable::new("swechaind"), exec).with_policy(RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        })
    }

    fn flags() -> Vec<String> {
        ["--keyring-backend", "test", "--output", "json"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn offset_of(args: &[String]) -> usize {
        flag_value(args, "--page-offset").unwrap().parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_empty_page() {
        let exec = Arc::new(ScriptedExecutor::from_fn(|args| {
            let offset = offset_of(args);
            let n = if offset < 150 { 50 } else { 0 };
            Ok(page_of(n, offset))
        }));
        let r = runner(exec.clone());
        let started = Instant::now();
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-auction", "Auction")
            .await;

        assert_eq!(records.len(), 150);
        assert_eq!(exec.call_count(), 4);
        let offsets: Vec<usize> = exec.calls().iter().map(|a| offset_of(a)).collect();
        assert_eq!(offsets, vec![0, 50, 100, 150]);
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_page_ceiling() {
        let exec = Arc::new(ScriptedExecutor::from_fn(|args| {
            Ok(page_of(50, offset_of(args)))
        }));
        let r = runner(exec.clone());
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-auction", "Auction")
            .await;

        assert_eq!(records.len(), 500);
        assert_eq!(exec.call_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_partial_results() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Ok(page_of(50, 0)),
            Err(exit_failure("", "rpc error")),
        ]));
        let r = runner(exec.clone());
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-auction", "Auction")
            .await;

        assert_eq!(records.len(), 50);
        assert_eq!(exec.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_json_ends_fetch() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Ok(page_of(3, 0)),
            Ok("Error: not json".into()),
            Ok(page_of(3, 100)),
        ]));
        let r = runner(exec.clone());
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-auction", "Auction")
            .await;

        assert_eq!(records.len(), 3);
        assert_eq!(exec.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_key_is_an_empty_page() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![Ok(
            json!({"Bid": [{"auctionId": "1"}]}).to_string(),
        )]));
        let r = runner(exec.clone());
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-auction", "Auction")
            .await;
        assert!(records.is_empty());
        assert_eq!(exec.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_object_items_are_skipped() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Ok(json!({"Bid": [{"auctionId": "1"}, 7, "x", null, {"auctionId": "2"}]}).to_string()),
            Ok(json!({"Bid": []}).to_string()),
        ]));
        let r = runner(exec.clone());
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-bid", "Bid")
            .await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_pages_are_not_deduplicated() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![
            Ok(page_of(2, 0)),
            Ok(page_of(2, 0)),
            Ok(page_of(0, 0)),
        ]));
        let r = runner(exec.clone());
        let records = PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-auction", "Auction")
            .await;
        assert_eq!(records.len(), 4);
        assert_eq!(records[0], records[2]);
    }

    #[tokio::test(start_paused = true)]
    async fn page_arguments_follow_query_template() {
        let exec = Arc::new(ScriptedExecutor::queue(vec![Ok(page_of(0, 0))]));
        let r = runner(exec.clone());
        PageFetcher::new(&r, PagePolicy::default(), flags())
            .fetch_all("issuemarket", "list-bid", "Bid")
            .await;
        assert_eq!(
            exec.calls()[0],
            vec![
                "query",
                "issuemarket",
                "list-bid",
                "--keyring-backend",
                "test",
                "--output",
                "json",
                "--page-offset",
                "0",
                "--page-limit",
                "50"
            ]
        );
    }
}
