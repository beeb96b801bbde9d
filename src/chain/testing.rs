//! Scripted `CommandExecutor` used by unit tests across the crate.

use super::runner::{AttemptError, AttemptFailure, CommandExecutor, Executable};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

type Reply = Result<String, AttemptError>;
type Responder = Box<dyn Fn(&[String]) -> Reply + Send + Sync>;

/// Replays canned replies and records every argument vector it receives.
pub struct ScriptedExecutor {
    responder: Responder,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    /// Answer each call with the next queued reply; an exhausted queue fails.
    pub fn queue(replies: Vec<Reply>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::from_fn(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(exit_failure("", "script exhausted")))
        })
    }

    pub fn from_fn(f: impl Fn(&[String]) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(f),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _exe: &Executable,
        args: &[String],
        _timeout: Duration,
    ) -> Result<String, AttemptError> {
        self.calls.lock().unwrap().push(args.to_vec());
        (self.responder)(args)
    }
}

/// Never finishes an attempt. Reports when an attempt starts and when its
/// future is dropped, standing in for a child killed by `kill_on_drop`.
#[derive(Default)]
pub struct HangingExecutor {
    started: Arc<Notify>,
    dropped: Arc<Notify>,
}

struct DropSignal(Arc<Notify>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.notify_one();
    }
}

impl HangingExecutor {
    pub async fn started(&self) {
        self.started.notified().await;
    }

    pub async fn dropped(&self) {
        self.dropped.notified().await;
    }
}

#[async_trait]
impl CommandExecutor for HangingExecutor {
    async fn execute(
        &self,
        _exe: &Executable,
        _args: &[String],
        _timeout: Duration,
    ) -> Result<String, AttemptError> {
        let _signal = DropSignal(self.dropped.clone());
        self.started.notify_one();
        std::future::pending().await
    }
}

pub fn exit_failure(stdout: &str, stderr: &str) -> AttemptError {
    AttemptError {
        failure: AttemptFailure::Exit {
            status: "exit status: 1".to_string(),
        },
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Value of `--flag` in an argument vector.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
