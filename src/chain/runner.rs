//! Resilient invocation of the chain executable.
//!
//! `CommandRunner::run(args)` executes the configured executable with a
//! per-attempt timeout and retries failures with a linear backoff
//! (1 x unit, 2 x unit, ...). Spawning lives behind [`CommandExecutor`] so
//! the retry loop can be driven by scripted executors in tests.
//!
//! Dropping the future returned by `run` kills the child that is currently
//! running (`kill_on_drop`). The MCP layer drops it when a request is
//! cancelled. A timed-out attempt is killed too, and keeps whatever the child
//! printed before the deadline.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/* ---- Policy ---- */

/// Attempt budget for a single `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wall-clock bound for one attempt; the child is killed on expiry.
    pub attempt_timeout: Duration,
    /// Delay after the n-th failure is `n * backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    /// Delay slept after `failures` failed attempts (1-based). Linear.
    pub fn delay_after(&self, failures: u32) -> Duration {
        self.backoff_unit * failures
    }
}

/* ---- Executable ---- */

/// Resolved program plus fixed leading arguments (e.g. `docker exec node`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    pub program: PathBuf,
    pub prefix_args: Vec<String>,
}

impl Executable {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    pub fn with_prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Human-readable command line, used in logs.
    pub fn command_line(&self, args: &[String]) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.prefix_args.iter().cloned());
        parts.extend(args.iter().cloned());
        shell_words::join(parts)
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line(&[]))
    }
}

/* ---- Attempt outcome ---- */

/// Why a single attempt did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptFailure {
    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },
    #[error("failed waiting for {program}: {reason}")]
    Wait { program: String, reason: String },
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("{status}")]
    Exit { status: String },
}

/// A failed attempt together with whatever the child printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError {
    pub failure: AttemptFailure,
    pub stdout: String,
    pub stderr: String,
}

impl AttemptError {
    pub fn bare(failure: AttemptFailure) -> Self {
        Self {
            failure,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Final error once every attempt has failed.
///
/// Carries the last attempt's cause and captured output so callers can show
/// operators what the executable actually said.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("command failed: {cause}\nSTDOUT: {stdout}\nSTDERR: {stderr}")]
pub struct RunnerError {
    pub attempts: u32,
    pub cause: AttemptFailure,
    pub stdout: String,
    pub stderr: String,
}

/* ---- Executor seam ---- */

/// Runs one attempt of a command. Returns raw stdout on a zero exit status.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        exe: &Executable,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, AttemptError>;
}

/// Spawns real child processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

/// How long a timed-out child's pipes are still read after the kill.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Append everything readable from `pipe` to `buf` until EOF or a read error.
///
/// Each chunk lands in `buf` as soon as it is read, so output survives when
/// the surrounding future is dropped on timeout.
async fn drain<R: AsyncRead + Unpin>(pipe: &mut Option<R>, buf: &mut Vec<u8>) {
    let Some(pipe) = pipe.as_mut() else {
        return;
    };
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn lossy(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        exe: &Executable,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, AttemptError> {
        let program = exe.program.display().to_string();
        let mut child = Command::new(&exe.program)
            .args(&exe.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AttemptError::bare(AttemptFailure::Spawn {
                    program: program.clone(),
                    reason: e.to_string(),
                })
            })?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let waited = tokio::time::timeout(timeout, async {
            let (status, (), ()) = tokio::join!(
                child.wait(),
                drain(&mut stdout_pipe, &mut stdout),
                drain(&mut stderr_pipe, &mut stderr),
            );
            status
        })
        .await;

        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(AttemptError {
                    failure: AttemptFailure::Wait {
                        program,
                        reason: e.to_string(),
                    },
                    stdout: lossy(&stdout),
                    stderr: lossy(&stderr),
                });
            }
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    debug!(%program, error = %e, "kill after timeout failed");
                }
                // Pick up whatever was still buffered in the pipes.
                let _ = tokio::time::timeout(DRAIN_GRACE, async {
                    tokio::join!(
                        drain(&mut stdout_pipe, &mut stdout),
                        drain(&mut stderr_pipe, &mut stderr),
                    )
                })
                .await;
                return Err(AttemptError {
                    failure: AttemptFailure::TimedOut(timeout),
                    stdout: lossy(&stdout),
                    stderr: lossy(&stderr),
                });
            }
        };

        if status.success() {
            return Ok(lossy(&stdout));
        }
        Err(AttemptError {
            failure: AttemptFailure::Exit {
                status: status.to_string(),
            },
            stdout: lossy(&stdout),
            stderr: lossy(&stderr),
        })
    }
}

/* ---- Runner ---- */

/// Executes the chain binary with timeout, retry and linear backoff.
#[derive(Clone)]
pub struct CommandRunner {
    exe: Executable,
    executor: Arc<dyn CommandExecutor>,
    policy: RetryPolicy,
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("exe", &self.exe)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CommandRunner {
    pub fn new(exe: Executable) -> Self {
        Self::with_executor(exe, Arc::new(ProcessExecutor))
    }

    pub fn with_executor(exe: Executable, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            exe,
            executor,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn executable(&self) -> &Executable {
        &self.exe
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run the executable with `args`, returning trimmed stdout.
    pub async fn run(&self, args: &[String]) -> Result<String, RunnerError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let line = self.exe.command_line(args);
        let mut attempt = 1;

        loop {
            if attempt == 1 {
                info!(command = %line, "executing command");
            } else {
                info!(attempt, command = %line, "retrying command");
            }

            match self
                .executor
                .execute(&self.exe, args, self.policy.attempt_timeout)
                .await
            {
                Ok(stdout) => {
                    let out = stdout.trim().to_string();
                    debug!(attempt, bytes = out.len(), "command succeeded");
                    return Ok(out);
                }
                Err(err) if attempt < max_attempts => {
                    warn!(attempt, command = %line, error = %err.failure, "command attempt failed");
                    tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        attempts = attempt,
                        command = %line,
                        error = %err.failure,
                        "command failed after all attempts"
                    );
                    return Err(RunnerError {
                        attempts: attempt,
                        cause: err.failure,
                        stdout: err.stdout,
                        stderr: err.stderr,
                    });
                }
            }
        }
    }
}

/* ---- Tests ---- */
