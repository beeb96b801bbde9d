/*!
config.rs - runtime settings.

Layering (lowest to highest):
  1. built-in defaults
  2. optional YAML file (`--config` / `SWECHAIN_MCP_CONFIG`)
  3. command-line flags and their environment variables

Every field is optional in the file; unknown keys are rejected so typos
surface at startup instead of being silently ignored.
*/

use crate::chain::client::{DEFAULT_CHAIN_ID, DEFAULT_DENOM, DEFAULT_FEES, DEFAULT_KEYRING_BACKEND};
use crate::chain::pager::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY, DEFAULT_PAGE_SIZE, PagePolicy};
use crate::chain::runner::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS};
use crate::chain::{ChainClient, ChainSettings, CommandRunner, Executable, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BINARY: &str = "swechaind";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid binary command '{0}'")]
    InvalidBinary(String),
    #[error("{program} not found in PATH")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("invalid node URL '{value}': {source}")]
    InvalidNode {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub timeout_secs: u64,
    pub backoff_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_secs: DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
            backoff_secs: DEFAULT_BACKOFF_UNIT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagingSettings {
    pub page_size: usize,
    pub max_pages: usize,
    pub page_delay_ms: u64,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay_ms: DEFAULT_PAGE_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Program name or command line, e.g. `swechaind` or `docker exec node swechaind`.
    pub binary: String,
    pub chain_id: String,
    pub keyring_backend: String,
    pub fees: String,
    pub denom: String,
    pub node: Option<String>,
    pub retry: RetrySettings,
    pub paging: PagingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            keyring_backend: DEFAULT_KEYRING_BACKEND.to_string(),
            fees: DEFAULT_FEES.to_string(),
            denom: DEFAULT_DENOM.to_string(),
            node: None,
            retry: RetrySettings::default(),
            paging: PagingSettings::default(),
        }
    }
}

/// Values taken from the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub binary: Option<String>,
    pub chain_id: Option<String>,
    pub node: Option<String>,
}

impl Settings {
    /// Defaults, or the YAML file at `path` layered over them.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(binary) = overrides.binary {
            self.binary = binary;
        }
        if let Some(chain_id) = overrides.chain_id {
            self.chain_id = chain_id;
        }
        if overrides.node.is_some() {
            self.node = overrides.node;
        }
        self
    }

    /// Shell-split `binary` and resolve its program against `PATH`.
    pub fn executable(&self) -> Result<Executable, ConfigError> {
        let parts = shell_words::split(self.binary.trim())
            .map_err(|_| ConfigError::InvalidBinary(self.binary.clone()))?;
        let Some((program, prefix)) = parts.split_first() else {
            return Err(ConfigError::InvalidBinary(self.binary.clone()));
        };
        let resolved = which::which(program).map_err(|source| ConfigError::NotFound {
            program: program.clone(),
            source,
        })?;
        Ok(Executable::new(resolved).with_prefix_args(prefix.iter().cloned()))
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Zero("retry.max_attempts"));
        }
        Ok(RetryPolicy {
            max_attempts: self.retry.max_attempts,
            attempt_timeout: Duration::from_secs(self.retry.timeout_secs),
            backoff_unit: Duration::from_secs(self.retry.backoff_secs),
        })
    }

    pub fn page_policy(&self) -> Result<PagePolicy, ConfigError> {
        if self.paging.page_size == 0 {
            return Err(ConfigError::Zero("paging.page_size"));
        }
        if self.paging.max_pages == 0 {
            return Err(ConfigError::Zero("paging.max_pages"));
        }
        Ok(PagePolicy {
            page_size: self.paging.page_size,
            max_pages: self.paging.max_pages,
            page_delay: Duration::from_millis(self.paging.page_delay_ms),
        })
    }

    pub fn chain_settings(&self) -> Result<ChainSettings, ConfigError> {
        let node = match self.node.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(Url::parse(value).map_err(|source| ConfigError::InvalidNode {
                value: value.to_string(),
                source,
            })?),
        };
        Ok(ChainSettings {
            chain_id: self.chain_id.clone(),
            keyring_backend: self.keyring_backend.clone(),
            fees: self.fees.clone(),
            denom: self.denom.clone(),
            node,
        })
    }

    /// Fully wired client over a real process executor.
    pub fn build_client(&self) -> Result<ChainClient, ConfigError> {
        let runner = CommandRunner::new(self.executable()?).with_policy(self.retry_policy()?);
        Ok(ChainClient::new(runner, self.chain_settings()?).with_paging(self.page_policy()?))
    }
}
