//! Everything that talks to the chain executable: process execution,
//! pagination, record decoding and the auction/bid join.

pub mod address;
pub mod aggregate;
pub mod client;
pub mod pager;
pub mod records;
pub mod runner;

#[cfg(test)]
pub mod testing;

pub use client::{ChainClient, ChainSettings, LookupError};
pub use runner::{CommandRunner, Executable, RetryPolicy, RunnerError};
