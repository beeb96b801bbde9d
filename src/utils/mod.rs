//! Utilities: logging setup (level from -v/-q, overridable via RUST_LOG).
//!
//! All log output goes to stderr; stdout carries the MCP protocol when
//! serving and command results otherwise.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map CLI verbosity flags to a level. `quiet` wins over `verbose`.
pub fn derive_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Directive used when RUST_LOG is unset. Dependencies stay at `warn`
/// unless tracing is requested.
pub fn default_directive(level: Level) -> String {
    let crate_name = env!("CARGO_CRATE_NAME");
    if level == Level::TRACE {
        return "trace".to_string();
    }
    let deps = if level == Level::ERROR { "error" } else { "warn" };
    format!("{deps},{crate_name}={}", level.as_str().to_ascii_lowercase())
}

pub fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    // A second init (tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
