//! # Logging Module / 日志模块
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` always wins; without it
//! this crate logs at `info`, or `debug` in verbose mode, and everything else at
//! `warn`.
//!
//! 安装全局 `tracing` 订阅者。`RUST_LOG` 始终优先；否则本 crate 以 `info`
//! （详细模式下为 `debug`）级别记录，其他 crate 以 `warn` 级别记录。

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Builds the filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Initializes logging to stderr. Fails if a global subscriber is already set.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
