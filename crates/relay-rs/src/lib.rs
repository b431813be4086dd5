//! Telegram relay: answers with an LLM and logs every message to Google Sheets.
//!
//! This crate re-exports the building blocks and hosts the Telegram transport
//! adapter used by the `relay` binary.

pub mod telegram;

/// Re-export for convenience.
pub use relay_rs_config as config;
pub use relay_rs_core as core;
/// Re-export for convenience.
pub use relay_rs_memory as memory;
/// Re-export for convenience.
pub use relay_rs_sheets as sheets;

/// Initialize logging with millisecond timestamps.
///
/// Defaults to `info`; `RUST_LOG` overrides. Calling twice is harmless.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
