//! Configuration model and loading for the relay.
//!
//! The configuration is assembled once at startup from defaults, an optional
//! JSON5 file and environment variables, then handed to every component
//! constructor. Nothing else reads the process environment.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Environment variable names understood by the loader.
pub use loader::env_keys;
/// Configuration schema models.
pub use model::*;
