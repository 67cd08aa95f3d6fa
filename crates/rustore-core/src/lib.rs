//! RuStore publishing configuration
//!
//! Loads `rustore.toml` / `rustore.yaml` (searched upward from the working
//! directory), fills in defaults and validates the result before a
//! publishing run is assembled from it.

pub mod config;
pub mod error;

pub use config::{load_config, load_config_from_dir, load_config_or_default, Config};
pub use error::{ConfigError, Result};
