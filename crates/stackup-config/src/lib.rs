//! Configuration management for stackup
//!
//! Configuration is a flat `KEY=value` environment file, loaded once
//! before any phase runs and immutable afterwards. Required keys gate the
//! whole run; optional keys carry documented defaults that phases apply
//! themselves.

mod config;
mod env_file;
mod keys;

pub use config::Config;
pub use env_file::parse_env_file;
pub use keys::{DEFAULT_ENV_FILE, OPTIONAL_DEFAULTS, REQUIRED_KEYS, optional_default};
pub use stackup_utils::error::ConfigError;
