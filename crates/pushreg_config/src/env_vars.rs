//! Environment variable naming for the push registration services.
//!
//! Configuration values can be overridden with environment variables of the form
//! `PUSHREG__SECTION__KEY` (e.g. `PUSHREG__DATABASE__URL`). The prefix itself can be
//! changed with the `PREFIX` environment variable.

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "PUSHREG";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}
