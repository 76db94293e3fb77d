//! Configuration module for Site Cloner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) is valid.
//!
//! # Example
//!
//! ```no_run
//! use site_cloner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("cloner.toml")).unwrap();
//! println!("Subpage cap: {}", config.limits.max_subpages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, ConcurrencyConfig, Config, CreditsConfig, HttpConfig, JobsConfig,
    LimitsConfig, OutputConfig, TimeoutsConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
