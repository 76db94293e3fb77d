//! Site Cloner: renders a live website into a portable local copy
//!
//! This crate renders a target page, discovers same-site subpages, downloads
//! referenced stylesheets, scripts and images, rewrites the documents to point
//! at the local copies, strips credit markup and finally converts site-absolute
//! paths into relative ones.

pub mod config;
pub mod crawler;
pub mod document;
pub mod output;
pub mod rewrite;
pub mod service;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site Cloner operations
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Navigation(#[from] crawler::NavigationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Job {job_id} is {status}, expected completed")]
    InvalidState {
        job_id: String,
        status: state::JobStatus,
    },

    #[error("Document error: {0}")]
    Document(#[from] document::DocumentError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl task panicked: {0}")]
    Panicked(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Site Cloner operations
pub type Result<T> = std::result::Result<T, CloneError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use service::{CloneAccepted, FinalizeReport, JobStatusReport, SiteCloner};
pub use state::JobStatus;
pub use storage::{CloneJob, PageRecord};
pub use url::{derive_subdomain, is_valid_url, same_origin, sanitize_for_filename};
