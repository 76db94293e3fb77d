//! Crawler module for page rendering and clone orchestration
//!
//! This module contains the core cloning logic, including:
//! - Page rendering (headless browser or plain HTTP) with a fallback wait strategy
//! - HTTP fetching of assets
//! - Home page discovery and link planning
//! - Overall clone coordination

#[cfg(feature = "browser")]
mod chrome;
mod coordinator;
mod fetcher;
mod link_map;
mod parser;
mod renderer;

#[cfg(feature = "browser")]
pub use chrome::ChromeLauncher;
pub use coordinator::{CloneRequest, Coordinator};
pub use fetcher::{build_http_client, fetch, fetch_text, FetchError, FetchOptions};
pub use link_map::{public_path, LinkMap, PlannedPage, HOME_FILENAME};
pub use parser::{discover_home, extract_subpages, AssetDownload, HomeDiscovery};
pub use renderer::{
    render, BrowserLauncher, BrowserSession, HttpLauncher, NavigationError, WaitUntil,
};

use crate::config::Config;
use reqwest::Client;
use std::sync::Arc;

/// Picks the launcher for a configuration
///
/// Headless Chromium is used when `browser.enabled` is set and the crate was
/// built with the `browser` feature; otherwise pages are fetched over HTTP
/// with `client`.
pub fn default_launcher(config: &Config, client: Client) -> Arc<dyn BrowserLauncher> {
    browser_launcher(config).unwrap_or_else(|| Arc::new(HttpLauncher::new(client)))
}

#[cfg(feature = "browser")]
fn browser_launcher(config: &Config) -> Option<Arc<dyn BrowserLauncher>> {
    if !config.browser.enabled {
        return None;
    }
    Some(Arc::new(ChromeLauncher::new(config.browser.clone())))
}

#[cfg(not(feature = "browser"))]
fn browser_launcher(config: &Config) -> Option<Arc<dyn BrowserLauncher>> {
    if config.browser.enabled {
        tracing::warn!("Built without the browser feature, rendering over plain HTTP");
    }
    None
}
