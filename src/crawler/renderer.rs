//! Page rendering
//!
//! A [`BrowserLauncher`] opens one [`BrowserSession`] per clone job; the session
//! is reused for the home page and every subpage, then closed exactly once.
//!
//! [`render`] applies the navigation policy on top of a session: a first
//! attempt waits for `DOMContentLoaded`, and if that fails a second attempt
//! waits for the full `load` event with the same timeout. Each attempt is
//! bounded by an outer timer, so a session that ignores its own timeout still
//! cannot hold the caller past the bound.

use crate::crawler::fetcher::{fetch_text, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors raised while rendering a page
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Navigation to {url} failed: {message}")]
    Failed { url: String, message: String },

    #[error("Navigation to {url} failed with every wait strategy: {cause}")]
    Exhausted {
        url: String,
        #[source]
        cause: Box<NavigationError>,
    },
}

/// Page readiness condition a navigation waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// The document has been parsed (`DOMContentLoaded`)
    DomContentLoaded,
    /// The document and its subresources have loaded (`load`)
    Load,
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomContentLoaded => write!(f, "domcontentloaded"),
            Self::Load => write!(f, "load"),
        }
    }
}

/// Opens rendering sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, NavigationError>;
}

/// A live rendering context
///
/// `navigate` may be called concurrently from several tasks sharing the
/// session. `close` is called once, after every navigation has finished.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates to `url` and returns the rendered HTML
    async fn navigate(
        &self,
        url: &Url,
        wait: WaitUntil,
        timeout: Duration,
    ) -> Result<String, NavigationError>;

    /// Releases the session's resources
    async fn close(&mut self);
}

/// Renders a page with the primary/fallback wait strategy
///
/// # Errors
///
/// * `NavigationError::Exhausted` - both attempts failed; carries the cause of
///   the second attempt
pub async fn render(
    session: &dyn BrowserSession,
    url: &Url,
    timeout: Duration,
) -> Result<String, NavigationError> {
    match attempt(session, url, WaitUntil::DomContentLoaded, timeout).await {
        Ok(html) => Ok(html),
        Err(first) => {
            warn!(url = %url, error = %first, "Primary navigation failed, retrying with load wait");
            attempt(session, url, WaitUntil::Load, timeout)
                .await
                .map_err(|cause| NavigationError::Exhausted {
                    url: url.to_string(),
                    cause: Box::new(cause),
                })
        }
    }
}

async fn attempt(
    session: &dyn BrowserSession,
    url: &Url,
    wait: WaitUntil,
    timeout: Duration,
) -> Result<String, NavigationError> {
    debug!(url = %url, wait = %wait, "Navigating");
    match tokio::time::timeout(timeout, session.navigate(url, wait, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(NavigationError::Timeout {
            url: url.to_string(),
            timeout,
        }),
    }
}

/// Launcher that renders pages with a plain HTTP GET
///
/// No JavaScript runs, so the wait strategy has no effect.
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    client: Client,
}

impl HttpLauncher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrowserLauncher for HttpLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, NavigationError> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
        }))
    }
}

struct HttpSession {
    client: Client,
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(
        &self,
        url: &Url,
        _wait: WaitUntil,
        timeout: Duration,
    ) -> Result<String, NavigationError> {
        fetch_text(&self.client, url, timeout)
            .await
            .map_err(|e| match e {
                FetchError::Timeout { url } => NavigationError::Timeout { url, timeout },
                other => NavigationError::Failed {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })
    }

    async fn close(&mut self) {}
}
