//! HTTP fetcher implementation
//!
//! This module handles every plain HTTP request made during a clone:
//! - Building HTTP clients with the configured user agent
//! - GET requests for assets (text or binary) with a per-request timeout
//! - Error classification (timeout, status, network, body)
//!
//! Each call makes exactly one attempt. Callers decide whether a failure is
//! fatal; asset downloads never are.

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Errors raised by a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn classify(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Per-call fetch options
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Bound on the whole request, body included
    pub timeout: Duration,
    /// Return the raw body instead of charset-decoded text
    pub binary: bool,
}

impl FetchOptions {
    pub fn text(timeout: Duration) -> Self {
        Self {
            timeout,
            binary: false,
        }
    }

    pub fn binary(timeout: Duration) -> Self {
        Self {
            timeout,
            binary: true,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration (user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_cloner::config::HttpConfig;
/// use site_cloner::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body
///
/// In text mode the body is decoded using the response charset and returned
/// as UTF-8 bytes.
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Request exceeds `options.timeout` | `FetchError::Timeout` |
/// | Non-2xx final status | `FetchError::Status` |
/// | Connection, TLS or redirect failure | `FetchError::Network` |
/// | Body could not be read or decoded | `FetchError::Body` |
pub async fn fetch(client: &Client, url: &Url, options: FetchOptions) -> Result<Vec<u8>, FetchError> {
    if options.binary {
        let response = send(client, url, options.timeout).await?;
        let bytes = response.bytes().await.map_err(|e| body_error(url, e))?;
        Ok(bytes.to_vec())
    } else {
        fetch_text(client, url, options.timeout)
            .await
            .map(String::into_bytes)
    }
}

/// Fetches a URL as charset-decoded text
pub async fn fetch_text(client: &Client, url: &Url, timeout: Duration) -> Result<String, FetchError> {
    let response = send(client, url, timeout).await?;
    response.text().await.map_err(|e| body_error(url, e))
}

async fn send(client: &Client, url: &Url, timeout: Duration) -> Result<Response, FetchError> {
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

fn body_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Body {
            url: url.to_string(),
            source: error,
        }
    }
}
