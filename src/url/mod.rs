//! URL handling module for Site Cloner
//!
//! This module provides URL validation, same-origin comparison, reference
//! resolution, and the deterministic name derivations (subdomain, filenames)
//! used to lay out a clone on disk.

mod domain;
mod filename;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{derive_subdomain, derive_subdomain_now, extract_domain};
pub use filename::{asset_extension, page_filename, sanitize_for_filename, DEFAULT_IMAGE_EXTENSION};

/// Parses an absolute `http`/`https` URL
///
/// # Errors
///
/// * `UrlError::Parse` - not an absolute URL
/// * `UrlError::InvalidScheme` - any scheme other than http or https
/// * `UrlError::MissingHost` - no host component
///
/// # Examples
///
/// ```
/// use site_cloner::url::parse_http_url;
///
/// let url = parse_http_url("https://example.com/about").unwrap();
/// assert_eq!(url.path(), "/about");
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// ```
pub fn parse_http_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true iff `input` parses as an absolute URL with scheme http or https
///
/// ```
/// use site_cloner::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com"));
/// assert!(is_valid_url("http://localhost:3000/page"));
/// assert!(!is_valid_url("example.com"));
/// assert!(!is_valid_url("/relative/path"));
/// assert!(!is_valid_url("mailto:someone@example.com"));
/// ```
pub fn is_valid_url(input: &str) -> bool {
    parse_http_url(input).is_ok()
}

/// Hostname equality between two URLs
///
/// Scheme and port are deliberately ignored: `http://example.com` and
/// `https://example.com:8443` are the same site for cloning purposes.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => ha.eq_ignore_ascii_case(hb),
        _ => false,
    }
}

/// Returns a copy of the URL without its fragment
pub fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Returns the `origin + path` form of a URL (no query, no fragment)
///
/// ```
/// use site_cloner::url::origin_and_path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/shop?page=2#top").unwrap();
/// assert_eq!(origin_and_path(&url), "https://example.com/shop");
/// ```
pub fn origin_and_path(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Returns true if a raw reference points at another origin explicitly
///
/// Absolute references are `http:`/`https:` URLs and protocol-relative `//host/...`
/// references. Anything else resolves against the document's own URL.
pub fn is_absolute_reference(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.starts_with("//") {
        return true;
    }
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns true for inline `data:` references
pub fn is_data_reference(raw: &str) -> bool {
    raw.trim()
        .get(..5)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Resolves a raw attribute value against a base URL
///
/// Returns None for empty values and for values that cannot be resolved.
pub fn resolve_reference(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    base.join(raw).ok()
}
