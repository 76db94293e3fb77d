//! HTML parser for home page discovery
//!
//! This module reads the rendered home page and extracts:
//! - The page title
//! - Same-site subpage candidates (from `<a href>` tags)
//! - The capped list of assets to download

use crate::config::LimitsConfig;
use crate::document::Document;
use crate::rewrite::{collect_asset_refs, AssetKind};
use crate::url::{resolve_reference, same_origin, without_fragment};
use std::collections::HashSet;
use url::Url;

/// An asset scheduled for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDownload {
    pub kind: AssetKind,
    pub position: usize,
    pub url: Url,
    /// Path relative to the job directory, e.g. `css/style-0.css`
    pub local_path: String,
}

/// Everything the pipeline needs from the home page
#[derive(Debug, Clone)]
pub struct HomeDiscovery {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Same-site subpages in first-seen order, capped
    pub subpages: Vec<Url>,

    /// Assets to download, capped per kind
    pub assets: Vec<AssetDownload>,
}

/// Parses the home page and extracts subpages and assets
///
/// # Subpage Rules
///
/// **Include:**
/// - `<a href="...">` resolved against the request URL
/// - `http`/`https` links on the same host as the request
///
/// **Exclude:**
/// - Links whose path equals the home page path
/// - Duplicates (compared without fragment)
/// - Anything past `limits.max_subpages`
///
/// # Example
///
/// ```
/// use site_cloner::config::LimitsConfig;
/// use site_cloner::crawler::discover_home;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let home = Url::parse("https://example.com/").unwrap();
/// let found = discover_home(html, &home, &LimitsConfig::default());
/// assert_eq!(found.title, Some("Test".to_string()));
/// assert_eq!(found.subpages[0].as_str(), "https://example.com/page");
/// ```
pub fn discover_home(html: &str, home: &Url, limits: &LimitsConfig) -> HomeDiscovery {
    let document = Document::parse(html);

    HomeDiscovery {
        title: document.title(),
        subpages: extract_subpages(&document, home, limits.max_subpages),
        assets: plan_asset_downloads(&document, home, limits),
    }
}

/// Extracts same-site subpage candidates from a document
pub fn extract_subpages(document: &Document, home: &Url, max: usize) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut subpages = Vec::new();

    for anchor in document.select("a[href]").unwrap_or_default() {
        if subpages.len() >= max {
            break;
        }

        let Some(url) = document
            .attr(anchor, "href")
            .and_then(|href| resolve_link(href, home))
        else {
            continue;
        };

        if !same_origin(&url, home) || url.path() == home.path() {
            continue;
        }

        if seen.insert(url.to_string()) {
            subpages.push(url);
        }
    }

    subpages
}

/// Assets to download, positions matching the rewrite of the same document
fn plan_asset_downloads(document: &Document, home: &Url, limits: &LimitsConfig) -> Vec<AssetDownload> {
    AssetKind::ALL
        .into_iter()
        .flat_map(|kind| {
            collect_asset_refs(document, home, kind)
                .into_iter()
                .take(kind.cap(limits))
        })
        .map(|asset| AssetDownload {
            kind: asset.kind,
            position: asset.position,
            local_path: asset.kind.local_path(asset.position, &asset.url),
            url: asset.url,
        })
        .collect()
}

/// Resolves a link href to an absolute URL without fragment
///
/// Returns None if the link should be excluded:
/// - non-http(s) schemes (javascript:, mailto:, tel:, data:)
/// - hrefs that cannot be resolved
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let url = resolve_reference(href, base_url)?;

    match url.scheme() {
        "http" | "https" => Some(without_fragment(&url)),
        _ => None,
    }
}
