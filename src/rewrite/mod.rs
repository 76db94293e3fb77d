//! Document rewriting
//!
//! A [`Rewriter`] applies, in order:
//! - asset localization (positional local paths under the job directory)
//! - credit removal (when enabled)
//! - internal link remapping through the job's [`LinkMap`]
//!
//! Rewriting is synchronous and works on an already parsed [`Document`], so it
//! can be unit tested without a browser.

mod assets;
mod credits;
mod links;

pub use assets::{collect_asset_refs, localize_assets, AssetKind, AssetRef};
pub use credits::CreditRules;
pub use links::remap_links;

use crate::config::{Config, CreditsConfig, LimitsConfig};
use crate::crawler::LinkMap;
use crate::document::{Document, DocumentError};
use url::Url;

/// Per-document inputs of a rewrite
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    /// URL the document was rendered from
    pub page_url: &'a Url,
    /// Site-absolute job directory, e.g. `/cloned-sites/example-com-1700000000000`
    pub public_base: &'a str,
    pub link_map: &'a LinkMap,
}

/// Counts of what a rewrite changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub assets: usize,
    pub credits_removed: usize,
    pub links: usize,
}

/// Applies every rewrite pass to a document
#[derive(Debug, Clone)]
pub struct Rewriter {
    limits: LimitsConfig,
    credits: Option<CreditRules>,
}

impl Rewriter {
    /// Builds a rewriter; credit removal is skipped when disabled
    pub fn new(limits: LimitsConfig, credits: &CreditsConfig) -> Result<Self, DocumentError> {
        let credits = if credits.enabled {
            Some(CreditRules::from_config(credits)?)
        } else {
            None
        };
        Ok(Self { limits, credits })
    }

    pub fn from_config(config: &Config) -> Result<Self, DocumentError> {
        Self::new(config.limits.clone(), &config.credits)
    }

    /// Rewrites `doc` in place
    pub fn rewrite(&self, doc: &mut Document, ctx: &RewriteContext<'_>) -> RewriteStats {
        let assets = localize_assets(doc, ctx.page_url, &self.limits, ctx.public_base);
        let credits_removed = self
            .credits
            .as_ref()
            .map_or(0, |rules| rules.remove_credits(doc));
        let links = remap_links(doc, ctx.page_url, ctx.link_map);

        RewriteStats {
            assets,
            credits_removed,
            links,
        }
    }

    /// Parses, rewrites and serializes an HTML string
    ///
    /// Returns the rewritten HTML, the page title read before rewriting and
    /// the rewrite counts.
    pub fn rewrite_html(
        &self,
        html: &str,
        ctx: &RewriteContext<'_>,
    ) -> (String, Option<String>, RewriteStats) {
        let mut doc = Document::parse(html);
        let title = doc.title();
        let stats = self.rewrite(&mut doc, ctx);
        (doc.serialize(), title, stats)
    }
}
