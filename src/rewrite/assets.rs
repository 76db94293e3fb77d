//! Asset reference discovery and localization
//!
//! Eligible references of each kind (attribute present and non-empty, not a
//! `data:` URL, resolvable against the document URL) are numbered 0, 1, 2...
//! in document order. Downloads and rewrites both use these positions, so a
//! rewritten reference always names the file downloaded for it.

use crate::config::LimitsConfig;
use crate::document::{Document, ElementId};
use crate::url::{
    asset_extension, is_absolute_reference, is_data_reference, resolve_reference,
    DEFAULT_IMAGE_EXTENSION,
};
use std::fmt;
use url::Url;

/// Kind of a downloadable asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Image,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [Self::Stylesheet, Self::Script, Self::Image];

    /// Selector matching elements that reference this kind
    pub fn selector(&self) -> &'static str {
        match self {
            Self::Stylesheet => r#"link[rel="stylesheet"]"#,
            Self::Script => "script[src]",
            Self::Image => "img[src]",
        }
    }

    /// Attribute holding the reference
    pub fn attr(&self) -> &'static str {
        match self {
            Self::Stylesheet => "href",
            Self::Script | Self::Image => "src",
        }
    }

    /// Output subdirectory
    pub fn dir(&self) -> &'static str {
        match self {
            Self::Stylesheet => "css",
            Self::Script => "js",
            Self::Image => "images",
        }
    }

    /// Per-document cap
    pub fn cap(&self, limits: &LimitsConfig) -> usize {
        match self {
            Self::Stylesheet => limits.max_stylesheets,
            Self::Script => limits.max_scripts,
            Self::Image => limits.max_images,
        }
    }

    /// Positional filename for the asset at `position`
    ///
    /// Images keep the extension of their resolved URL, defaulting to `.jpg`.
    pub fn filename(&self, position: usize, resolved: &Url) -> String {
        match self {
            Self::Stylesheet => format!("style-{}.css", position),
            Self::Script => format!("script-{}.js", position),
            Self::Image => {
                let ext = asset_extension(resolved)
                    .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());
                format!("image-{}{}", position, ext)
            }
        }
    }

    /// Path of the asset relative to the job directory
    pub fn local_path(&self, position: usize, resolved: &Url) -> String {
        format!("{}/{}", self.dir(), self.filename(position, resolved))
    }

    /// Stylesheets are localized even when referenced absolutely; scripts and
    /// images keep absolute references untouched.
    fn rewrites_absolute(&self) -> bool {
        matches!(self, Self::Stylesheet)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stylesheet => write!(f, "stylesheet"),
            Self::Script => write!(f, "script"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// One eligible asset reference in a document
#[derive(Debug, Clone)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub position: usize,
    pub element: ElementId,
    /// Attribute value as written in the document
    pub raw: String,
    pub url: Url,
}

/// Collects the eligible references of one kind, in document order
pub fn collect_asset_refs(doc: &Document, base: &Url, kind: AssetKind) -> Vec<AssetRef> {
    let mut refs = Vec::new();

    for element in doc.select(kind.selector()).unwrap_or_default() {
        let Some(raw) = doc.attr(element, kind.attr()) else {
            continue;
        };
        if raw.trim().is_empty() || is_data_reference(raw) {
            continue;
        }
        let Some(url) = resolve_reference(raw, base) else {
            continue;
        };

        refs.push(AssetRef {
            kind,
            position: refs.len(),
            element,
            raw: raw.to_string(),
            url,
        });
    }

    refs
}

/// Rewrites capped asset references to their positional local paths
///
/// `asset_base` is the site-absolute job directory, e.g.
/// `/cloned-sites/example-com-1700000000000`.
///
/// # Returns
///
/// The number of references rewritten
pub fn localize_assets(
    doc: &mut Document,
    base: &Url,
    limits: &LimitsConfig,
    asset_base: &str,
) -> usize {
    let mut rewritten = 0;

    for kind in AssetKind::ALL {
        let refs = collect_asset_refs(doc, base, kind);
        for asset in refs.into_iter().take(kind.cap(limits)) {
            if !kind.rewrites_absolute() && is_absolute_reference(&asset.raw) {
                continue;
            }
            let local = format!(
                "{}/{}",
                asset_base.trim_end_matches('/'),
                kind.local_path(asset.position, &asset.url)
            );
            doc.set_attr(asset.element, kind.attr(), &local);
            rewritten += 1;
        }
    }

    rewritten
}
