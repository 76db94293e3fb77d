//! Finalization: site-absolute references become directory-relative
//!
//! Every `.html` file directly inside the job directory is scanned. For anchor
//! `href`, stylesheet `href`, script `src` and image `src` attributes starting
//! with `<public-base>/`, the prefix is stripped. A file is only rewritten when
//! at least one reference changed, so a second pass leaves every file
//! byte-identical.

use crate::document::Document;
use crate::output::SiteLayout;
use crate::CloneError;
use std::path::PathBuf;

/// Elements and attributes holding references to rewrite
const REFERENCE_ATTRS: &[(&str, &str)] = &[
    ("a[href]", "href"),
    (r#"link[rel="stylesheet"]"#, "href"),
    ("script[src]", "src"),
    ("img[src]", "src"),
];

/// Summary of a finalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeStats {
    /// HTML files inspected
    pub files_scanned: usize,
    /// Files written back because a reference changed
    pub files_rewritten: usize,
    /// References made relative
    pub references: usize,
}

/// Strips `prefix` from every reference in `html`
///
/// Returns the new HTML and the number of references changed, or None when
/// nothing matched.
///
/// # Example
///
/// ```
/// use site_cloner::output::relativize_html;
///
/// let html = r#"<a href="/cloned-sites/x-1/_about.html">About</a>"#;
/// let (out, changed) = relativize_html(html, "/cloned-sites/x-1/").unwrap();
/// assert_eq!(changed, 1);
/// assert!(out.contains(r#"href="_about.html""#));
/// assert!(relativize_html(&out, "/cloned-sites/x-1/").is_none());
/// ```
pub fn relativize_html(html: &str, prefix: &str) -> Option<(String, usize)> {
    let mut doc = Document::parse(html);
    let mut changed = 0;

    for (selector, attr) in REFERENCE_ATTRS {
        for element in doc.select(selector).unwrap_or_default() {
            let Some(relative) = doc
                .attr(element, attr)
                .and_then(|value| value.strip_prefix(prefix))
                .map(str::to_string)
            else {
                continue;
            };
            doc.set_attr(element, attr, &relative);
            changed += 1;
        }
    }

    if changed == 0 {
        None
    } else {
        Some((doc.serialize(), changed))
    }
}

/// Finalizes every document of a job
///
/// # Errors
///
/// * `CloneError::NotFound` - the job directory does not exist
/// * `CloneError::Io` - a document could not be read or written
pub async fn finalize_site(layout: &SiteLayout) -> Result<FinalizeStats, CloneError> {
    if !tokio::fs::try_exists(layout.dir()).await.unwrap_or(false) {
        return Err(CloneError::NotFound(format!(
            "output directory {}",
            layout.dir().display()
        )));
    }

    let prefix = format!("{}/", layout.public_base());
    let mut stats = FinalizeStats::default();

    for path in html_files(layout).await? {
        stats.files_scanned += 1;
        let html = tokio::fs::read_to_string(&path).await?;

        if let Some((rewritten, changed)) = relativize_html(&html, &prefix) {
            tokio::fs::write(&path, rewritten).await?;
            stats.files_rewritten += 1;
            stats.references += changed;
            tracing::debug!(file = %path.display(), references = changed, "Relativized document");
        }
    }

    Ok(stats)
}

/// `.html` files directly inside the job directory, sorted by name
async fn html_files(layout: &SiteLayout) -> Result<Vec<PathBuf>, CloneError> {
    let mut entries = tokio::fs::read_dir(layout.dir()).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_html = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("html"));
        if is_html && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
