//! Internal link remapping

use crate::crawler::LinkMap;
use crate::document::Document;
use crate::url::{resolve_reference, without_fragment};
use url::Url;

/// Prefixes of anchors that never point at a clonable page
const SKIPPED_PREFIXES: &[&str] = &["#", "mailto:", "tel:", "javascript:"];

/// Points every anchor that targets a mapped page at its local document
///
/// Fragments survive: `/about#team` becomes `<local>/_about.html#team`.
/// Unmapped links, including every external one, are left untouched.
///
/// # Returns
///
/// The number of anchors rewritten
pub fn remap_links(doc: &mut Document, page_url: &Url, link_map: &LinkMap) -> usize {
    let mut rewritten = 0;

    for anchor in doc.select("a[href]").unwrap_or_default() {
        let Some(href) = doc.attr(anchor, "href") else {
            continue;
        };
        if is_skipped(href) {
            continue;
        }
        let Some(resolved) = resolve_reference(href, page_url) else {
            continue;
        };
        let Some(local) = link_map.lookup(&without_fragment(&resolved)) else {
            continue;
        };

        let target = match resolved.fragment() {
            Some(fragment) if !fragment.is_empty() => format!("{}#{}", local, fragment),
            _ => local.to_string(),
        };
        doc.set_attr(anchor, "href", &target);
        rewritten += 1;
    }

    rewritten
}

fn is_skipped(href: &str) -> bool {
    let href = href.trim();
    href.is_empty()
        || SKIPPED_PREFIXES.iter().any(|prefix| {
            href.get(..prefix.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
        })
}
