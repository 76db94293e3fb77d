//! Original URL to local document path mapping
//!
//! The map is planned once per job, before any subpage is rendered, and then
//! shared read-only by every rewrite.

use crate::url::{origin_and_path, page_filename, without_fragment};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Filename of the home document
pub const HOME_FILENAME: &str = "index.html";

/// A subpage scheduled for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPage {
    pub url: Url,
    pub filename: String,
}

/// Mapping from absolute original URLs (without fragment) to local paths
#[derive(Debug, Clone, Default)]
pub struct LinkMap {
    entries: HashMap<String, String>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans the local layout of a job
    ///
    /// The home page is registered under the raw request string, its parsed
    /// form and its `origin + path` form. Each candidate gets
    /// `sanitize(path) + ".html"`; a filename already taken gets a `-2`, `-3`,
    /// ... suffix so no document overwrites another.
    ///
    /// # Arguments
    ///
    /// * `raw_request` - The URL exactly as the caller submitted it
    /// * `home` - The parsed request URL
    /// * `candidates` - Subpage URLs in discovery order
    /// * `public_base` - Site-absolute directory of the job (`/cloned-sites/<subdomain>`)
    pub fn plan(
        raw_request: &str,
        home: &Url,
        candidates: &[Url],
        public_base: &str,
    ) -> (Self, Vec<PlannedPage>) {
        let mut map = Self::new();
        let home_path = public_path(public_base, HOME_FILENAME);

        map.insert_key(raw_request.trim().to_string(), home_path.clone());
        map.insert(home, home_path.clone());
        map.insert_key(origin_and_path(home), home_path);

        let mut taken: HashSet<String> = HashSet::new();
        taken.insert(HOME_FILENAME.to_string());

        let mut planned = Vec::with_capacity(candidates.len());
        for url in candidates {
            let filename = unique_filename(&page_filename(url), &mut taken);
            map.insert(url, public_path(public_base, &filename));
            planned.push(PlannedPage {
                url: url.clone(),
                filename,
            });
        }

        (map, planned)
    }

    /// Maps `url` (fragment ignored) to `local_path`
    pub fn insert(&mut self, url: &Url, local_path: String) {
        self.insert_key(without_fragment(url).to_string(), local_path);
    }

    fn insert_key(&mut self, key: String, local_path: String) {
        self.entries.entry(key).or_insert(local_path);
    }

    /// Local path for `url`, ignoring its fragment
    pub fn lookup(&self, url: &Url) -> Option<&str> {
        self.entries
            .get(without_fragment(url).as_str())
            .map(String::as_str)
    }

    /// Local path registered under a raw key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Site-absolute path of a file inside a job directory
pub fn public_path(public_base: &str, relative: &str) -> String {
    format!("{}/{}", public_base.trim_end_matches('/'), relative)
}

fn unique_filename(filename: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(filename.to_string()) {
        return filename.to_string();
    }

    let stem = filename.strip_suffix(".html").unwrap_or(filename);
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}.html", stem, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/cloned-sites/example-com-1";

    fn urls(list: &[&str]) -> Vec<Url> {
        list.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[test]
    fn test_home_keys() {
        let home = Url::parse("https://example.com?ref=ad").unwrap();
        let (map, planned) = LinkMap::plan("https://example.com?ref=ad", &home, &[], BASE);

        let expected = "/cloned-sites/example-com-1/index.html";
        assert!(planned.is_empty());
        assert_eq!(map.get("https://example.com?ref=ad"), Some(expected));
        assert_eq!(map.get("https://example.com/?ref=ad"), Some(expected));
        assert_eq!(map.get("https://example.com/"), Some(expected));
        assert_eq!(map.lookup(&home), Some(expected));
    }

    #[test]
    fn test_subpage_paths() {
        let home = Url::parse("https://example.com/").unwrap();
        let candidates = urls(&["https://example.com/about", "https://example.com/contact"]);
        let (map, planned) = LinkMap::plan("https://example.com", &home, &candidates, BASE);

        assert_eq!(
            planned.iter().map(|p| p.filename.as_str()).collect::<Vec<_>>(),
            vec!["_about.html", "_contact.html"]
        );
        assert_eq!(
            map.lookup(&candidates[0]),
            Some("/cloned-sites/example-com-1/_about.html")
        );
    }

    #[test]
    fn test_lookup_ignores_fragment() {
        let home = Url::parse("https://example.com/").unwrap();
        let candidates = urls(&["https://example.com/about"]);
        let (map, _) = LinkMap::plan("https://example.com/", &home, &candidates, BASE);

        let with_fragment = Url::parse("https://example.com/about#team").unwrap();
        assert_eq!(
            map.lookup(&with_fragment),
            Some("/cloned-sites/example-com-1/_about.html")
        );
    }

    #[test]
    fn test_filename_collisions_get_suffix() {
        let home = Url::parse("https://example.com/").unwrap();
        // "/about" and "/about." sanitize to the same token
        let candidates = urls(&[
            "https://example.com/about",
            "https://example.com/about.",
            "https://example.com/ab-out",
            "https://example.com/about?x",
        ]);
        let (_, planned) = LinkMap::plan("https://example.com/", &home, &candidates, BASE);

        assert_eq!(
            planned.iter().map(|p| p.filename.as_str()).collect::<Vec<_>>(),
            vec!["_about.html", "_about-2.html", "_ab-out.html", "_about-3.html"]
        );
    }

    #[test]
    fn test_unknown_url() {
        let home = Url::parse("https://example.com/").unwrap();
        let (map, _) = LinkMap::plan("https://example.com/", &home, &[], BASE);
        assert!(map.lookup(&Url::parse("https://other.com/").unwrap()).is_none());
    }

    #[test]
    fn test_public_path() {
        assert_eq!(public_path("/cloned-sites/x", "css/a.css"), "/cloned-sites/x/css/a.css");
        assert_eq!(public_path("/cloned-sites/x/", "index.html"), "/cloned-sites/x/index.html");
    }
}
