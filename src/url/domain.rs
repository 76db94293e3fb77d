use chrono::Utc;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_cloner::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the output namespace for a clone job
///
/// The hostname loses one leading `www.` label, dots become hyphens, and the
/// creation timestamp (unix milliseconds) is appended. Any other character that
/// is not URL-safe is replaced with a hyphen. Inputs that are not absolute URLs
/// fall back to `site-<timestamp>`.
///
/// The result is a pure function of its inputs, so a fixed clock gives a fixed
/// subdomain.
///
/// # Examples
///
/// ```
/// use site_cloner::url::derive_subdomain;
///
/// assert_eq!(
///     derive_subdomain("https://www.example.co.uk/about", 1700000000000),
///     "example-co-uk-1700000000000"
/// );
/// assert_eq!(derive_subdomain("not a url", 42), "site-42");
/// ```
pub fn derive_subdomain(input: &str, timestamp_millis: i64) -> String {
    let host = Url::parse(input.trim())
        .ok()
        .as_ref()
        .and_then(extract_domain)
        .filter(|h| !h.is_empty());

    let Some(host) = host else {
        return format!("site-{}", timestamp_millis);
    };

    let host = host.strip_prefix("www.").unwrap_or(host.as_str());
    let token: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let token = token.trim_matches('-');

    if token.is_empty() {
        return format!("site-{}", timestamp_millis);
    }

    format!("{}-{}", token, timestamp_millis)
}

/// Derives a subdomain stamped with the current time
pub fn derive_subdomain_now(input: &str) -> String {
    derive_subdomain(input, Utc::now().timestamp_millis())
}
