use url::Url;

/// Fallback token when a path sanitizes to nothing
const EMPTY_PATH_TOKEN: &str = "page";

/// Default extension for images whose URL carries none
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// Turns a URL path into a filesystem-safe token
///
/// `/` becomes `_`, then every character outside `[A-Za-z0-9_-]` is dropped.
/// An empty result becomes `page`.
///
/// ```
/// use site_cloner::url::sanitize_for_filename;
///
/// assert_eq!(sanitize_for_filename("/about"), "_about");
/// assert_eq!(sanitize_for_filename("/blog/post-1.html"), "_blog_post-1html");
/// assert_eq!(sanitize_for_filename("%%%"), "page");
/// ```
pub fn sanitize_for_filename(path: &str) -> String {
    let sanitized: String = path
        .chars()
        .map(|c| if c == '/' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if sanitized.is_empty() {
        EMPTY_PATH_TOKEN.to_string()
    } else {
        sanitized
    }
}

/// Local document filename for a subpage URL
pub fn page_filename(url: &Url) -> String {
    format!("{}.html", sanitize_for_filename(url.path()))
}

/// Extension (with the leading dot) of the last path segment of a URL
///
/// Only short alphanumeric extensions are accepted so that odd paths such as
/// `/image.php/12345` or `/photo.large-version` do not leak into filenames.
/// The result is lower-cased.
///
/// ```
/// use site_cloner::url::asset_extension;
/// use url::Url;
///
/// let url = Url::parse("https://cdn.example.com/img/Hero.PNG?w=800").unwrap();
/// assert_eq!(asset_extension(&url), Some(".png".to_string()));
/// ```
pub fn asset_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }

    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(format!(".{}", ext.to_ascii_lowercase()))
}
