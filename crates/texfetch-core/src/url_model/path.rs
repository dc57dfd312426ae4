//! Filename, extension and query extraction from URLs.

/// Extracts the last path segment from a URL.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let path = parsed.path();
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Extension of the last path segment, including the leading dot (`".png"`).
/// Empty when the segment has no extension.
pub fn extension_from_url(url: &str) -> String {
    filename_from_url_path(url)
        .and_then(|name| {
            let (stem, ext) = name.rsplit_once('.')?;
            if stem.is_empty() || ext.is_empty() {
                return None;
            }
            Some(format!(".{}", ext))
        })
        .unwrap_or_default()
}

/// First value of the query parameter `key`.
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let value = parsed
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned());
    value
}
