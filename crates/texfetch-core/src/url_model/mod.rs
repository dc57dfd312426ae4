//! URL normalisation and cache path derivation.
//!
//! Provider URLs are often pasted without a scheme; payload file extensions
//! and cache directory names are derived from URL paths and variant labels.

mod path;
mod sanitize;

pub use path::{extension_from_url, filename_from_url_path, query_param};
pub use sanitize::sanitize_path_component;

/// Prepends `https://` when the URL carries no scheme.
///
/// # Examples
///
/// - `normalize_url("polyhaven.com/a/rocks")` → `"https://polyhaven.com/a/rocks"`
/// - `normalize_url("http://example.com/x")` → unchanged
pub fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_matches('"');
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url.trim_start_matches('/'))
    }
}

/// Parse after `normalize_url`; `None` for anything `url` rejects.
pub fn parse_loose(url: &str) -> Option<url::Url> {
    url::Url::parse(&normalize_url(url)).ok()
}

/// True when the host is `domain` or `www.<domain>`.
pub fn host_is(url: &url::Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => host == domain || host.strip_prefix("www.") == Some(domain),
        None => false,
    }
}
