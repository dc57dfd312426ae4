//! Error type shared by every component of the resolution pipeline.
//!
//! Provider failures are recovered at the scraper boundary into one of these
//! variants; the session records the first one and short-circuits afterwards.

use std::path::PathBuf;
use std::sync::Arc;

/// Failure categories, without payload. Handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedSource,
    Network,
    InvalidVariantIndex,
    ApiShape,
    LocalIo,
    Cancelled,
    NoVariants,
    Archive,
    SessionFinished,
    NoSource,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No registered provider claims the URL for the requested category.
    #[error("No scraper can handle this URL")]
    UnsupportedSource,

    /// Non-200 response or transport-level failure (timeout, refused, TLS).
    #[error("cannot fetch {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid variant index: {index}")]
    InvalidVariantIndex { index: isize, len: usize },

    /// The remote API answered, but not with the fields we expected.
    #[error("API error at {url}: {detail}")]
    ApiShape { url: String, detail: String },

    #[error("I/O error at {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("no variant available for this asset")]
    NoVariants,

    #[error("cannot extract {}: {detail}", path.display())]
    Archive { path: PathBuf, detail: String },

    #[error("a variant was already selected in this session")]
    SessionFinished,

    #[error("No source given")]
    NoSource,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedSource => ErrorKind::UnsupportedSource,
            Error::Network { .. } => ErrorKind::Network,
            Error::InvalidVariantIndex { .. } => ErrorKind::InvalidVariantIndex,
            Error::ApiShape { .. } => ErrorKind::ApiShape,
            Error::LocalIo { .. } => ErrorKind::LocalIo,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::NoVariants => ErrorKind::NoVariants,
            Error::Archive { .. } => ErrorKind::Archive,
            Error::SessionFinished => ErrorKind::SessionFinished,
            Error::NoSource => ErrorKind::NoSource,
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LocalIo {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn api_shape(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::ApiShape {
            url: url.into(),
            detail: detail.into(),
        }
    }

    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_source_message_is_stable() {
        assert_eq!(
            Error::UnsupportedSource.to_string(),
            "No scraper can handle this URL"
        );
    }

    #[test]
    fn invalid_index_mentions_index() {
        let e = Error::InvalidVariantIndex { index: -1, len: 2 };
        assert_eq!(e.to_string(), "Invalid variant index: -1");
        assert_eq!(e.kind(), ErrorKind::InvalidVariantIndex);
    }

    #[test]
    fn network_message_names_url_and_cause() {
        let e = Error::network("https://cdn.example/a.exr", "timeout: Operation timed out");
        assert_eq!(
            e.to_string(),
            "cannot fetch https://cdn.example/a.exr: timeout: Operation timed out"
        );
        let e = Error::network("https://cdn.example/a.exr", "HTTP 404");
        assert!(!e.to_string().contains("not found"));
    }

    #[test]
    fn io_error_is_cloneable() {
        let e = Error::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let e2 = e.clone();
        assert_eq!(e2.kind(), ErrorKind::LocalIo);
        assert!(e2.to_string().contains("/tmp/x"));
    }
}
