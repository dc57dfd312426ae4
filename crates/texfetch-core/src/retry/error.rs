//! Single-fetch error type for retry classification.

use std::fmt;

/// Error returned by one HTTP fetch attempt (transport failure, HTTP error,
/// or local write failure). Classified for retries before being converted
/// into the crate-level [`crate::Error`].
#[derive(Debug)]
pub enum FetchError {
    /// Connect or transfer timed out.
    Timeout(String),
    /// Connection refused, reset, DNS failure and the like.
    Connection(String),
    /// Any other transport failure (bad URL, TLS, protocol error).
    Transport(String),
    /// HTTP response status was not the expected one.
    Http(u32),
    /// 200 with no body where a payload file was expected.
    EmptyBody,
    /// Disk write failed while streaming the body. Not retried.
    Storage(std::io::Error),
    /// Cancellation token fired mid-flight.
    Cancelled,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout(m) => write!(f, "timeout: {}", m),
            FetchError::Connection(m) => write!(f, "connection: {}", m),
            FetchError::Transport(m) => write!(f, "{}", m),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::EmptyBody => write!(f, "empty response body"),
            FetchError::Storage(e) => write!(f, "storage: {}", e),
            FetchError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        super::classify_curl_error(&e)
    }
}
