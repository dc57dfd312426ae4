//! Classify HTTP status and curl errors into retry policy failure kinds.

use super::error::FetchError;
use super::policy::FailureKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> FailureKind {
    match code {
        429 | 503 => FailureKind::Throttled,
        500..=599 => FailureKind::Http5xx(code as u16),
        _ => FailureKind::Other,
    }
}

/// Map a curl error onto the transport-level `FetchError` variants.
pub fn classify_curl_error(e: &curl::Error) -> FetchError {
    if e.is_operation_timedout() {
        return FetchError::Timeout(e.to_string());
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FetchError::Connection(e.to_string());
    }
    FetchError::Transport(e.to_string())
}

/// Classify a fetch error into a FailureKind.
pub fn classify(e: &FetchError) -> FailureKind {
    match e {
        FetchError::Timeout(_) => FailureKind::Timeout,
        FetchError::Connection(_) => FailureKind::Connection,
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Transport(_)
        | FetchError::EmptyBody
        | FetchError::Storage(_)
        | FetchError::Cancelled => FailureKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_and_503_throttled() {
        assert_eq!(classify_http_status(429), FailureKind::Throttled);
        assert_eq!(classify_http_status(503), FailureKind::Throttled);
    }

    #[test]
    fn http_5xx_retryable() {
        assert!(matches!(classify_http_status(500), FailureKind::Http5xx(500)));
        assert!(matches!(classify_http_status(502), FailureKind::Http5xx(502)));
    }

    #[test]
    fn http_4xx_other() {
        assert_eq!(classify_http_status(404), FailureKind::Other);
        assert_eq!(classify_http_status(403), FailureKind::Other);
    }

    #[test]
    fn storage_and_cancel_not_retried() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(classify(&FetchError::Storage(io)), FailureKind::Other);
        assert_eq!(classify(&FetchError::Cancelled), FailureKind::Other);
        assert_eq!(
            classify(&FetchError::Timeout("slow".into())),
            FailureKind::Timeout
        );
    }
}
