//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::CancelToken;

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// A fired `cancel` token ends the loop with `FetchError::Cancelled`.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!("attempt {} failed ({}), retrying in {:?}", attempt, e, d);
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
