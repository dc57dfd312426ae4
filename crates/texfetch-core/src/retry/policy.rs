//! Backoff schedule for transient download failures.

use std::time::Duration;

/// What went wrong, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    /// 429 / 503: the CDN wants us to back off.
    Throttled,
    /// Reset, refused, DNS.
    Connection,
    Http5xx(u16),
    /// Everything else, including 4xx and local disk errors. Never retried.
    Other,
}

impl FailureKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, FailureKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Doubling backoff from `base_delay`, capped at `max_delay`, for at most
/// `max_attempts` tries in total.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before attempt `attempt + 1`.
    fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }

    /// Decide after the 1-based `attempt` failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            RetryDecision::NoRetry
        } else {
            RetryDecision::RetryAfter(self.backoff(attempt))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, FailureKind::Timeout),
            RetryDecision::RetryAfter(Duration::from_millis(250))
        );
        assert_eq!(
            p.decide(2, FailureKind::Http5xx(502)),
            RetryDecision::RetryAfter(Duration::from_millis(500))
        );
        assert_eq!(p.decide(3, FailureKind::Throttled), RetryDecision::NoRetry);
    }

    #[test]
    fn permanent_failures_stop_immediately() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, FailureKind::Other), RetryDecision::NoRetry);
        assert_eq!(
            RetryPolicy::single_attempt().decide(1, FailureKind::Connection),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn backoff_is_capped() {
        let p = RetryPolicy {
            max_attempts: 40,
            ..RetryPolicy::default()
        };
        assert_eq!(
            p.decide(30, FailureKind::Timeout),
            RetryDecision::RetryAfter(p.max_delay)
        );
    }
}
