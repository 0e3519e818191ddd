//! Retry with exponential backoff for the HTTP collaborators.
//!
//! Delay before attempt `k + 1` is `base_delay * 2^k`, or
//! `rate_limit_delay * 2^k` when the failed attempt was rate-limited.
//! There is no sleep after the final attempt.

use std::time::Duration;
use thiserror::Error;

/// Failure of one HTTP call to an upstream API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited (HTTP 429): {0}")]
    RateLimited(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimited(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Maps an HTTP status and body to the body on success or a classified error.
pub fn check_status(status: u16, body: String) -> Result<String, ApiError> {
    match status {
        429 => Err(ApiError::RateLimited(body)),
        200..=299 => Ok(body),
        _ => Err(ApiError::Status { status, body }),
    }
}

/// Attempt count and delays for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first (at least one is always made)
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl RetryPolicy {
    /// Wait before retrying after `attempt` (0-based) failed with `error`.
    pub fn delay_for(&self, attempt: u32, error: &ApiError) -> Duration {
        let base = if error.is_rate_limit() {
            self.rate_limit_delay
        } else {
            self.base_delay
        };
        base.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Runs `op` until it succeeds or the policy's attempts are used up.
///
/// `op` receives the 0-based attempt number. The last error is returned.
pub fn retry_with_backoff<T, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, ApiError>
where
    F: FnMut(u32) -> Result<T, ApiError>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let error = match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        crate::log(&format!(
            "{} failed (attempt {}/{}): {}",
            label,
            attempt + 1,
            attempts,
            error
        ));

        if attempt + 1 >= attempts {
            return Err(error);
        }

        let delay = policy.delay_for(attempt, &error);
        let reason = if error.is_rate_limit() {
            "Rate limited"
        } else if error.is_network() {
            "Network error"
        } else {
            "Retrying"
        };
        crate::log(&format!("{}, waiting {:.1}s before retry...", reason, delay.as_secs_f64()));
        std::thread::sleep(delay);

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
        }
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            rate_limit_delay: Duration::from_secs(5),
        };
        let err = server_error();
        assert_eq!(policy.delay_for(0, &err), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1, &err), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2, &err), Duration::from_secs(8));
    }

    #[test]
    fn test_rate_limit_delay_is_longer() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            rate_limit_delay: Duration::from_secs(5),
        };
        let err = ApiError::RateLimited(String::new());
        assert_eq!(policy.delay_for(0, &err), Duration::from_secs(5));
        assert_eq!(policy.delay_for(2, &err), Duration::from_secs(20));
    }

    #[test]
    fn test_succeeds_after_failures() {
        let mut calls = 0;
        let result = retry_with_backoff(&instant_policy(3), "test", |attempt| {
            calls += 1;
            if attempt < 2 { Err(server_error()) } else { Ok("done") }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_returns_last_error() {
        let mut calls = 0;
        let result: Result<(), ApiError> = retry_with_backoff(&instant_policy(3), "test", |attempt| {
            calls += 1;
            if attempt == 2 {
                Err(ApiError::RateLimited("slow down".to_string()))
            } else {
                Err(server_error())
            }
        });
        assert_eq!(calls, 3);
        assert!(result.unwrap_err().is_rate_limit());
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let mut calls = 0;
        let result: Result<(), ApiError> = retry_with_backoff(&instant_policy(0), "test", |_| {
            calls += 1;
            Err(server_error())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_check_status() {
        assert_eq!(check_status(200, "ok".to_string()).unwrap(), "ok");
        assert!(check_status(429, String::new()).unwrap_err().is_rate_limit());
        match check_status(503, "down".to_string()) {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
