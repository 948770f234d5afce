//! Bounded polling with exponential backoff.
//!
//! A bind-pending identity is created server-side by a group-membership call, but it
//! may not be visible to identity lookups straight away. This module polls an
//! idempotent lookup until it produces a value or the attempts run out. Errors are
//! never retried: a failed call ends the poll immediately.
//!
//! # Example
//!
//! ```rust,no_run
//! use devops_client::retry::{poll_until_found, RetryConfig};
//!
//! async fn example() -> Result<Option<String>, std::io::Error> {
//!     poll_until_found(&RetryConfig::fast(), || async {
//!         // An idempotent lookup that may not see the value yet
//!         Ok(Some("identity".to_string()))
//!     })
//!     .await
//! }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for polling behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Growth factor applied to the delay after each attempt
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Short delays, for tests and low-latency deployments.
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            exponential_base: 2.0,
        }
    }

    /// A single attempt with no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            exponential_base: 1.0,
        }
    }

    /// Delay slept after the failed attempt number `attempt` (1-based).
    ///
    /// Grows by `exponential_base` per attempt and never exceeds `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let initial = self.initial_delay.min(self.max_delay);
        if initial.is_zero() {
            return initial;
        }
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = (initial.as_secs_f64() * self.exponential_base.powi(exponent)).max(0.0);
        if secs.is_finite() && secs < self.max_delay.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max_delay
        }
    }
}

/// Call `f` until it yields `Some`, sleeping between attempts.
///
/// Returns `Ok(None)` when every attempt came back empty, and the first error
/// unchanged.
pub async fn poll_until_found<F, Fut, T, E>(config: &RetryConfig, mut f: F) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let max_attempts = config.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if let Some(found) = f().await? {
            if attempt > 1 {
                tracing::info!(attempts = attempt, "Lookup succeeded after polling");
            }
            return Ok(Some(found));
        }

        if attempt < max_attempts {
            let delay = config.delay_after(attempt);
            tracing::debug!(
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Nothing found yet, polling again"
            );
            sleep(delay).await;
        }
    }

    tracing::warn!(attempts = max_attempts, "Polling exhausted without a result");
    Ok(None)
}
