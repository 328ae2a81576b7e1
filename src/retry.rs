//! Retry Module
//!
//! Runs an async operation with bounded retries and capped exponential backoff.
//! Any error is treated as retryable; the last error is returned unchanged once
//! every attempt has failed.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

/// Default retry configuration
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

// == Retry Policy ==
/// Immutable retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Creates a policy from millisecond values.
    pub fn from_millis(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self::new(
            max_attempts,
            Duration::from_millis(base_delay_ms),
            Duration::from_millis(max_delay_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait after the failed `attempt` (1-based) before the next one.
    ///
    /// `min(base_delay * 2^(attempt-1), max_delay)`, so the first retry waits
    /// exactly `base_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

// == Retry Executor ==
/// Applies one [`RetryPolicy`] to any number of operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` until it succeeds or the policy's attempts are used up.
    ///
    /// `label` only names the operation in log output.
    pub async fn run<T, E, F, Fut>(&self, label: &str, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        with_retry(self.policy, label, operation).await
    }
}

/// Executes an async operation with retry logic.
///
/// # Example
/// ```ignore
/// let users = with_retry(RetryPolicy::default(), "Random User API", || async {
///     client.fetch_json::<UsersResponse>(&url).await
/// })
/// .await?;
/// ```
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, label: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        if attempt > 1 {
            info!("{} - retry attempt {} of {}", label, attempt, max_attempts);
        }

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) => {
                warn!("{} failed on attempt {}: {}", label, attempt, e);

                if attempt >= max_attempts {
                    error!("{} failed after {} attempts", label, max_attempts);
                    return Err(e);
                }

                let delay = policy.delay_after(attempt);
                info!("Waiting {:?} before retrying {}", delay, label);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
