//! Bounded polling for asynchronous remote jobs.
//!
//! Every other remote call in this crate is single-shot. This helper is the
//! one place a caller can bound worst-case wait time: it probes a closure
//! until it reports a terminal state, sleeping with capped exponential
//! backoff between attempts.

use std::time::Duration;

use thiserror::Error;

use crate::error::SdkError;

/// Backoff parameters for [`poll_until`].
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Maximum number of probe attempts before giving up.
    pub max_attempts: u32,
    /// Delay after the first attempt; doubles per attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl PollConfig {
    /// Delay to sleep after the given zero-based attempt:
    /// `min(base * 2^attempt, max)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.base_delay.saturating_mul(factor);
        delay.min(self.max_delay)
    }
}

/// Polling failure.
#[derive(Debug, Error)]
pub enum PollError {
    /// The job did not reach a terminal state within the attempt budget.
    #[error("remote job still pending after {attempts} attempts")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// A probe failed outright; not retried.
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

/// Probe `operation` until it returns `Ok(Some(_))` (terminal), sleeping
/// between attempts per `config`. `Ok(None)` means "still pending"; an `Err`
/// aborts immediately.
pub async fn poll_until<T, F, Fut>(config: PollConfig, operation: F) -> Result<T, PollError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>, SdkError>>,
{
    for attempt in 0..config.max_attempts {
        if let Some(value) = operation().await? {
            return Ok(value);
        }
        if attempt + 1 < config.max_attempts {
            let delay = config.delay_for_attempt(attempt);
            tracing::debug!(
                attempt = attempt + 1,
                max_attempts = config.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "remote job pending, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
    Err(PollError::Exhausted {
        attempts: config.max_attempts,
    })
}
