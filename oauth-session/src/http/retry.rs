//! Backoff policy for token and user-info requests.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

/// Doubling backoff with a per-delay cap and an overall time budget.
///
/// The user is waiting on the provider callback while these retries run, so
/// retrying stops once `max_elapsed` has passed since the first attempt, even if
/// retries remain.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    max_elapsed: Duration,
}

impl BackoffPolicy {
    /// One second base delay, one minute cap, two minute budget.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_elapsed: Duration::from_secs(120),
        }
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    fn delay_for(&self, n_past_retries: u32) -> Duration {
        self.base_delay
            .checked_mul(1_u32.checked_shl(n_past_retries).unwrap_or(u32::MAX))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    fn out_of_budget(&self, request_start_time: SystemTime, next_delay: Duration) -> bool {
        // A clock that went backwards counts as no time spent
        let spent = request_start_time.elapsed().unwrap_or_default();
        spent + next_delay > self.max_elapsed
    }
}

impl RetryPolicy for BackoffPolicy {
    fn should_retry(&self, request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }

        let delay = self.delay_for(n_past_retries);
        if self.out_of_budget(request_start_time, delay) {
            return RetryDecision::DoNotRetry;
        }

        RetryDecision::Retry {
            execute_after: SystemTime::now() + delay,
        }
    }
}
