//! Retry policy for the clone step.
//!
//! The delay after attempt `n` (0-indexed) is `unit × backoff_base^n`.
//! With the default policy that is 1s, 2s, 4s.

use std::time::Duration;

/// What to do with a destination left behind by a failed clone attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Remove the destination before retrying if this run created it.
    /// A directory that existed before the first attempt is never touched.
    #[default]
    RemoveStale,
    /// Leave the destination as is and let git decide.
    Keep,
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Growth factor applied per attempt.
    pub backoff_base: f64,
    /// Duration of one backoff unit.
    pub unit: Duration,
    pub cleanup: CleanupPolicy,
}

impl Default for RetryPolicy {
    /// 3 attempts, base 2, one-second unit.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 2.0,
            unit: Duration::from_secs(1),
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Set the attempt bound. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Attempt bound, never below one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait applied after attempt `attempt` (0-indexed).
    ///
    /// Overflowing or negative results saturate to `Duration::MAX` and zero.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.unit.as_secs_f64() * self.backoff_base.powi(exp);

        if secs.is_nan() || secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        }
    }
}

/// Blocking wait capability used between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
