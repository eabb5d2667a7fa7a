//! Retry policy for the optimistic protocol
//!
//! A policy bounds how many conflicting attempts a caller tolerates and how
//! long to pause between them. `max_attempts: None` retries until a
//! conflict-free attempt, which under sustained contention may never come.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pause between conflicting attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately
    None,
    /// Constant pause
    Fixed {
        /// Pause in milliseconds
        delay_ms: u64,
    },
    /// Doubling pause, capped
    Exponential {
        /// Pause after the first conflict, in milliseconds
        base_ms: u64,
        /// Upper bound on any pause, in milliseconds
        max_ms: u64,
    },
}

impl Backoff {
    /// Pause to take after the `conflicts`-th conflict (1-based), before jitter
    pub fn delay(&self, conflicts: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Backoff::Exponential { base_ms, max_ms } => {
                let shift = conflicts.saturating_sub(1).min(32);
                let ms = base_ms.saturating_mul(1u64 << shift).min(max_ms);
                Duration::from_millis(ms)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            base_ms: 1,
            max_ms: 32,
        }
    }
}

/// How many attempts to make and how to pace them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts allowed in total (`None` for unbounded). Values below 1 act as 1.
    pub max_attempts: Option<u32>,
    /// Pause between conflicting attempts
    pub backoff: Backoff,
    /// Randomize each pause between half and all of its nominal length
    pub jitter: bool,
}

/// Attempts allowed by [`RetryPolicy::default`]
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

impl RetryPolicy {
    /// Bounded policy with the default backoff
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            ..Self::default()
        }
    }

    /// Retry until an attempt commits or aborts
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            ..Self::default()
        }
    }

    /// One attempt, give up on the first conflict
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: Some(1),
            backoff: Backoff::None,
            jitter: false,
        }
    }

    /// Replace the backoff
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Check if another attempt is allowed after `attempts` have been made
    pub fn allows_retry_after(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts < max.max(1),
            None => true,
        }
    }

    /// Pause to take after the `conflicts`-th conflict, jitter included
    pub fn pause_for(&self, conflicts: u32) -> Duration {
        let nominal = self.backoff.delay(conflicts);
        if !self.jitter || nominal.is_zero() {
            return nominal;
        }
        let half = nominal / 2;
        let spread = nominal.as_micros().saturating_sub(half.as_micros()) as u64;
        half + Duration::from_micros(rand::thread_rng().gen_range(0..=spread))
    }

    /// Sleep for [`RetryPolicy::pause_for`]
    pub fn pause(&self, conflicts: u32) {
        let pause = self.pause_for(conflicts);
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            backoff: Backoff::default(),
            jitter: true,
        }
    }
}
