//! # Backoff policy for crash restarts.
//!
//! [`BackoffPolicy`] controls how the delay before an automatic restart grows
//! while the server keeps crashing. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first crash of a streak;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for streak index `n` (0 = first crash) is `first × factor^n`,
//! clamped to `max`, then jitter is applied. The base is derived purely from
//! the index, so jitter never feeds back into later delays.
//!
//! A zero `first` disables pacing altogether ([`BackoffPolicy::immediate`]).
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_secs(1),
//!     max: Duration::from_secs(60),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_secs(1));
//! assert_eq!(backoff.next(3), Duration::from_secs(8));
//! assert_eq!(backoff.next(10), Duration::from_secs(60));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Crash-restart backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first crash of a streak (`0` = restart immediately).
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 1s`;
    /// - `factor = 2.0`;
    /// - `max = 60s`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(60),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// A policy that always restarts immediately.
    pub const fn immediate() -> Self {
        Self {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay for the given streak index (0-indexed).
    ///
    /// # Notes
    /// - Non-finite or negative intermediate values clamp to `max`.
    /// - `factor == 1.0` keeps the delay constant at `first` (up to `max`).
    pub fn next(&self, index: u32) -> Duration {
        if self.first.is_zero() {
            return Duration::ZERO;
        }
        let max_secs = self.max.as_secs_f64();
        let exp = index.min(i32::MAX as u32) as i32;
        let unclamped = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !unclamped.is_finite() || unclamped < 0.0 || unclamped > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(unclamped)
        };
        self.jitter.apply(base)
    }
}
