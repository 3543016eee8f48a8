//! # Jitter applied to crash-restart delays.
//!
//! [`JitterPolicy`] randomizes the delay computed by
//! [`BackoffPolicy`](crate::BackoffPolicy) so that a server which crashes on a
//! fixed external cadence (a cron job, a watchdog on another host) does not
//! lock step with it.
//!
//! - [`JitterPolicy::None`] exact delay (default)
//! - [`JitterPolicy::Full`] random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of crash-restart delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in `[0, delay]`.
    ///
    /// May restart almost immediately; use when spreading matters more than
    /// the floor.
    Full,

    /// Equal jitter: `delay/2 + random[0, delay/2]`.
    ///
    /// Keeps at least half of the computed delay.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rng.random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                Duration::from_millis(half + rng.random_range(0..=half))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(1234);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn test_zero_stays_zero() {
        for policy in [JitterPolicy::None, JitterPolicy::Full, JitterPolicy::Equal] {
            assert_eq!(policy.apply(Duration::ZERO), Duration::ZERO);
        }
    }

    #[test]
    fn test_full_within_bounds() {
        for _ in 0..100 {
            let d = JitterPolicy::Full.apply(Duration::from_secs(2));
            assert!(d <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_equal_keeps_half() {
        for _ in 0..100 {
            let d = JitterPolicy::Equal.apply(Duration::from_secs(2));
            assert!(d >= Duration::from_secs(1), "{d:?}");
            assert!(d <= Duration::from_secs(2), "{d:?}");
        }
    }
}
