//! # Supervisor runtime configuration.
//!
//! Provides [`SupervisorConfig`], the settings that do not live in the
//! durable [`ConfigStore`](crate::ConfigStore): launch flags, the length of
//! one scheduling "hour", crash pacing and channel sizes.
//!
//! ## Sentinel values
//! - `crash_backoff.first = 0s` → crash restarts are never delayed
//! - `stable_after = 0s` → every crash starts a new streak (backoff never grows)

use std::time::Duration;

use crate::core::launch::LaunchSpec;
use crate::policies::BackoffPolicy;

/// Flags the dedicated server always needs, placed before the stored extra parameters.
pub const DEFAULT_BASE_ARGS: &[&str] = &["-console", "-game", "ship", "-port", "27016", "-steam"];

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `base_args`: fixed launch flags (before the stored parameters)
/// - `hour`: length of one unit of `hoursUntilRestart` (shortened in tests)
/// - `crash_backoff`: delay before restarting after repeated crashes
/// - `stable_after`: run time after which a crash no longer extends the streak
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `mailbox_capacity`: pending operator commands (min 1)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Fixed launch flags, placed before the stored extra parameters.
    pub base_args: Vec<String>,

    /// Length of one scheduled-restart hour.
    pub hour: Duration,

    /// Pacing for automatic restarts after consecutive crashes.
    ///
    /// The first crash of a streak restarts immediately; the `n`-th consecutive
    /// crash (`n >= 2`) waits `crash_backoff.next(n - 2)`.
    pub crash_backoff: BackoffPolicy,

    /// A child that ran at least this long before crashing resets the crash streak.
    pub stable_after: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Capacity of the command mailbox between handles and the actor.
    pub mailbox_capacity: usize,
}

impl SupervisorConfig {
    /// Builds the full argument list for a launch.
    pub fn launch_args(&self, launch: &LaunchSpec) -> Vec<String> {
        self.base_args
            .iter()
            .cloned()
            .chain(launch.params())
            .collect()
    }

    /// Converts a stored hour count into a timer interval.
    ///
    /// Returns `None` for zero or when the interval does not fit a `Duration`.
    pub fn schedule_interval(&self, hours: u64) -> Option<Duration> {
        let hours = u32::try_from(hours).ok().filter(|h| *h > 0)?;
        self.hour.checked_mul(hours)
    }

    /// Delay before the automatic restart following the `streak`-th consecutive crash.
    pub fn crash_delay(&self, streak: u32) -> Duration {
        match streak {
            0 | 1 => Duration::ZERO,
            n => self.crash_backoff.next(n - 2),
        }
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Mailbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn mailbox_capacity_clamped(&self) -> usize {
        self.mailbox_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `base_args = DEFAULT_BASE_ARGS`
    /// - `hour = 3600s`
    /// - `crash_backoff = BackoffPolicy::default()` (1s doubling, capped at 60s)
    /// - `stable_after = 60s`
    /// - `bus_capacity = 1024`
    /// - `mailbox_capacity = 32`
    fn default() -> Self {
        Self {
            base_args: DEFAULT_BASE_ARGS.iter().map(|s| s.to_string()).collect(),
            hour: Duration::from_secs(60 * 60),
            crash_backoff: BackoffPolicy::default(),
            stable_after: Duration::from_secs(60),
            bus_capacity: 1024,
            mailbox_capacity: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_put_base_flags_first() {
        let cfg = SupervisorConfig::default();
        let launch = LaunchSpec::new("/srv/server", "+maxplayers 16");
        let args = cfg.launch_args(&launch);
        assert_eq!(&args[..6], ["-console", "-game", "ship", "-port", "27016", "-steam"]);
        assert_eq!(&args[6..], ["+maxplayers", "16"]);
    }

    #[test]
    fn test_schedule_interval() {
        let cfg = SupervisorConfig {
            hour: Duration::from_millis(10),
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.schedule_interval(0), None);
        assert_eq!(cfg.schedule_interval(3), Some(Duration::from_millis(30)));
        assert_eq!(cfg.schedule_interval(u64::MAX), None);
        assert_eq!(
            SupervisorConfig::default().schedule_interval(2),
            Some(Duration::from_secs(7200))
        );
    }

    #[test]
    fn test_first_crash_of_a_streak_is_immediate() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.crash_delay(1), Duration::ZERO);
        assert_eq!(cfg.crash_delay(2), Duration::from_secs(1));
        assert_eq!(cfg.crash_delay(3), Duration::from_secs(2));
        assert_eq!(cfg.crash_delay(40), Duration::from_secs(60));
    }

    #[test]
    fn test_immediate_backoff_never_delays() {
        let cfg = SupervisorConfig {
            crash_backoff: BackoffPolicy::immediate(),
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.crash_delay(10), Duration::ZERO);
    }
}
