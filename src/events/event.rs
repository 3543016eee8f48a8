//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Lifecycle events**: the server process flow (starting, started, stopping, stopped, crashed)
//! - **Restart events**: why a restart happens (manual, scheduled, crash backoff)
//! - **Schedule events**: arming and disabling of the periodic restart timer
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as timestamps, pid,
//! child generation, crash counter and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServerCrashed)
//!     .with_pid(4242)
//!     .with_generation(3)
//!     .with_crash_count(1)
//!     .with_reason("exit status: 1");
//!
//! assert_eq!(ev.kind, EventKind::ServerCrashed);
//! assert_eq!(ev.pid, Some(4242));
//! assert_eq!(ev.reason.as_deref(), Some("exit status: 1"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Server lifecycle events ===
    /// A server process is about to be spawned.
    ///
    /// Sets:
    /// - `generation`: generation the new child will carry
    ServerStarting,

    /// The server process was spawned and is being watched.
    ///
    /// Sets:
    /// - `pid`: OS process id
    /// - `generation`: child generation
    ServerStarted,

    /// Spawning the server process failed; the supervisor stays offline.
    ///
    /// Sets:
    /// - `reason`: OS error
    SpawnFailed,

    /// An intentional stop is in progress (the exit will not count as a crash).
    ///
    /// Sets:
    /// - `pid`, `generation`
    ServerStopping,

    /// The server process was killed and reaped.
    ///
    /// Sets:
    /// - `pid`, `generation`
    ServerStopped,

    /// The server process exited on its own.
    ///
    /// Sets:
    /// - `pid`, `generation`
    /// - `crash_count`: crash counter after the increment
    /// - `reason`: exit status
    ServerCrashed,

    /// An exit notification arrived for a child that is no longer current.
    ///
    /// Sets:
    /// - `generation`: generation of the exited child
    StaleExitIgnored,

    // === Restart events ===
    /// A restart (stop + start) begins.
    ///
    /// Sets:
    /// - `trigger`: manual, scheduled or crash
    RestartRequested,

    /// A crash restart is delayed by the crash backoff.
    ///
    /// Sets:
    /// - `delay_ms`: delay before the restart
    /// - `attempt`: consecutive crash count (crash streak)
    CrashRestartScheduled,

    /// A pending crash restart was cancelled by an operator start/stop.
    CrashRestartCancelled,

    // === Schedule events ===
    /// The periodic restart timer was armed.
    ///
    /// Sets:
    /// - `delay_ms`: time until the scheduled restart
    ScheduleArmed,

    /// The stored restart interval is not a valid integer; scheduling is disabled.
    ///
    /// Sets:
    /// - `reason`: offending value
    ScheduleInvalid,

    /// The restart interval setting changed.
    ///
    /// Sets:
    /// - `delay_ms`: new interval (absent when disabled)
    ScheduleChanged,

    // === Runtime events ===
    /// Shutdown requested (OS signal observed or explicit call).
    ShutdownRequested,
}

/// What caused a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartTrigger {
    /// Operator command.
    Manual,
    /// Periodic restart timer fired.
    Scheduled,
    /// The child exited on its own.
    Crash,
}

impl RestartTrigger {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RestartTrigger::Manual => "manual",
            RestartTrigger::Scheduled => "scheduled",
            RestartTrigger::Crash => "crash",
        }
    }
}

impl fmt::Display for RestartTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// OS process id of the child, if applicable.
    pub pid: Option<u32>,
    /// Child generation (1-based, increments on every spawn).
    pub generation: Option<u64>,
    /// Crash counter value.
    pub crash_count: Option<u64>,
    /// Delay in milliseconds (backoff or schedule).
    pub delay_ms: Option<u64>,
    /// Attempt or streak counter.
    pub attempt: Option<u32>,
    /// Restart trigger.
    pub trigger: Option<RestartTrigger>,
    /// Subscriber name (subscriber events only).
    pub subscriber: Option<&'static str>,
    /// Human-readable reason (errors, exit status, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pid: None,
            generation: None,
            crash_count: None,
            delay_ms: None,
            attempt: None,
            trigger: None,
            subscriber: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the child pid.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches the child generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches the crash counter.
    #[inline]
    pub fn with_crash_count(mut self, n: u64) -> Self {
        self.crash_count = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches an attempt/streak counter.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches the restart trigger.
    #[inline]
    pub fn with_trigger(mut self, trigger: RestartTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Returns the delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }
}
