//! # Observable supervisor state.
//!
//! The actor owns the mutable state; everybody else sees it through
//! [`Snapshot`]s published on a `tokio::sync::watch` channel at the end of
//! every transition. A snapshot is therefore never torn: `Online` always
//! describes a child that was live when the transition finished.
//!
//! [`Status`] is the operator-facing view of a snapshot with durations
//! computed at read time.

use std::time::{Duration, SystemTime};

use tokio::time::Instant;

/// Details of the live child in an [`Snapshot::Online`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnlineSnapshot {
    /// OS process id.
    pub pid: u32,
    /// Child generation (1-based, increments on every spawn).
    pub generation: u64,
    /// Wall-clock spawn time.
    pub up_since: SystemTime,
    /// Monotonic spawn time (uptime base).
    pub started: Instant,
    /// Crash counter.
    pub crash_count: u64,
    /// Hours between scheduled restarts, when the schedule is armed.
    pub restart_hours: Option<u64>,
    /// When the scheduled restart fires.
    pub next_restart: Option<Instant>,
}

/// State published after every transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Snapshot {
    /// No live child.
    Offline {
        /// Crash counter.
        crash_count: u64,
        /// When a backoff-delayed crash restart fires, if one is pending.
        restart_pending: Option<Instant>,
    },
    /// A child is live.
    Online(OnlineSnapshot),
}

impl Snapshot {
    /// Initial state: offline, no crashes.
    pub(crate) fn initial() -> Self {
        Snapshot::Offline {
            crash_count: 0,
            restart_pending: None,
        }
    }

    /// True when a child is live.
    pub fn is_online(&self) -> bool {
        matches!(self, Snapshot::Online(_))
    }

    /// Crash counter.
    pub fn crash_count(&self) -> u64 {
        match self {
            Snapshot::Offline { crash_count, .. } => *crash_count,
            Snapshot::Online(o) => o.crash_count,
        }
    }

    /// Generation of the live child.
    pub fn generation(&self) -> Option<u64> {
        match self {
            Snapshot::Online(o) => Some(o.generation),
            Snapshot::Offline { .. } => None,
        }
    }

    /// Pid of the live child.
    pub fn pid(&self) -> Option<u32> {
        match self {
            Snapshot::Online(o) => Some(o.pid),
            Snapshot::Offline { .. } => None,
        }
    }

    /// Converts to a [`Status`] relative to `now`.
    pub fn status_at(&self, now: Instant) -> Status {
        match self {
            Snapshot::Offline {
                crash_count,
                restart_pending,
            } => Status::Offline {
                crash_count: *crash_count,
                restart_pending_in: restart_pending.map(|at| at.saturating_duration_since(now)),
            },
            Snapshot::Online(o) => Status::Online {
                pid: o.pid,
                generation: o.generation,
                up_since: o.up_since,
                uptime: now.saturating_duration_since(o.started),
                crash_count: o.crash_count,
                restart_hours: o.restart_hours,
                next_restart_in: o.next_restart.map(|at| at.saturating_duration_since(now)),
            },
        }
    }
}

/// Operator-facing status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// No live child.
    Offline {
        /// Crash counter.
        crash_count: u64,
        /// Time left before a backoff-delayed crash restart, if one is pending.
        restart_pending_in: Option<Duration>,
    },
    /// A child is live.
    Online {
        /// OS process id.
        pid: u32,
        /// Child generation.
        generation: u64,
        /// Wall-clock spawn time.
        up_since: SystemTime,
        /// Time since spawn.
        uptime: Duration,
        /// Crash counter.
        crash_count: u64,
        /// Hours between scheduled restarts, when armed.
        restart_hours: Option<u64>,
        /// Time left before the scheduled restart, when armed.
        next_restart_in: Option<Duration>,
    },
}

impl Status {
    /// True when a child is live.
    pub fn is_online(&self) -> bool {
        matches!(self, Status::Online { .. })
    }

    /// Crash counter.
    pub fn crash_count(&self) -> u64 {
        match self {
            Status::Offline { crash_count, .. } | Status::Online { crash_count, .. } => *crash_count,
        }
    }
}

/// Result of a stop request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The live child was killed and reaped.
    Stopped {
        /// Pid of the stopped child.
        pid: u32,
    },
    /// Nothing was running but a delayed crash restart was pending; it was cancelled.
    CancelledRestart,
    /// Nothing was running; no state changed.
    NotRunning,
}
