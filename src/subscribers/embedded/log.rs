//! # LogWriter: events as tracing records
//!
//! Renders every [`Event`] as one `tracing` record under the `procvisor`
//! target. Crashes and failures log at `warn`/`error`, the rest at `info`
//! (subscriber bookkeeping at `debug`).
//!
//! ## Example output (compact format)
//! ```text
//! INFO procvisor: server started pid=4242 generation=1
//! INFO procvisor: auto-restart armed in_secs=3600
//! WARN procvisor: server crashed pid=4242 generation=1 crashes=1 status="exit status: 1"
//! INFO procvisor: restarting trigger=crash
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::ServerStarting => {
                info!(target: "procvisor", generation = e.generation, "starting server");
            }
            EventKind::ServerStarted => {
                info!(target: "procvisor", pid = e.pid, generation = e.generation, "server started");
            }
            EventKind::SpawnFailed => {
                error!(target: "procvisor", error = reason, "server failed to start");
            }
            EventKind::ServerStopping => {
                info!(target: "procvisor", pid = e.pid, generation = e.generation, "stopping server");
            }
            EventKind::ServerStopped => {
                info!(target: "procvisor", pid = e.pid, generation = e.generation, "server stopped");
            }
            EventKind::ServerCrashed => {
                warn!(
                    target: "procvisor",
                    pid = e.pid,
                    generation = e.generation,
                    crashes = e.crash_count,
                    status = reason,
                    "server crashed"
                );
            }
            EventKind::StaleExitIgnored => {
                debug!(target: "procvisor", generation = e.generation, "ignored exit of a replaced child");
            }
            EventKind::RestartRequested => {
                let trigger = e.trigger.map(|t| t.as_label()).unwrap_or("unknown");
                info!(target: "procvisor", trigger, "restarting");
            }
            EventKind::CrashRestartScheduled => {
                warn!(
                    target: "procvisor",
                    delay_ms = e.delay_ms,
                    streak = e.attempt,
                    "crash loop: delaying restart"
                );
            }
            EventKind::CrashRestartCancelled => {
                info!(target: "procvisor", "pending crash restart cancelled");
            }
            EventKind::ScheduleArmed => {
                let in_secs = e.delay().map(|d| d.as_secs());
                info!(target: "procvisor", in_secs, "auto-restart armed");
            }
            EventKind::ScheduleInvalid => {
                warn!(target: "procvisor", value = reason, "invalid hoursUntilRestart; auto-restart disabled");
            }
            EventKind::ScheduleChanged => match e.delay() {
                Some(d) => info!(target: "procvisor", every_secs = d.as_secs(), "auto-restart interval changed"),
                None => info!(target: "procvisor", "auto-restart disabled"),
            },
            EventKind::ShutdownRequested => {
                info!(target: "procvisor", "shutdown requested");
            }
            EventKind::SubscriberOverflow => {
                debug!(target: "procvisor", subscriber = e.subscriber, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "procvisor", subscriber = e.subscriber, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
