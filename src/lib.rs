//! # procvisor
//!
//! **procvisor** keeps one long-running dedicated server process alive.
//!
//! It starts the server, detects unexpected exits and restarts it (paced by
//! a crash backoff), restarts it on a configurable schedule, and accepts
//! operator commands (start, stop, restart, status) from an interactive
//! console while all of this is happening.
//!
//! ## Architecture
//! ```text
//!   CommandLoop (stdin)     OS signal handler
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────────────────────────────────┐
//! │ Supervisor (cloneable handle)                │
//! │  start / stop / restart / set_restart_hours  │
//! │  status() ◄── watch<Snapshot>                │
//! └──────┬───────────────────────────────────────┘
//!        │ mpsc<Command> + oneshot reply
//!        ▼
//! ┌──────────────────────────────────────────────┐        ┌──────────────┐
//! │ SupervisorActor (owns all state)             │◄───────│ exit-watch   │ Exited{gen}
//! │  child: Option<LiveChild>, crash_count, ...  │◄───────│ timers       │ ScheduledRestart / CrashRestartDue
//! └──────┬─────────────────────┬─────────────────┘        └──────────────┘
//!        │ Launcher::spawn     │ publish(Event)
//!        ▼                     ▼
//!   server process     Bus (broadcast) ──► SubscriberSet ──► LogWriter, user subscribers
//! ```
//!
//! ### Lifecycle
//! ```text
//! offline ── start ──► online(gen N) ── stop ──► offline
//!                         │
//!                         ├─ scheduled timer ─► restart ─► online(gen N+1)
//!                         ├─ operator restart ─► restart ─► online(gen N+1)
//!                         └─ process exits on its own (crash)
//!                               crash_count += 1
//!                               ├─ first crash of a streak ─► start now
//!                               └─ repeated crash ─► offline, restart after backoff
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                         |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | Lifecycle of one server process.                         | [`Supervisor`], [`SupervisorBuilder`]      |
//! | **Processes**     | Pluggable process spawning.                              | [`Launcher`], [`ChildProcess`]             |
//! | **Settings**      | Durable key/value settings.                              | [`ConfigStore`], [`FileStore`]             |
//! | **Subscriber API**| Hook into lifecycle events.                              | [`Subscribe`], [`Event`]                   |
//! | **Policies**      | Crash restart pacing.                                    | [`BackoffPolicy`], [`JitterPolicy`]        |
//! | **Console**       | Operator command loop.                                   | [`CommandLoop`], [`OperatorCommand`]       |
//! | **Errors**        | Typed errors.                                            | [`SupervisorError`], [`StoreError`]        |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use procvisor::{FileStore, LaunchSpec, SupervisorBuilder, SupervisorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(FileStore::open("procvisor.json")?);
//!     store_defaults(&store)?;
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn procvisor::Subscribe>> = vec![Arc::new(procvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn procvisor::Subscribe>> = Vec::new();
//!
//!     let launch = LaunchSpec::new("/srv/game/server", "-maxplayers 16");
//!     let sup = SupervisorBuilder::new(SupervisorConfig::default(), launch)
//!         .with_store(store)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     sup.start().await?;
//!     procvisor::wait_for_shutdown_signal().await?;
//!     sup.shutdown().await;
//!     Ok(())
//! }
//!
//! fn store_defaults(store: &FileStore) -> Result<(), procvisor::StoreError> {
//!     use procvisor::ConfigStore;
//!     store.set(procvisor::keys::HOURS_UNTIL_RESTART, "6")
//! }
//! ```

mod console;
mod core;
mod error;
mod events;
mod policies;
mod process;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use console::{
    CommandLoop, Console, EditTarget, OperatorCommand, ParseError, format_duration, status_lines,
};
pub use core::{
    DEFAULT_BASE_ARGS, LaunchSpec, OnlineSnapshot, Snapshot, Status, StopOutcome, Supervisor,
    ShutdownSignal, SupervisorBuilder, SupervisorConfig, wait_for_shutdown_signal,
};
pub use error::{StoreError, SupervisorError};
pub use events::{Bus, Event, EventKind, RestartTrigger};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use process::{ChildProcess, ExitStatus, Launcher, OsLauncher};
pub use store::{ConfigStore, FileStore, MemoryStore, RestartInterval, keys};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in logger subscriber.
// Disable with: `--no-default-features`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
