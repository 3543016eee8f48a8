//! Runtime core: the supervisor actor and its handle.
//!
//! The public API from this module is [`Supervisor`] (built by
//! [`SupervisorBuilder`]), its configuration and the state types it reports.
//!
//! Internal modules:
//! - [`actor`]: owns supervisor state, runs every transition one message at a time;
//! - [`watch`]: one exit-watch task per child (wait or kill + reap);
//! - [`scheduler`]: replaceable one-shot timers for scheduled and delayed crash restarts;
//! - [`supervisor`]: cloneable handle, command mailbox, subscriber listener;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod actor;
mod builder;
mod config;
mod launch;
mod scheduler;
mod shutdown;
mod state;
mod supervisor;
mod watch;

pub use builder::SupervisorBuilder;
pub use config::{DEFAULT_BASE_ARGS, SupervisorConfig};
pub use launch::LaunchSpec;
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
pub use state::{OnlineSnapshot, Snapshot, Status, StopOutcome};
pub use supervisor::Supervisor;
