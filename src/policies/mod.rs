//! Crash-restart pacing.
//!
//! The supervisor restarts a crashed server automatically. These knobs decide
//! **how long** to wait before doing so when the server keeps crashing.
//!
//! ## Contents
//! - [`BackoffPolicy`] how restart delays evolve over a crash streak (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization of the computed delay
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { crash_backoff: BackoffPolicy, stable_after: Duration, .. }
//!      └─► core actor on ServerCrashed:
//!           - streak = consecutive crashes (1 again after a stable run)
//!           - streak 1   → restart immediately
//!           - streak n>1 → arm CrashRestartDue after crash_backoff.next(n - 2)
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
