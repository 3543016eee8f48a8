//! # Exit-watch task for one child.
//!
//! Every spawned child gets exactly one watch task. It owns the process
//! handle, so `wait` and `kill` never race on two owners.
//!
//! ```text
//! watch_exit(child, gen, cancel)
//!   select! {
//!     cancel.cancelled() ─► kill + reap ─► WatchEnd::Killed
//!     child.wait()       ─► Notice::Exited { gen, status } ─► WatchEnd::Exited
//!   }
//! ```
//! Cancellation is polled first, so once the actor has started a stop, the
//! task never reports that child's exit as a notice.

use std::io;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::actor::Notice;
use crate::process::ChildProcess;

/// How the watch task finished.
#[derive(Debug)]
pub(crate) enum WatchEnd {
    /// The child exited on its own and a notice was posted.
    Exited,
    /// The actor cancelled the watch; carries the kill result.
    Killed(io::Result<()>),
}

/// Waits for the child to exit or for `cancel`, whichever comes first.
pub(crate) async fn watch_exit(
    mut child: Box<dyn ChildProcess>,
    generation: u64,
    cancel: CancellationToken,
    notices: mpsc::UnboundedSender<Notice>,
) -> WatchEnd {
    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        status = child.wait() => Some(status),
    };

    match status {
        Some(status) => {
            let _ = notices.send(Notice::Exited { generation, status });
            WatchEnd::Exited
        }
        None => WatchEnd::Killed(child.kill().await),
    }
}
