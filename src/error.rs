//! Error types used by the procvisor runtime.
//!
//! This module defines two enums:
//!
//! - [`SupervisorError`] errors returned by supervisor operations (start, stop, restart).
//! - [`StoreError`] errors raised by a [`ConfigStore`](crate::ConfigStore) backend.
//!
//! Both types provide `as_label` for logs. Crash exits of the child are **not**
//! errors: they are reported as [`EventKind::ServerCrashed`](crate::EventKind::ServerCrashed)
//! events and recovered automatically.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by supervisor operations.
///
/// All of them are local to the failed operation; none of them stops the
/// supervisor itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The OS refused to launch the server executable (missing file, permissions, ...).
    #[error("failed to spawn {path:?}: {source}")]
    SpawnFailed {
        /// Executable that was being launched.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A server process is already live; a second one is never started.
    #[error("server is already running (pid {pid})")]
    AlreadyRunning {
        /// Pid of the live child.
        pid: u32,
    },

    /// Persisting a setting failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The supervisor actor has shut down and no longer accepts commands.
    #[error("supervisor is shut down")]
    Closed,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use procvisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::Closed.as_label(), "supervisor_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::SpawnFailed { .. } => "supervisor_spawn_failed",
            SupervisorError::AlreadyRunning { .. } => "supervisor_already_running",
            SupervisorError::Store(e) => e.as_label(),
            SupervisorError::Closed => "supervisor_closed",
        }
    }
}

/// # Errors produced by a configuration store.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store i/o error on {path:?}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but is not a flat JSON object of strings.
    #[error("store file {path:?} is corrupt: {source}")]
    Parse {
        /// Backing file.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "store_io",
            StoreError::Parse { .. } => "store_parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failed_message_names_path() {
        let err = SupervisorError::SpawnFailed {
            path: PathBuf::from("/srv/missing.exe"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.exe"), "{msg}");
        assert_eq!(err.as_label(), "supervisor_spawn_failed");
    }

    #[test]
    fn test_store_label_is_forwarded() {
        let err = SupervisorError::from(StoreError::Io {
            path: PathBuf::from("x.json"),
            source: io::Error::other("disk full"),
        });
        assert_eq!(err.as_label(), "store_io");
    }
}
