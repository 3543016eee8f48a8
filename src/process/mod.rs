//! # Child process abstraction.
//!
//! The supervisor never touches `tokio::process` directly; it goes through
//! [`Launcher`] and [`ChildProcess`] so that tests can script crashes and
//! spawn failures.
//!
//! ## Contract
//! ```text
//! Launcher::spawn(path, args) ──► Box<dyn ChildProcess>
//!                                     ├─ id()          pid, stable for the child's life
//!                                     ├─ started_at()  wall-clock spawn time
//!                                     ├─ wait()        resolves once, when the process exits
//!                                     └─ kill()        forcible; returns after the exit is reaped
//! ```
//! `wait()` must be cancel-safe: the exit-watch drops a pending `wait()` to
//! call `kill()` on the same child.

mod os;

pub use os::OsLauncher;

use std::fmt;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;

/// How a child process ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Exited with a code.
    Code(i32),
    /// Terminated by a signal (Unix).
    Signal(i32),
    /// Exit reason could not be determined.
    Unknown,
}

impl ExitStatus {
    /// True for `Code(0)`.
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Code(c) => write!(f, "exit code {c}"),
            ExitStatus::Signal(s) => write!(f, "signal {s}"),
            ExitStatus::Unknown => f.write_str("unknown exit status"),
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitStatus::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return ExitStatus::Signal(sig);
            }
        }
        ExitStatus::Unknown
    }
}

/// A live child process.
#[async_trait]
pub trait ChildProcess: Send + 'static {
    /// OS process id.
    fn id(&self) -> u32;

    /// Wall-clock time the process was spawned.
    fn started_at(&self) -> SystemTime;

    /// Waits for the process to exit. Cancel-safe.
    async fn wait(&mut self) -> io::Result<ExitStatus>;

    /// Forcibly terminates the process and reaps it.
    ///
    /// Killing a process that already exited is not an error.
    async fn kill(&mut self) -> io::Result<()>;
}

/// Spawns child processes.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    /// Spawns `path` with `args`.
    async fn spawn(&self, path: &Path, args: &[String]) -> io::Result<Box<dyn ChildProcess>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_display() {
        assert_eq!(ExitStatus::Code(3).to_string(), "exit code 3");
        assert_eq!(ExitStatus::Signal(9).to_string(), "signal 9");
        assert!(ExitStatus::Code(0).success());
        assert!(!ExitStatus::Signal(9).success());
    }
}
