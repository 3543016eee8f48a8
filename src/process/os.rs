//! [`Launcher`] backed by `tokio::process`.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use super::{ChildProcess, ExitStatus, Launcher};

/// Spawns real OS processes.
///
/// The child runs in the executable's directory with stdin closed (the
/// console belongs to the operator prompt), and is killed if its handle is
/// dropped so the supervisor never leaks an orphan on shutdown.
#[derive(Clone, Debug)]
pub struct OsLauncher {
    inherit_output: bool,
}

impl Default for OsLauncher {
    fn default() -> Self {
        Self {
            inherit_output: true,
        }
    }
}

impl OsLauncher {
    /// Creates a launcher whose children write to the supervisor's stdout/stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a launcher whose children's output is discarded.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            inherit_output: false,
        }
    }
}

#[async_trait]
impl Launcher for OsLauncher {
    async fn spawn(&self, path: &Path, args: &[String]) -> io::Result<Box<dyn ChildProcess>> {
        // Absolute, so the working-directory switch below cannot re-resolve it.
        let program = std::path::absolute(path)?;
        let mut cmd = Command::new(&program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        if let Some(dir) = program.parent() {
            cmd.current_dir(dir);
        }
        if !self.inherit_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = cmd.spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("child exited before its pid was read"))?;
        Ok(Box::new(OsChild {
            child,
            pid,
            started_at: SystemTime::now(),
        }))
    }
}

struct OsChild {
    child: Child,
    pid: u32,
    started_at: SystemTime,
}

#[async_trait]
impl ChildProcess for OsChild {
    fn id(&self) -> u32 {
        self.pid
    }

    fn started_at(&self) -> SystemTime {
        self.started_at
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await.map(ExitStatus::from)
    }

    async fn kill(&mut self) -> io::Result<()> {
        match self.child.kill().await {
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            other => other,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_spawn_missing_executable_fails() {
        let err = OsLauncher::detached()
            .spawn(Path::new("/definitely/not/here/server"), &[])
            .await
            .err()
            .expect("spawn must fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_natural_exit_reports_code() {
        let mut child = OsLauncher::detached()
            .spawn(Path::new("/bin/sh"), &["-c".into(), "exit 3".into()])
            .await
            .unwrap();
        let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, ExitStatus::Code(3));
    }

    #[tokio::test]
    async fn test_kill_terminates_and_reaps() {
        let mut child = OsLauncher::detached()
            .spawn(Path::new("/bin/sleep"), &["30".into()])
            .await
            .unwrap();
        assert!(child.id() > 0);
        child.kill().await.unwrap();
        child.kill().await.unwrap();
    }
}
