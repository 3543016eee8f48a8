//! Scripted process launcher and helpers shared by the integration tests.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::watch;

use procvisor::{
    BackoffPolicy, ChildProcess, ExitStatus, LaunchSpec, Launcher, MemoryStore, Snapshot,
    Supervisor, SupervisorBuilder, SupervisorConfig,
};

pub const SERVER: &str = "/srv/game/server";

/// Test-side control of one spawned mock child.
#[derive(Clone)]
pub struct MockHandle {
    pub pid: u32,
    exit: Arc<watch::Sender<Option<ExitStatus>>>,
    killed: Arc<AtomicBool>,
}

impl MockHandle {
    /// Makes the child exit on its own, as a crash or an external kill would.
    pub fn crash(&self, code: i32) {
        self.exit.send_replace(Some(ExitStatus::Code(code)));
    }

    /// True once the supervisor killed this child.
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

struct MockChild {
    pid: u32,
    exit: watch::Receiver<Option<ExitStatus>>,
    killed: Arc<AtomicBool>,
    tx: Arc<watch::Sender<Option<ExitStatus>>>,
}

#[async_trait]
impl ChildProcess for MockChild {
    fn id(&self) -> u32 {
        self.pid
    }

    fn started_at(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = *self
            .exit
            .wait_for(Option::is_some)
            .await
            .map_err(|_| io::Error::other("mock exit channel closed"))?;
        Ok(status.unwrap_or(ExitStatus::Unknown))
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.tx.send_replace(Some(ExitStatus::Signal(9)));
        Ok(())
    }
}

#[derive(Default)]
struct Inner {
    next_pid: u32,
    fail_next: usize,
    spawned: Vec<MockHandle>,
    calls: Vec<(PathBuf, Vec<String>)>,
}

/// Launcher whose children only exit when a test says so.
#[derive(Clone, Default)]
pub struct MockLauncher {
    inner: Arc<Mutex<Inner>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` spawns fail with `NotFound`.
    pub fn fail_next(&self, n: usize) {
        self.inner.lock().unwrap().fail_next = n;
    }

    /// Handles of all successfully spawned children, oldest first.
    pub fn spawned(&self) -> Vec<MockHandle> {
        self.inner.lock().unwrap().spawned.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.inner.lock().unwrap().spawned.len()
    }

    /// The most recent child.
    pub fn last(&self) -> MockHandle {
        self.spawned().pop().expect("nothing spawned yet")
    }

    /// Every spawn attempt (including failed ones): path and arguments.
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl Launcher for MockLauncher {
    async fn spawn(&self, path: &Path, args: &[String]) -> io::Result<Box<dyn ChildProcess>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((path.to_path_buf(), args.to_vec()));
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(io::Error::new(io::ErrorKind::NotFound, "mock: no such file"));
        }

        inner.next_pid += 1;
        let pid = 1000 + inner.next_pid;
        let (tx, rx) = watch::channel(None);
        let tx = Arc::new(tx);
        let killed = Arc::new(AtomicBool::new(false));
        inner.spawned.push(MockHandle {
            pid,
            exit: tx.clone(),
            killed: killed.clone(),
        });
        Ok(Box::new(MockChild {
            pid,
            exit: rx,
            killed,
            tx,
        }))
    }
}

/// Default config with an immediate-restart crash policy.
pub fn immediate_config() -> SupervisorConfig {
    SupervisorConfig {
        crash_backoff: BackoffPolicy::immediate(),
        ..SupervisorConfig::default()
    }
}

pub fn build(cfg: SupervisorConfig, launcher: &MockLauncher, store: Arc<MemoryStore>) -> Supervisor {
    SupervisorBuilder::new(cfg, LaunchSpec::new(SERVER, "-maxplayers 16"))
        .with_launcher(Arc::new(launcher.clone()))
        .with_store(store)
        .build()
}

/// Waits until the published snapshot satisfies `pred`.
pub async fn wait_for(sup: &Supervisor, pred: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    let mut rx = sup.watch_status();
    let snap = rx.wait_for(pred).await.expect("supervisor dropped").clone();
    snap
}
