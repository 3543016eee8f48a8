//! # Supervisor: the cloneable handle to one supervised server.
//!
//! A [`Supervisor`] is a thin front for the actor task that owns all state.
//! Commands go through a bounded mailbox and wait for the actor's reply;
//! status reads never touch the mailbox and come from the latest published
//! [`Snapshot`].
//!
//! ```text
//! Supervisor::start()/stop()/restart() ──► mpsc<Command> ──► SupervisorActor
//!                                               ◄── oneshot reply ──┘
//! Supervisor::status()  ◄── watch<Snapshot> ◄── published after each transition
//! Supervisor::subscribe() ◄── Bus (broadcast<Event>)
//!
//! subscriber_listener: Bus ──► SubscriberSet::emit(&Event) ──► per-subscriber workers
//! ```
//!
//! Handles are cheap to clone; the actor stops (and stops the child) when
//! [`Supervisor::shutdown`] is called or the last handle is dropped.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use procvisor::{LaunchSpec, MemoryStore, SupervisorBuilder, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), procvisor::SupervisorError> {
//!     let launch = LaunchSpec::new("/srv/game/server", "-maxplayers 16");
//!     let sup = SupervisorBuilder::new(SupervisorConfig::default(), launch)
//!         .with_store(Arc::new(MemoryStore::new()))
//!         .build();
//!
//!     let pid = sup.start().await?;
//!     println!("started {pid}: {:?}", sup.status());
//!     sup.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::actor::Command;
use crate::core::launch::LaunchSpec;
use crate::core::state::{Snapshot, Status, StopOutcome};
use crate::error::SupervisorError;
use crate::events::{Bus, Event};
use crate::subscribers::SubscriberSet;

/// Handle to a running supervisor.
#[derive(Clone)]
pub struct Supervisor {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<Snapshot>,
    bus: Bus,
    runtime: CancellationToken,
    listener: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Supervisor {
    pub(crate) fn new_internal(
        commands: mpsc::Sender<Command>,
        snapshot: watch::Receiver<Snapshot>,
        bus: Bus,
        subs: SubscriberSet,
    ) -> Self {
        let runtime = CancellationToken::new();
        let listener = subscriber_listener(bus.subscribe(), subs, runtime.clone());
        Self {
            commands,
            snapshot,
            bus,
            runtime,
            listener: Arc::new(Mutex::new(Some(listener))),
        }
    }

    /// Spawns the server. Fails with [`SupervisorError::AlreadyRunning`] if a
    /// child is live, or [`SupervisorError::SpawnFailed`] (state stays offline).
    pub async fn start(&self) -> Result<u32, SupervisorError> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Stops the server and reaps it. A no-op when nothing is running.
    pub async fn stop(&self) -> Result<StopOutcome, SupervisorError> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Stops the live child (if any) and starts a new one.
    pub async fn restart(&self) -> Result<u32, SupervisorError> {
        self.request(|reply| Command::Restart { reply }).await?
    }

    /// Persists the restart interval in hours (`0` disables). Applies from the next start.
    pub async fn set_restart_hours(&self, hours: u64) -> Result<(), SupervisorError> {
        self.request(|reply| Command::SetRestartHours { hours, reply })
            .await?
    }

    /// Replaces the executable and parameters used by subsequent starts.
    pub async fn set_launch(&self, launch: LaunchSpec) -> Result<(), SupervisorError> {
        self.request(|reply| Command::SetLaunch { launch, reply })
            .await
    }

    /// Current status, computed from the last published snapshot.
    pub fn status(&self) -> Status {
        self.snapshot.borrow().status_at(Instant::now())
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn watch_status(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// Subscribes to the raw event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops the server (if running), stops the actor, then flushes subscribers.
    ///
    /// Idempotent: later calls (from any clone) return immediately.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Shutdown { reply }).await.is_ok() {
            let _ = rx.await;
        }
        self.runtime.cancel();
        if let Some(listener) = self.listener.lock().await.take() {
            let _ = listener.await;
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SupervisorError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SupervisorError::Closed)?;
        rx.await.map_err(|_| SupervisorError::Closed)
    }
}

/// Forwards bus events to the subscriber set until `runtime` is cancelled,
/// then delivers whatever is still buffered and drains the workers.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    runtime: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                ev = rx.recv() => match ev {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = runtime.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => subs.emit(&ev),
                            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        subs.shutdown().await;
    })
}
