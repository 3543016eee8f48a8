use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::{
    actor::{ActorParts, SupervisorActor},
    config::SupervisorConfig,
    launch::LaunchSpec,
    state::Snapshot,
    supervisor::Supervisor,
};
use crate::{
    events::Bus,
    process::{Launcher, OsLauncher},
    store::{ConfigStore, MemoryStore},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`] with optional collaborators.
///
/// Defaults: [`OsLauncher`] (child output inherited), in-memory store, no subscribers.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    launch: LaunchSpec,
    subscribers: Vec<Arc<dyn Subscribe>>,
    launcher: Option<Arc<dyn Launcher>>,
    store: Option<Arc<dyn ConfigStore>>,
}

impl SupervisorBuilder {
    /// Creates a new builder for the given configuration and launch target.
    pub fn new(cfg: SupervisorConfig, launch: LaunchSpec) -> Self {
        Self {
            cfg,
            launch,
            subscribers: Vec::new(),
            launcher: None,
            store: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the process launcher.
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Sets the durable settings store (read for `hoursUntilRestart` on every start).
    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Spawns the actor and the subscriber listener and returns the handle.
    ///
    /// Must be called inside a tokio runtime. The server is not started.
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let (commands_tx, commands_rx) = mpsc::channel(self.cfg.mailbox_capacity_clamped());
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::initial());

        let launcher = self
            .launcher
            .unwrap_or_else(|| Arc::new(OsLauncher::new()));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        // Subscribe before the actor can publish anything.
        let sup = Supervisor::new_internal(commands_tx, snapshot_rx, bus.clone(), subs);

        let actor = SupervisorActor::new(ActorParts {
            cfg: self.cfg,
            launch: self.launch,
            launcher,
            store,
            bus,
            snapshot: snapshot_tx,
        });
        tokio::spawn(actor.run(commands_rx));
        sup
    }
}
