//! # SupervisorActor: the single owner of supervisor state.
//!
//! Every transition (start, stop, restart, crash recovery) runs inside this
//! actor's loop, one message at a time. Handles and background tasks never
//! mutate state; they post messages.
//!
//! ## Mailboxes
//! ```text
//! Supervisor handles ──► commands (bounded)  ──┐
//!                                              ├──► run() ── one transition at a time
//! exit-watch, timers ──► notices (unbounded) ──┘       └──► watch::Sender<Snapshot>
//! ```
//! Notices are polled first. They are unbounded so a watch task can always
//! post its exit, even while the actor is awaiting that very task during a stop.
//!
//! ## Transitions
//! ```text
//! Start        ─► AlreadyRunning if child live
//!                 spawn ─► Err: SpawnFailed (offline, no retry)
//!                       └► Ok : child = gen N, watch_exit(N), arm schedule
//! Stop         ─► stopping = true ─► disarm ─► cancel watch (kill + reap) ─► child = None
//! Restart(t)   ─► Stop ─► Start
//! Exited(N)    ─► N != live gen or stopping ─► StaleExitIgnored
//!                 else crash: crash_count += 1, streak += 1
//!                      delay == 0 ─► Start (same loop turn, no recursion)
//!                      delay  > 0 ─► arm CrashRestartDue
//! Scheduled(t) ─► stale ticket ─► ignore, else Restart(Scheduled)
//! ```
//!
//! ## Rules
//! - At most one live child; a spawn never happens while `child` is `Some`.
//! - The exit of a child the actor is stopping can never count as a crash:
//!   `stopping` is set and the kill issued by the same owner, and exits are
//!   matched by generation.
//! - The schedule is armed only while a child is live, rearmed on every start.
//! - A snapshot is published at the end of every message.

use std::io;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::config::SupervisorConfig;
use crate::core::launch::LaunchSpec;
use crate::core::scheduler::RestartScheduler;
use crate::core::state::{OnlineSnapshot, Snapshot, StopOutcome};
use crate::core::watch::{WatchEnd, watch_exit};
use crate::error::SupervisorError;
use crate::events::{Bus, Event, EventKind, RestartTrigger};
use crate::process::{ExitStatus, Launcher};
use crate::store::{ConfigStore, RestartInterval, keys};

/// Operator-side requests, each with a reply channel.
pub(crate) enum Command {
    Start {
        reply: oneshot::Sender<Result<u32, SupervisorError>>,
    },
    Stop {
        reply: oneshot::Sender<StopOutcome>,
    },
    Restart {
        reply: oneshot::Sender<Result<u32, SupervisorError>>,
    },
    SetRestartHours {
        hours: u64,
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },
    SetLaunch {
        launch: LaunchSpec,
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Background-side notifications.
#[derive(Debug)]
pub(crate) enum Notice {
    /// The child of `generation` exited on its own.
    Exited {
        generation: u64,
        status: io::Result<ExitStatus>,
    },
    /// The periodic restart timer fired.
    ScheduledRestart { ticket: u64 },
    /// A backoff-delayed crash restart is due.
    CrashRestartDue { ticket: u64 },
}

/// The live child and its exit-watch.
struct LiveChild {
    generation: u64,
    pid: u32,
    up_since: std::time::SystemTime,
    started: Instant,
    cancel: CancellationToken,
    watch: JoinHandle<WatchEnd>,
}

/// Collaborators handed to the actor by the builder.
pub(crate) struct ActorParts {
    pub cfg: SupervisorConfig,
    pub launch: LaunchSpec,
    pub launcher: Arc<dyn Launcher>,
    pub store: Arc<dyn ConfigStore>,
    pub bus: Bus,
    pub snapshot: watch::Sender<Snapshot>,
}

/// Owns `SupervisorState` and runs every transition.
pub(crate) struct SupervisorActor {
    cfg: SupervisorConfig,
    launch: LaunchSpec,
    launcher: Arc<dyn Launcher>,
    store: Arc<dyn ConfigStore>,
    bus: Bus,
    snapshot: watch::Sender<Snapshot>,
    notices_tx: mpsc::UnboundedSender<Notice>,
    notices_rx: mpsc::UnboundedReceiver<Notice>,

    child: Option<LiveChild>,
    stopping: bool,
    crash_count: u64,
    crash_streak: u32,
    last_generation: u64,
    restart_hours: Option<u64>,
    schedule: RestartScheduler,
    crash_restart: RestartScheduler,
}

impl SupervisorActor {
    pub(crate) fn new(parts: ActorParts) -> Self {
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let schedule = RestartScheduler::new(notices_tx.clone(), |ticket| {
            Notice::ScheduledRestart { ticket }
        });
        let crash_restart =
            RestartScheduler::new(notices_tx.clone(), |ticket| Notice::CrashRestartDue { ticket });

        Self {
            cfg: parts.cfg,
            launch: parts.launch,
            launcher: parts.launcher,
            store: parts.store,
            bus: parts.bus,
            snapshot: parts.snapshot,
            notices_tx,
            notices_rx,
            child: None,
            stopping: false,
            crash_count: 0,
            crash_streak: 0,
            last_generation: 0,
            restart_hours: None,
            schedule,
            crash_restart,
        }
    }

    /// Runs until a `Shutdown` command arrives or every handle is dropped.
    ///
    /// A child still live at that point is stopped before returning.
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            tokio::select! {
                biased;
                Some(notice) = self.notices_rx.recv() => self.handle_notice(notice).await,
                cmd = commands.recv() => match cmd {
                    Some(cmd) => {
                        let last = matches!(cmd, Command::Shutdown { .. });
                        self.handle_command(cmd).await;
                        if last {
                            return;
                        }
                    }
                    None => break,
                },
            }
            self.publish_snapshot();
        }
        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        self.crash_restart.disarm();
        self.stop_child().await;
        self.publish_snapshot();
    }

    /// Replies are sent after the snapshot is published, so a caller that
    /// reads `status()` right after a reply sees the new state.
    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                if self.crash_restart.disarm() {
                    self.bus.publish(Event::new(EventKind::CrashRestartCancelled));
                }
                let res = self.start().await;
                self.publish_snapshot();
                let _ = reply.send(res);
            }
            Command::Stop { reply } => {
                let outcome = self.stop().await;
                self.publish_snapshot();
                let _ = reply.send(outcome);
            }
            Command::Restart { reply } => {
                let res = self.restart(RestartTrigger::Manual).await;
                self.publish_snapshot();
                let _ = reply.send(res);
            }
            Command::SetRestartHours { hours, reply } => {
                let _ = reply.send(self.set_restart_hours(hours));
            }
            Command::SetLaunch { launch, reply } => {
                self.launch = launch;
                let _ = reply.send(());
            }
            Command::Shutdown { reply } => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                self.shutdown().await;
                let _ = reply.send(());
            }
        }
    }

    async fn handle_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Exited { generation, status } => self.on_exit(generation, status).await,
            Notice::ScheduledRestart { ticket } => {
                if self.schedule.fire(ticket) && self.child.is_some() {
                    let _ = self.restart(RestartTrigger::Scheduled).await;
                }
            }
            Notice::CrashRestartDue { ticket } => {
                if self.crash_restart.fire(ticket) && self.child.is_none() {
                    self.bus.publish(
                        Event::new(EventKind::RestartRequested).with_trigger(RestartTrigger::Crash),
                    );
                    let _ = self.start().await;
                }
            }
        }
    }

    /// Spawns a new child. Never called while one is live.
    async fn start(&mut self) -> Result<u32, SupervisorError> {
        if let Some(child) = &self.child {
            return Err(SupervisorError::AlreadyRunning { pid: child.pid });
        }

        let generation = self.last_generation + 1;
        self.bus
            .publish(Event::new(EventKind::ServerStarting).with_generation(generation));

        let path = self.launch.executable().to_path_buf();
        let args = self.cfg.launch_args(&self.launch);
        let process = match self.launcher.spawn(&path, &args).await {
            Ok(p) => p,
            Err(source) => {
                self.bus.publish(
                    Event::new(EventKind::SpawnFailed)
                        .with_generation(generation)
                        .with_reason(source.to_string()),
                );
                return Err(SupervisorError::SpawnFailed { path, source });
            }
        };

        self.last_generation = generation;
        let pid = process.id();
        let up_since = process.started_at();
        let cancel = CancellationToken::new();
        let watch = tokio::spawn(watch_exit(
            process,
            generation,
            cancel.clone(),
            self.notices_tx.clone(),
        ));

        self.child = Some(LiveChild {
            generation,
            pid,
            up_since,
            started: Instant::now(),
            cancel,
            watch,
        });
        self.stopping = false;
        self.bus.publish(
            Event::new(EventKind::ServerStarted)
                .with_pid(pid)
                .with_generation(generation),
        );
        self.arm_schedule();
        Ok(pid)
    }

    /// Operator stop: also cancels a pending crash restart.
    async fn stop(&mut self) -> StopOutcome {
        let cancelled = self.crash_restart.disarm();
        if cancelled {
            self.bus.publish(Event::new(EventKind::CrashRestartCancelled));
        }
        match self.stop_child().await {
            Some(pid) => StopOutcome::Stopped { pid },
            None if cancelled => StopOutcome::CancelledRestart,
            None => StopOutcome::NotRunning,
        }
    }

    /// Kills and reaps the live child. Returns its pid, or `None` if nothing was live.
    async fn stop_child(&mut self) -> Option<u32> {
        let child = self.child.take()?;
        self.stopping = true;
        self.bus.publish(
            Event::new(EventKind::ServerStopping)
                .with_pid(child.pid)
                .with_generation(child.generation),
        );
        self.schedule.disarm();
        self.restart_hours = None;

        child.cancel.cancel();
        let mut stopped = Event::new(EventKind::ServerStopped)
            .with_pid(child.pid)
            .with_generation(child.generation);
        match child.watch.await {
            Ok(WatchEnd::Killed(Ok(()))) => {}
            Ok(WatchEnd::Killed(Err(e))) => stopped = stopped.with_reason(format!("kill failed: {e}")),
            Ok(WatchEnd::Exited) => stopped = stopped.with_reason("exited before kill"),
            Err(e) => stopped = stopped.with_reason(format!("exit watch failed: {e}")),
        }

        self.crash_streak = 0;
        self.stopping = false;
        self.bus.publish(stopped);
        Some(child.pid)
    }

    async fn restart(&mut self, trigger: RestartTrigger) -> Result<u32, SupervisorError> {
        self.bus
            .publish(Event::new(EventKind::RestartRequested).with_trigger(trigger));
        if self.crash_restart.disarm() {
            self.bus.publish(Event::new(EventKind::CrashRestartCancelled));
        }
        self.stop_child().await;
        self.start().await
    }

    async fn on_exit(&mut self, generation: u64, status: io::Result<ExitStatus>) {
        let is_current = self
            .child
            .as_ref()
            .is_some_and(|c| c.generation == generation);
        if !is_current || self.stopping {
            self.bus
                .publish(Event::new(EventKind::StaleExitIgnored).with_generation(generation));
            return;
        }
        let Some(child) = self.child.take() else {
            return;
        };
        // The watch task has already posted its notice and is finishing.
        let _ = child.watch.await;
        self.schedule.disarm();
        self.restart_hours = None;

        self.crash_count += 1;
        self.crash_streak = if child.started.elapsed() >= self.cfg.stable_after {
            1
        } else {
            self.crash_streak.saturating_add(1)
        };
        let reason = match status {
            Ok(s) => s.to_string(),
            Err(e) => format!("wait failed: {e}"),
        };
        self.bus.publish(
            Event::new(EventKind::ServerCrashed)
                .with_pid(child.pid)
                .with_generation(generation)
                .with_crash_count(self.crash_count)
                .with_reason(reason),
        );

        let delay = self.cfg.crash_delay(self.crash_streak);
        if delay.is_zero() {
            self.bus.publish(
                Event::new(EventKind::RestartRequested).with_trigger(RestartTrigger::Crash),
            );
            let _ = self.start().await;
        } else if self.crash_restart.arm(delay).is_some() {
            self.bus.publish(
                Event::new(EventKind::CrashRestartScheduled)
                    .with_delay(delay)
                    .with_attempt(self.crash_streak),
            );
        }
    }

    /// (Re)arms the periodic restart from the stored interval.
    fn arm_schedule(&mut self) {
        self.restart_hours = None;
        match RestartInterval::load(self.store.as_ref()) {
            RestartInterval::Disabled => {
                self.schedule.disarm();
            }
            RestartInterval::Invalid(raw) => {
                self.schedule.disarm();
                self.bus
                    .publish(Event::new(EventKind::ScheduleInvalid).with_reason(raw));
            }
            RestartInterval::Hours(hours) => {
                let armed = self
                    .cfg
                    .schedule_interval(hours)
                    .and_then(|every| self.schedule.arm(every).map(|_| every));
                match armed {
                    Some(every) => {
                        self.restart_hours = Some(hours);
                        self.bus
                            .publish(Event::new(EventKind::ScheduleArmed).with_delay(every));
                    }
                    None => {
                        self.schedule.disarm();
                        self.bus.publish(
                            Event::new(EventKind::ScheduleInvalid).with_reason(hours.to_string()),
                        );
                    }
                }
            }
        }
    }

    /// Persists the interval; it applies from the next start.
    fn set_restart_hours(&mut self, hours: u64) -> Result<(), SupervisorError> {
        self.store
            .set(keys::HOURS_UNTIL_RESTART, &RestartInterval::encode(hours))?;
        let mut ev = Event::new(EventKind::ScheduleChanged);
        if let Some(every) = self.cfg.schedule_interval(hours) {
            ev = ev.with_delay(every);
        }
        self.bus.publish(ev);
        Ok(())
    }

    fn publish_snapshot(&self) {
        let snap = match &self.child {
            Some(c) => Snapshot::Online(OnlineSnapshot {
                pid: c.pid,
                generation: c.generation,
                up_since: c.up_since,
                started: c.started,
                crash_count: self.crash_count,
                restart_hours: self.restart_hours,
                next_restart: self.schedule.deadline(),
            }),
            None => Snapshot::Offline {
                crash_count: self.crash_count,
                restart_pending: self.crash_restart.deadline(),
            },
        };
        self.snapshot.send_if_modified(|current| {
            if *current == snap {
                false
            } else {
                *current = snap;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::SystemTime;

    use async_trait::async_trait;
    use tokio::sync::broadcast;

    use super::*;
    use crate::policies::BackoffPolicy;
    use crate::process::ChildProcess;
    use crate::store::MemoryStore;

    struct StubChild {
        pid: u32,
        exit: watch::Receiver<Option<ExitStatus>>,
        exit_tx: Arc<watch::Sender<Option<ExitStatus>>>,
    }

    #[async_trait]
    impl ChildProcess for StubChild {
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
                .map_err(|_| io::Error::other("exit channel closed"))?;
            Ok(status.unwrap_or(ExitStatus::Unknown))
        }

        async fn kill(&mut self) -> io::Result<()> {
            self.exit_tx.send_replace(Some(ExitStatus::Signal(9)));
            Ok(())
        }
    }

    /// Hands out children whose exit is driven through the returned senders.
    #[derive(Default)]
    struct StubLauncher {
        exits: Mutex<Vec<Arc<watch::Sender<Option<ExitStatus>>>>>,
    }

    impl StubLauncher {
        fn exit(&self, index: usize, code: i32) {
            self.exits.lock().unwrap()[index].send_replace(Some(ExitStatus::Code(code)));
        }

        fn spawn_count(&self) -> usize {
            self.exits.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Launcher for StubLauncher {
        async fn spawn(&self, _: &Path, _: &[String]) -> io::Result<Box<dyn ChildProcess>> {
            let mut exits = self.exits.lock().unwrap();
            let (tx, rx) = watch::channel(None);
            let tx = Arc::new(tx);
            exits.push(tx.clone());
            Ok(Box::new(StubChild {
                pid: 100 + exits.len() as u32,
                exit: rx,
                exit_tx: tx,
            }))
        }
    }

    fn actor(launcher: Arc<StubLauncher>) -> (SupervisorActor, broadcast::Receiver<Event>) {
        let bus = Bus::new(64);
        let events = bus.subscribe();
        let (snapshot, _) = watch::channel(Snapshot::initial());
        let cfg = SupervisorConfig {
            crash_backoff: BackoffPolicy::immediate(),
            ..SupervisorConfig::default()
        };
        let actor = SupervisorActor::new(ActorParts {
            cfg,
            launch: LaunchSpec::new("/srv/game/server", ""),
            launcher,
            store: Arc::new(MemoryStore::new()),
            bus,
            snapshot,
        });
        (actor, events)
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn test_exit_racing_a_stop_is_not_a_crash() {
        let launcher = Arc::new(StubLauncher::default());
        let (mut actor, mut events) = actor(launcher.clone());
        let pid = actor.start().await.unwrap();

        // The child exits and its watch task reports it before the stop
        // transition gets to cancel the watch.
        launcher.exit(0, 1);
        while !actor.child.as_ref().unwrap().watch.is_finished() {
            tokio::task::yield_now().await;
        }
        assert_eq!(actor.stop().await, StopOutcome::Stopped { pid });

        let notice = actor.notices_rx.try_recv().unwrap();
        actor.handle_notice(notice).await;

        assert_eq!(actor.crash_count, 0);
        assert!(actor.child.is_none());
        assert_eq!(launcher.spawn_count(), 1);

        let seen = drain(&mut events);
        let stopped = seen
            .iter()
            .find(|e| e.kind == EventKind::ServerStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("exited before kill"));
        assert!(seen.iter().any(|e| e.kind == EventKind::StaleExitIgnored));
        assert!(!seen.iter().any(|e| e.kind == EventKind::ServerCrashed));
    }

    #[tokio::test]
    async fn test_exit_of_replaced_child_is_ignored() {
        let launcher = Arc::new(StubLauncher::default());
        let (mut actor, mut events) = actor(launcher.clone());
        actor.start().await.unwrap();
        let pid = actor.restart(RestartTrigger::Manual).await.unwrap();

        // A killed child posts nothing.
        assert!(actor.notices_rx.try_recv().is_err());

        actor.on_exit(1, Ok(ExitStatus::Code(1))).await;

        assert_eq!(actor.crash_count, 0);
        let live = actor.child.as_ref().unwrap();
        assert_eq!((live.generation, live.pid), (2, pid));
        assert_eq!(launcher.spawn_count(), 2);

        let seen = drain(&mut events);
        let stale = seen.last().unwrap();
        assert_eq!(stale.kind, EventKind::StaleExitIgnored);
        assert_eq!(stale.generation, Some(1));
        assert!(!seen.iter().any(|e| e.kind == EventKind::ServerCrashed));
    }

    #[tokio::test]
    async fn test_shutdown_command_stops_child_and_ends_loop() {
        let launcher = Arc::new(StubLauncher::default());
        let (mut actor, mut events) = actor(launcher.clone());
        actor.start().await.unwrap();

        let (commands_tx, commands_rx) = mpsc::channel(1);
        let (reply, done) = oneshot::channel();
        commands_tx.send(Command::Shutdown { reply }).await.unwrap();
        actor.run(commands_rx).await;
        done.await.unwrap();

        let kinds: Vec<_> = drain(&mut events).into_iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert_eq!(kinds.last(), Some(&EventKind::ServerStopped));
    }
}
