//! # Non-blocking event fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] hands every [`Event`] to each subscriber's bounded queue
//! and returns immediately; a worker task per subscriber drains its queue.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**; per-subscriber FIFO.
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published.
//! - **Isolation**: a panicking subscriber keeps its worker alive and does not affect others.
//!
//! `AssertUnwindSafe` is used: a subscriber that panics while holding a lock may
//! leave its own state poisoned.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            workers.push(tokio::spawn(drain(sub, rx, bus.clone())));
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits an event to all subscribers without waiting for them.
    ///
    /// `SubscriberOverflow` events that themselves overflow are not re-published.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let is_overflow = event.kind == EventKind::SubscriberOverflow;

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Closes all queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

async fn drain(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let fut = sub.on_event(ev.as_ref());
        if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            let info = if let Some(msg) = panic.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = panic.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn test_events_reach_every_subscriber_in_order() {
        let bus = Bus::new(16);
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone(), Arc::new(Recorder::default())];
        let set = SubscriberSet::new(subs, bus);
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::ServerStarting));
        set.emit(&Event::new(EventKind::ServerStarted));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![EventKind::ServerStarting, EventKind::ServerStarted]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported_and_isolated() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Panicker), rec.clone()];
        let set = SubscriberSet::new(subs, bus);

        set.emit(&Event::new(EventKind::ServerCrashed));

        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("panic event in time")
            .expect("bus open");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.subscriber, Some("panicker"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));

        set.shutdown().await;
        assert_eq!(*rec.seen.lock().unwrap(), vec![EventKind::ServerCrashed]);
    }
}
