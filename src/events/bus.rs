//! # Lifecycle event bus.
//!
//! [`Bus`] carries every [`Event`] the supervisor emits. Publishing never
//! waits: the actor must not stall a transition because a log sink is slow.
//!
//! ```text
//! SupervisorActor ──┐
//! subscriber worker ┴─ publish ─► Bus ─┬─► subscriber_listener ─► SubscriberSet
//!                                      └─► Supervisor::subscribe() receivers (tests, embedders)
//! ```
//!
//! Backed by one `tokio::sync::broadcast` ring of `capacity` events shared by
//! all receivers. A receiver that falls more than `capacity` events behind
//! gets `RecvError::Lagged(n)` and resumes at the oldest retained event.
//! Events published while nobody is subscribed are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publish/subscribe handle for lifecycle events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev` to every current receiver. Never blocks.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_subscriber_sees_events_published_after_subscribe() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::ServerStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ServerStarted).with_pid(7));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::ServerStarted);
        assert_eq!(ev.pid, Some(7));
    }

    #[tokio::test]
    async fn test_lagging_receiver_skips_oldest() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for generation in 1..=3 {
            bus.publish(Event::new(EventKind::ServerStarted).with_generation(generation));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().generation, Some(2));
    }

    #[test]
    fn test_publish_without_receivers_does_not_panic() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ShutdownRequested));
    }
}
