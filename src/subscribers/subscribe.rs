//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging custom handlers
//! (logging, alerting, a status page) into the supervisor's event stream.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::SubscriberPanicked`)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue; it never delays a transition.
//! - Queue overflow drops the event **for this subscriber only** and publishes
//!   `EventKind::SubscriberOverflow`.
//! - Events are processed sequentially (FIFO) per subscriber.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use procvisor::{Event, EventKind, Subscribe};
//!
//! struct CrashAlert;
//!
//! #[async_trait]
//! impl Subscribe for CrashAlert {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ServerCrashed {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "crash-alert" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, events for this subscriber are **dropped**.
    fn queue_capacity(&self) -> usize {
        256
    }
}
