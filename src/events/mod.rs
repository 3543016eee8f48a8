//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor actor,
//! exit-watch tasks and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`RestartTrigger`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the supervisor actor, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the supervisor's listener task, which fans out to the
//!   [`SubscriberSet`](crate::SubscriberSet); tests may also subscribe directly.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, RestartTrigger};
