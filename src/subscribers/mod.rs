//! # Event subscribers for the procvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Supervisor actor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                  │
//!                                                  ┌───────────────┼───────────────┐
//!                                                  ▼               ▼               ▼
//!                                              LogWriter        custom          custom
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
