//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders events as `tracing` records (the binary's console log).

mod log;

pub use log::LogWriter;
