//! # Durable settings.
//!
//! [`ConfigStore`] is a string-to-string mapping keyed by setting name. The
//! supervisor reads [`keys::HOURS_UNTIL_RESTART`] on every start; the binary
//! reads and writes the executable path and extra parameters.
//!
//! Backends:
//! - [`FileStore`] flat JSON object on disk, written through on every `set`;
//! - [`MemoryStore`] in-process map, used by tests and embedders.
//!
//! Values are UTF-8 strings. The binary refuses a server path that is not
//! valid UTF-8 rather than storing a lossy copy.
//!
//! ## Restart interval parsing
//! ```text
//! absent / ""   → RestartInterval::Disabled
//! "0"           → RestartInterval::Disabled
//! "6"           → RestartInterval::Hours(6)
//! "six", "-1"   → RestartInterval::Invalid("six")   (treated as disabled)
//! ```

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Setting names used by procvisor.
pub mod keys {
    /// Whole hours between scheduled restarts; empty or absent disables them.
    pub const HOURS_UNTIL_RESTART: &str = "hoursUntilRestart";
    /// Path to the server executable.
    pub const SERVER_EXE: &str = "serverEXE";
    /// Extra launch parameters appended after the fixed flags.
    pub const SERVER_PARAMS: &str = "serverParams";
}

/// Durable key/value settings.
///
/// Implementations are synchronous; `set` must be durable when it returns `Ok`.
pub trait ConfigStore: Send + Sync + 'static {
    /// Returns the stored value, or `None` when the key was never set.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Parsed form of [`keys::HOURS_UNTIL_RESTART`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestartInterval {
    /// No scheduled restarts.
    Disabled,
    /// Restart every `n` hours (`n > 0`).
    Hours(u64),
    /// The stored value is not a non-negative integer; treated as disabled.
    Invalid(String),
}

impl RestartInterval {
    /// Parses a stored value.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return RestartInterval::Disabled;
        };
        match raw.parse::<u64>() {
            Ok(0) => RestartInterval::Disabled,
            Ok(n) => RestartInterval::Hours(n),
            Err(_) => RestartInterval::Invalid(raw.to_string()),
        }
    }

    /// Reads and parses the interval from a store.
    pub fn load(store: &dyn ConfigStore) -> Self {
        Self::parse(store.get(keys::HOURS_UNTIL_RESTART).as_deref())
    }

    /// Returns the hour count when scheduling is enabled.
    pub fn hours(&self) -> Option<u64> {
        match self {
            RestartInterval::Hours(n) => Some(*n),
            _ => None,
        }
    }

    /// Encodes an operator-supplied hour count for storage (`0` disables).
    pub fn encode(hours: u64) -> String {
        if hours == 0 {
            String::new()
        } else {
            hours.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_restart_interval() {
        assert_eq!(RestartInterval::parse(None), RestartInterval::Disabled);
        assert_eq!(RestartInterval::parse(Some("")), RestartInterval::Disabled);
        assert_eq!(RestartInterval::parse(Some("  ")), RestartInterval::Disabled);
        assert_eq!(RestartInterval::parse(Some("0")), RestartInterval::Disabled);
        assert_eq!(RestartInterval::parse(Some("6")), RestartInterval::Hours(6));
        assert_eq!(RestartInterval::parse(Some(" 12 ")), RestartInterval::Hours(12));
        assert_eq!(
            RestartInterval::parse(Some("-1")),
            RestartInterval::Invalid("-1".into())
        );
        assert_eq!(
            RestartInterval::parse(Some("six")),
            RestartInterval::Invalid("six".into())
        );
    }

    #[test]
    fn test_invalid_interval_has_no_hours() {
        assert_eq!(RestartInterval::Invalid("x".into()).hours(), None);
        assert_eq!(RestartInterval::Hours(3).hours(), Some(3));
    }

    #[test]
    fn test_encode_zero_disables() {
        assert_eq!(RestartInterval::encode(0), "");
        assert_eq!(RestartInterval::encode(4), "4");
        assert_eq!(
            RestartInterval::parse(Some(&RestartInterval::encode(0))),
            RestartInterval::Disabled
        );
    }

    #[test]
    fn test_load_reads_the_store() {
        let store = MemoryStore::new();
        assert_eq!(RestartInterval::load(&store), RestartInterval::Disabled);
        store.set(keys::HOURS_UNTIL_RESTART, "2").unwrap();
        assert_eq!(RestartInterval::load(&store), RestartInterval::Hours(2));
    }
}
