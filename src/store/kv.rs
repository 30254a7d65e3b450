use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

/// Raw string storage keyed by name.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store. `set_failing(true)` makes every call error, to exercise
/// degraded persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.get() {
            Err(StoreError::Unavailable("memory store set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed, failure-tolerant access to a [`KeyValueStore`].
///
/// Reads that fail or do not parse yield `T::default()`; writes that fail
/// are logged and dropped. Gameplay never sees a storage error.
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.try_get(key).unwrap_or_else(|e| {
            log::warn!("failed to load '{key}', using defaults: {e}");
            T::default()
        })
    }

    /// Like [`get`](Self::get) but surfaces the error.
    pub fn try_get<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.store.get_raw(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(T::default()),
        }
    }

    /// Returns whether the value was written.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string_pretty(value)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set_raw(key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to save '{key}': {e}");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to remove '{key}': {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::stats::{DEFAULT_HISTORY_CAP, PlayerStats};
    use crate::session::summary::{GameSessionSummary, SessionOutcome};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn played_stats() -> PlayerStats {
        let summary = GameSessionSummary {
            score: 150,
            rounds_completed: 6,
            accuracy_percent: 83.3,
            average_reaction_time_ms: 812.0,
            longest_streak: 5,
            duration_secs: 41,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 14, 21, 30, 5).unwrap(),
            outcome: SessionOutcome::GameOver,
        };
        PlayerStats::default().record_session(&summary, DEFAULT_HISTORY_CAP)
    }

    #[test]
    fn test_player_stats_round_trip() {
        let persistence = Persistence::new(MemoryStore::new());
        let stats = played_stats();
        assert!(persistence.set("player_stats", &stats));
        let loaded: PlayerStats = persistence.get("player_stats");
        assert_eq!(loaded, stats);
    }

    #[test]
    fn test_computed_averages_round_trip_exactly() {
        let persistence = Persistence::new(MemoryStore::new());
        // Read back one ULP off unless float parsing is exact.
        let stats = PlayerStats {
            average_accuracy: 22.639947002318646,
            average_reaction_time_ms: 6647.0 / 7.0,
            ..played_stats()
        };
        assert!(persistence.set("player_stats", &stats));
        let loaded: PlayerStats = persistence.get("player_stats");
        assert_eq!(loaded, stats);
    }

    proptest! {
        #[test]
        fn prop_player_stats_round_trip(
            accuracy in any::<f64>().prop_filter("finite", |v| v.is_finite()),
            reaction in any::<f64>().prop_filter("finite", |v| v.is_finite()),
            correct in 0u32..10_000,
            total in 1u32..10_000,
        ) {
            let persistence = Persistence::new(MemoryStore::new());
            let stats = PlayerStats {
                average_accuracy: accuracy,
                average_reaction_time_ms: reaction,
                total_correct: correct,
                total_incorrect: total,
                ..played_stats()
            };
            prop_assert!(persistence.set("player_stats", &stats));
            let loaded: PlayerStats = persistence.get("player_stats");
            prop_assert_eq!(loaded, stats);

            let computed = PlayerStats {
                average_accuracy: correct as f64 / (correct + total) as f64 * 100.0,
                average_reaction_time_ms: total as f64 / 7.0,
                ..played_stats()
            };
            prop_assert!(persistence.set("player_stats", &computed));
            let loaded: PlayerStats = persistence.get("player_stats");
            prop_assert_eq!(loaded, computed);
        }
    }

    #[test]
    fn test_missing_key_yields_default() {
        let persistence = Persistence::new(MemoryStore::new());
        let loaded: PlayerStats = persistence.get("player_stats");
        assert_eq!(loaded, PlayerStats::default());
    }

    #[test]
    fn test_corrupt_value_yields_default() {
        let store = MemoryStore::new();
        store.set_raw("player_stats", "{not json").unwrap();
        let persistence = Persistence::new(store);
        let loaded: PlayerStats = persistence.get("player_stats");
        assert_eq!(loaded, PlayerStats::default());
        assert!(persistence.try_get::<PlayerStats>("player_stats").is_err());
    }

    #[test]
    fn test_failing_store_degrades_quietly() {
        let persistence = Persistence::new(MemoryStore::new());
        persistence.store().set_failing(true);
        assert!(!persistence.set("player_stats", &played_stats()));
        assert!(!persistence.remove("player_stats"));
        let loaded: PlayerStats = persistence.get("player_stats");
        assert_eq!(loaded, PlayerStats::default());

        persistence.store().set_failing(false);
        assert!(!persistence.store().contains("player_stats"));
    }

    #[test]
    fn test_remove() {
        let persistence = Persistence::new(MemoryStore::new());
        persistence.set("achievements", &vec![1, 2, 3]);
        assert!(persistence.remove("achievements"));
        assert!(!persistence.store().contains("achievements"));
    }
}
