//! The single owner of persisted selections.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::SavedSelection;

use super::error::StoreError;
use super::merge::{self, SaveOutcome, SaveRecord};
use super::store::{KeyValueStore, SAVED_SELECTIONS_KEY};

/// Saved selections, backed by a [`KeyValueStore`].
///
/// Every change is written to the store first and only then published to
/// subscribers, so a failed write leaves both untouched.
pub struct SavedSelections {
    store: Arc<dyn KeyValueStore>,
    current: watch::Sender<Vec<SavedSelection>>,
    /// Serializes updates.
    write: Mutex<()>,
}

impl SavedSelections {
    /// Load from `store`. Unreadable or malformed state counts as empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let initial = read(store.as_ref());
        info!(count = initial.len(), "loaded saved selections");
        let (current, _) = watch::channel(initial);
        Self {
            store,
            current,
            write: Mutex::new(()),
        }
    }

    /// The current list, in save order.
    pub fn list(&self) -> Vec<SavedSelection> {
        self.current.borrow().clone()
    }

    /// The entry for `stop_id`.
    pub fn get(&self, stop_id: &str) -> Option<SavedSelection> {
        self.current
            .borrow()
            .iter()
            .find(|s| s.id == stop_id)
            .cloned()
    }

    /// Receive the list after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<SavedSelection>> {
        self.current.subscribe()
    }

    /// Merge `record` in, timestamped now.
    pub fn save(&self, record: SaveRecord) -> Result<SaveOutcome, StoreError> {
        self.save_at(record, Utc::now())
    }

    /// Merge `record` in, timestamped `now`.
    pub fn save_at(&self, record: SaveRecord, now: DateTime<Utc>) -> Result<SaveOutcome, StoreError> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let stop_id = record.stop_id().to_string();
        let outcome = merge::save(&self.list(), record, now);
        match &outcome {
            SaveOutcome::Unchanged => {
                info!(stop = %stop_id, "selection unchanged");
            }
            SaveOutcome::Updated(list) | SaveOutcome::Added(list) => {
                self.commit(list.clone())?;
                info!(stop = %stop_id, count = list.len(), "selection saved");
            }
        }
        Ok(outcome)
    }

    /// Delete the entry for `stop_id`. Returns false if there was none.
    pub fn remove(&self, stop_id: &str) -> Result<bool, StoreError> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = merge::remove(&self.list(), stop_id) else {
            return Ok(false);
        };
        self.commit(list)?;
        info!(stop = %stop_id, "selection removed");
        Ok(true)
    }

    fn commit(&self, list: Vec<SavedSelection>) -> Result<(), StoreError> {
        let json = serde_json::to_string(&list).map_err(|e| StoreError::Json {
            message: format!("failed to serialize selections: {}", e),
        })?;
        self.store.set(SAVED_SELECTIONS_KEY, &json)?;
        self.current.send_replace(list);
        Ok(())
    }
}

fn read(store: &dyn KeyValueStore) -> Vec<SavedSelection> {
    let raw = match store.get(SAVED_SELECTIONS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read saved selections, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %e, "malformed saved selections, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineId, SelectedLines, stop_fixture};
    use crate::selection::store::{JsonFileStore, MemoryStore};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(id: &str, lines: SelectedLines) -> SaveRecord {
        SaveRecord {
            stop: stop_fixture(id, id),
            lines,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 15, hour, 0, 0).unwrap()
    }

    /// A store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                message: "read-only".into(),
            })
        }
    }

    #[test]
    fn empty_store_loads_empty() {
        let repo = SavedSelections::load(Arc::new(MemoryStore::new()));
        assert!(repo.list().is_empty());
    }

    #[test]
    fn malformed_state_loads_empty() {
        let store = MemoryStore::new();
        store.set(SAVED_SELECTIONS_KEY, r#"{"not":"a list"}"#).unwrap();
        let repo = SavedSelections::load(Arc::new(store));
        assert!(repo.list().is_empty());
    }

    #[test]
    fn save_persists_and_publishes() {
        let store = Arc::new(MemoryStore::new());
        let repo = SavedSelections::load(store.clone());
        let mut rx = repo.subscribe();

        let outcome = repo
            .save_at(record("de:09162:6", SelectedLines::All), at(8))
            .unwrap();
        assert!(outcome.is_changed());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        let raw = store.get(SAVED_SELECTIONS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"lines\":\"all\""));
        assert_eq!(repo.get("de:09162:6").unwrap().saved_at, at(8));
    }

    #[test]
    fn unchanged_save_does_not_publish() {
        let repo = SavedSelections::load(Arc::new(MemoryStore::new()));
        repo.save_at(record("a", SelectedLines::All), at(8)).unwrap();
        let mut rx = repo.subscribe();
        rx.borrow_and_update();

        let outcome = repo.save_at(record("a", SelectedLines::All), at(9)).unwrap();

        assert_eq!(outcome, SaveOutcome::Unchanged);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(repo.get("a").unwrap().saved_at, at(8));
    }

    #[test]
    fn failed_write_changes_nothing() {
        let repo = SavedSelections::load(Arc::new(ReadOnlyStore));
        let rx = repo.subscribe();

        assert!(repo.save(record("a", SelectedLines::All)).is_err());
        assert!(repo.list().is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn remove_deletes_entry() {
        let repo = SavedSelections::load(Arc::new(MemoryStore::new()));
        repo.save(record("a", SelectedLines::All)).unwrap();
        repo.save(record("b", SelectedLines::All)).unwrap();

        assert!(repo.remove("a").unwrap());
        assert!(!repo.remove("a").unwrap());
        let ids: Vec<_> = repo.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["b"]);
    }

    #[test]
    fn reload_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("selections.json");
        let lines = SelectedLines::Explicit(vec![LineId::new("swm:03134:G:H:015")]);

        let repo = SavedSelections::load(Arc::new(JsonFileStore::new(&path)));
        repo.save_at(record("de:09162:6", lines.clone()), at(8)).unwrap();

        let reloaded = SavedSelections::load(Arc::new(JsonFileStore::new(&path)));
        let list = reloaded.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].lines, lines);
        assert_eq!(list[0].saved_at, at(8));
    }

    #[test]
    fn corrupt_file_recovers_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("selections.json");
        std::fs::write(&path, "{ broken").unwrap();

        let repo = SavedSelections::load(Arc::new(JsonFileStore::new(&path)));
        assert!(repo.list().is_empty());
        repo.save_at(record("de:09162:6", SelectedLines::All), at(8))
            .unwrap();

        let reloaded = SavedSelections::load(Arc::new(JsonFileStore::new(&path)));
        let ids: Vec<_> = reloaded.list().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["de:09162:6"]);
    }
}
