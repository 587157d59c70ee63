// src/store/memory.rs

//! In-memory completion store for tests and dev runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::errors::StoreError;
use crate::store::{CompletionRecord, CompletionStore, InsertOutcome};

/// `Mutex<BTreeMap>`-backed completion store. The map lock serialises
/// inserts, which stands in for a real store's uniqueness constraint.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, CompletionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held (test helper).
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CompletionStore for MemoryStore {
    fn contains(&self, identity_key: &str) -> Result<bool, StoreError> {
        let records = self.records.lock().expect("store lock poisoned");
        Ok(records.contains_key(identity_key))
    }

    fn insert(
        &self,
        identity_key: &str,
        target_location: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");

        if records.contains_key(identity_key) {
            return Ok(InsertOutcome::AlreadyComplete);
        }

        records.insert(
            identity_key.to_string(),
            CompletionRecord {
                identity_key: identity_key.to_string(),
                target_location: target_location.to_string(),
                completed_at: Utc::now(),
            },
        );

        Ok(InsertOutcome::Inserted)
    }

    fn records(&self) -> Result<Vec<CompletionRecord>, StoreError> {
        let records = self.records.lock().expect("store lock poisoned");
        Ok(records.values().cloned().collect())
    }

    fn remove(&self, identity_key: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        Ok(records.remove(identity_key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let store = MemoryStore::new();

        assert_eq!(
            store.insert("clinical ACC", "patient_value").unwrap(),
            InsertOutcome::Inserted
        );
        let first = store.records().unwrap()[0].clone();

        assert_eq!(
            store.insert("clinical ACC", "patient_value").unwrap(),
            InsertOutcome::AlreadyComplete
        );

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        // Timestamp must not have been overwritten.
        assert_eq!(records[0].completed_at, first.completed_at);
    }

    #[test]
    fn remove_forces_incompleteness() {
        let store = MemoryStore::new();
        store.insert("clinical ACC", "patient_value").unwrap();

        assert!(store.contains("clinical ACC").unwrap());
        assert!(store.remove("clinical ACC").unwrap());
        assert!(!store.contains("clinical ACC").unwrap());
        assert!(!store.remove("clinical ACC").unwrap());
    }
}
