// src/store/mod.rs

//! Completion store: the durable ledger of completed targets.
//!
//! One record per completed target, keyed by its identity key. Insertion is
//! append-only; a record's timestamp is set once and never updated. An
//! operator may remove a record to force a re-run of the corresponding task.

pub mod ledger;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub use ledger::FileLedger;
pub use memory::MemoryStore;

/// A completion record, one per completed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Unique identity of the logical deliverable, e.g. `"clinical ACC"`.
    pub identity_key: String,
    /// Informational: the table/partition (or URI) the completion refers to.
    pub target_location: String,
    /// Set once at insert time.
    pub completed_at: DateTime<Utc>,
}

/// Outcome of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new record was written.
    Inserted,
    /// A record for this key already existed; the existing timestamp is kept.
    /// Expected outcome when two workers race to complete the same target.
    AlreadyComplete,
}

/// Durable key-value record of completed units of work.
///
/// `contains` must be read-only and safe to call concurrently from multiple
/// workers. `insert` must be atomic with respect to concurrent `contains` /
/// `insert` calls on the same key: implementations rely on their native
/// uniqueness constraint rather than check-then-insert.
pub trait CompletionStore: Send + Sync {
    /// Whether a record for `identity_key` is present.
    fn contains(&self, identity_key: &str) -> Result<bool, StoreError>;

    /// Insert a completion record for `identity_key`. A duplicate insert is
    /// reported as [`InsertOutcome::AlreadyComplete`], never as an error and
    /// never by overwriting the existing timestamp.
    fn insert(&self, identity_key: &str, target_location: &str)
    -> Result<InsertOutcome, StoreError>;

    /// All records, sorted by identity key (operator listing).
    fn records(&self) -> Result<Vec<CompletionRecord>, StoreError>;

    /// Remove the record for `identity_key`, forcing a re-run of the
    /// corresponding task. Returns whether a record was present.
    fn remove(&self, identity_key: &str) -> Result<bool, StoreError>;
}
