// src/target.rs

//! Targets: references to logical data products.
//!
//! A [`Target`] is a cheap value object created fresh each time a task is
//! instantiated. Its completion state lives externally, in the completion
//! store or on the filesystem; the target is a reference, never the source
//! of truth. The scheduler interprets targets against an explicit
//! [`CompletionStore`] handle so that test doubles need no global state.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::StoreError;
use crate::store::{CompletionStore, InsertOutcome};

/// Reference to a named logical data product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Completion is recorded in the completion store; `table` is the
    /// logical table/partition the completion marker refers to (purely
    /// informational, recorded as the record's `target_location`).
    Stored { identity_key: String, table: String },

    /// Completion is the presence of the external resource itself (file
    /// exists and is non-empty). `mark_complete` is a no-op.
    External { identity_key: String, path: PathBuf },
}

impl Target {
    pub fn stored(identity_key: impl Into<String>, table: impl Into<String>) -> Self {
        Target::Stored {
            identity_key: identity_key.into(),
            table: table.into(),
        }
    }

    pub fn external(identity_key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Target::External {
            identity_key: identity_key.into(),
            path: path.into(),
        }
    }

    pub fn identity_key(&self) -> &str {
        match self {
            Target::Stored { identity_key, .. } | Target::External { identity_key, .. } => {
                identity_key
            }
        }
    }

    /// Whether this target already reports complete. Read-only, safe to call
    /// concurrently from multiple workers.
    pub fn exists(&self, store: &dyn CompletionStore) -> Result<bool, StoreError> {
        match self {
            Target::Stored { identity_key, .. } => store.contains(identity_key),
            Target::External { path, .. } => match std::fs::metadata(path) {
                Ok(meta) => Ok(meta.len() > 0),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(StoreError::Io(e)),
            },
        }
    }

    /// Mark this target complete. Losing a race to another worker is a
    /// no-op: completion is idempotent at the key level.
    pub fn mark_complete(&self, store: &dyn CompletionStore) -> Result<(), StoreError> {
        match self {
            Target::Stored {
                identity_key,
                table,
            } => {
                match store.insert(identity_key, table)? {
                    InsertOutcome::Inserted => {
                        debug!(key = %identity_key, table = %table, "marked target complete");
                    }
                    InsertOutcome::AlreadyComplete => {
                        debug!(key = %identity_key, "target already marked complete");
                    }
                }
                Ok(())
            }
            // The resource itself is the completion marker.
            Target::External { .. } => Ok(()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Stored {
                identity_key,
                table,
            } => write!(f, "stored '{identity_key}' -> {table}"),
            Target::External { identity_key, path } => {
                write!(f, "external '{identity_key}' -> {}", path.display())
            }
        }
    }
}
