// src/store/ledger.rs

//! File-backed completion ledger.
//!
//! One JSON record file per identity key under a ledger directory. The
//! insert path writes the full record to a temp file and then hard-links it
//! to its final name: link creation is atomic and fails with `AlreadyExists`
//! if another worker claimed the key first, which is the ledger's uniqueness
//! constraint. There is no check-then-insert window.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::debug;

use crate::errors::StoreError;
use crate::store::{CompletionRecord, CompletionStore, InsertOutcome};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Durable completion store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileLedger {
    dir: PathBuf,
}

impl FileLedger {
    /// Open (creating if needed) a ledger directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record file for a key. Keys are free text, so the file name is a hash
    /// of the key; the key itself lives inside the record.
    fn record_path(&self, identity_key: &str) -> PathBuf {
        let hash = blake3::hash(identity_key.as_bytes()).to_hex();
        self.dir.join(format!("{}.json", &hash.as_str()[..32]))
    }

    fn tmp_path(&self) -> PathBuf {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".insert-{}-{}.tmp", std::process::id(), n))
    }
}

impl CompletionStore for FileLedger {
    fn contains(&self, identity_key: &str) -> Result<bool, StoreError> {
        Ok(self.record_path(identity_key).exists())
    }

    fn insert(
        &self,
        identity_key: &str,
        target_location: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let record = CompletionRecord {
            identity_key: identity_key.to_string(),
            target_location: target_location.to_string(),
            completed_at: Utc::now(),
        };

        let tmp = self.tmp_path();
        let body = serde_json::to_vec_pretty(&record).map_err(std::io::Error::from)?;
        fs::write(&tmp, body)?;

        let outcome = match fs::hard_link(&tmp, self.record_path(identity_key)) {
            Ok(()) => Ok(InsertOutcome::Inserted),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(key = %identity_key, "ledger record already present; keeping existing");
                Ok(InsertOutcome::AlreadyComplete)
            }
            Err(e) => Err(StoreError::Io(e)),
        };

        let _ = fs::remove_file(&tmp);
        outcome
    }

    fn records(&self) -> Result<Vec<CompletionRecord>, StoreError> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let contents = fs::read_to_string(&path)?;
                let record: CompletionRecord =
                    serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                        path: path.display().to_string(),
                        source,
                    })?;
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.identity_key.cmp(&b.identity_key));
        Ok(records)
    }

    fn remove(&self, identity_key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.record_path(identity_key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
