// src/pipeline/sink.rs

//! Row sinks.
//!
//! The core never interprets row content; work functions push row batches
//! keyed by `(table, partition)` with replace semantics, which is what makes
//! them safe to re-run after a partial write.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::errors::WorkError;

pub type Row = Vec<String>;

/// Accepts row batches keyed by table name.
pub trait RowSink: Send + Sync {
    /// Replace the contents of `(table, partition)` with `rows`. Calling
    /// this twice with the same keys must leave the same state as calling
    /// it once.
    fn replace(&self, table: &str, partition: &str, rows: &[Row]) -> Result<(), WorkError>;
}

/// In-memory sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<BTreeMap<(String, String), Vec<Row>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str, partition: &str) -> Option<Vec<Row>> {
        let tables = self.tables.lock().expect("sink lock poisoned");
        tables.get(&(table.to_string(), partition.to_string())).cloned()
    }

    pub fn partition_count(&self) -> usize {
        self.tables.lock().expect("sink lock poisoned").len()
    }
}

impl RowSink for MemorySink {
    fn replace(&self, table: &str, partition: &str, rows: &[Row]) -> Result<(), WorkError> {
        let mut tables = self.tables.lock().expect("sink lock poisoned");
        tables.insert((table.to_string(), partition.to_string()), rows.to_vec());
        Ok(())
    }
}

/// Writes each `(table, partition)` batch as a TSV file under
/// `{dir}/{table}/{partition}.tsv`, truncating any previous contents.
#[derive(Debug, Clone)]
pub struct TsvDirSink {
    dir: PathBuf,
}

impl TsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RowSink for TsvDirSink {
    fn replace(&self, table: &str, partition: &str, rows: &[Row]) -> Result<(), WorkError> {
        let table_dir = self.dir.join(table);
        fs::create_dir_all(&table_dir)?;

        let path = table_dir.join(format!("{partition}.tsv"));
        let mut file = std::io::BufWriter::new(fs::File::create(&path)?);
        for row in rows {
            writeln!(file, "{}", row.join("\t"))?;
        }
        file.flush()?;

        debug!(table, partition, rows = rows.len(), path = %path.display(), "wrote batch");
        Ok(())
    }
}
