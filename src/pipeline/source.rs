// src/pipeline/source.rs

//! Cohort enumeration: the fan-out collaborator.
//!
//! A wrapper task's dependency list is computed from this source during
//! graph expansion, once per build. An unavailable source surfaces as a
//! `DependencyError`, which fails that branch of the graph without aborting
//! unrelated branches.

use std::fs;
use std::path::PathBuf;

use crate::errors::DependencyError;

/// Enumerates the cohorts a fan-out task expands into.
pub trait CohortSource: Send + Sync {
    fn cohorts(&self) -> Result<Vec<String>, DependencyError>;
}

/// Fixed cohort list (configuration override, dev runs, tests).
#[derive(Debug, Clone)]
pub struct FixedCohorts(pub Vec<String>);

impl CohortSource for FixedCohorts {
    fn cohorts(&self) -> Result<Vec<String>, DependencyError> {
        Ok(self.0.clone())
    }
}

/// Reads cohort ids from a reference file, one id per line. Blank lines and
/// `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct FileCohortSource {
    path: PathBuf,
}

impl FileCohortSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CohortSource for FileCohortSource {
    fn cohorts(&self) -> Result<Vec<String>, DependencyError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            DependencyError::msg(format!(
                "cohort list {} unavailable: {e}",
                self.path.display()
            ))
        })?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cohorts.txt");
        fs::write(&path, "# cohort ids\nACC\n\nCHOL\n").unwrap();

        let source = FileCohortSource::new(&path);
        assert_eq!(source.cohorts().unwrap(), vec!["ACC", "CHOL"]);
    }

    #[test]
    fn missing_file_is_a_dependency_error() {
        let source = FileCohortSource::new("/nonexistent/cohorts.txt");
        assert!(source.cohorts().is_err());
    }
}
