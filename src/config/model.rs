// src/config/model.rs

//! Configuration data model.
//!
//! `RawConfigFile` is what `serde` deserializes from `Dagrun.toml`;
//! [`ConfigFile`] is the validated form the rest of the application uses
//! (conversion in [`validate`](crate::config::validate)).

use std::path::PathBuf;

use serde::Deserialize;

/// `[core]` section: orchestrator settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreSection {
    /// Directory holding the completion ledger.
    #[serde(default = "default_ledger")]
    pub ledger: PathBuf,

    /// Worker pool size. 1 gives strict sequential semantics.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Root task specs run when `dagrun run` is invoked without arguments,
    /// e.g. `["load-all-cohorts"]` or `["load-cohort-clinical:cohort=ACC"]`.
    #[serde(default)]
    pub roots: Vec<String>,
}

fn default_ledger() -> PathBuf {
    PathBuf::from(".dagrun/ledger")
}

fn default_concurrency() -> usize {
    1
}

impl Default for CoreSection {
    fn default() -> Self {
        Self {
            ledger: default_ledger(),
            concurrency: default_concurrency(),
            roots: Vec::new(),
        }
    }
}

/// `[pipeline]` section: collaborator locations for the data-loading tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Directory of reference datasets the work functions read from.
    #[serde(default = "default_reference")]
    pub reference: PathBuf,

    /// Directory the table sink writes to.
    #[serde(default = "default_out")]
    pub out: PathBuf,

    /// Fixed cohort list. When empty, cohorts are enumerated from
    /// `{reference}/cohorts.txt` (one id per line).
    #[serde(default)]
    pub cohorts: Vec<String>,
}

fn default_reference() -> PathBuf {
    PathBuf::from("reference")
}

fn default_out() -> PathBuf {
    PathBuf::from("out")
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            reference: default_reference(),
            out: default_out(),
            cohorts: Vec::new(),
        }
    }
}

/// Raw configuration as deserialized from TOML, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub core: CoreSection,

    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub core: CoreSection,
    pub pipeline: PipelineSection,
}

impl ConfigFile {
    /// Construct without validation; used by [`TryFrom<RawConfigFile>`] and
    /// test builders.
    pub fn new_unchecked(core: CoreSection, pipeline: PipelineSection) -> Self {
        Self { core, pipeline }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_empty_config() {
        let raw: RawConfigFile = toml::from_str("").unwrap();
        assert_eq!(raw.core.concurrency, 1);
        assert_eq!(raw.core.ledger, PathBuf::from(".dagrun/ledger"));
        assert!(raw.pipeline.cohorts.is_empty());
    }

    #[test]
    fn sections_parse() {
        let raw: RawConfigFile = toml::from_str(
            r#"
            [core]
            ledger = "/var/lib/dagrun/ledger"
            concurrency = 4
            roots = ["load-all-cohorts"]

            [pipeline]
            reference = "/data/reference"
            cohorts = ["ACC", "CHOL"]
            "#,
        )
        .unwrap();

        assert_eq!(raw.core.concurrency, 4);
        assert_eq!(raw.core.roots, vec!["load-all-cohorts"]);
        assert_eq!(raw.pipeline.cohorts, vec!["ACC", "CHOL"]);
        assert_eq!(raw.pipeline.out, PathBuf::from("out"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<RawConfigFile, _> = toml::from_str("[core]\nworkers = 4\n");
        assert!(res.is_err());
    }
}
