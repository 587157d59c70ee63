// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DagrunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DagrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.core, raw.pipeline))
    }
}

fn validate_raw_config(raw: &RawConfigFile) -> Result<()> {
    if raw.core.concurrency == 0 {
        return Err(DagrunError::Config(
            "[core].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    if raw.core.ledger.as_os_str().is_empty() {
        return Err(DagrunError::Config(
            "[core].ledger must not be empty".to_string(),
        ));
    }

    for spec in &raw.core.roots {
        if spec.trim().is_empty() {
            return Err(DagrunError::Config(
                "[core].roots entries must not be empty".to_string(),
            ));
        }
    }

    for cohort in &raw.pipeline.cohorts {
        if cohort.trim().is_empty() {
            return Err(DagrunError::Config(
                "[pipeline].cohorts entries must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_concurrency_is_rejected() {
        let raw: RawConfigFile = toml::from_str("[core]\nconcurrency = 0\n").unwrap();
        let res = ConfigFile::try_from(raw);
        assert!(matches!(res, Err(DagrunError::Config(_))));
    }

    #[test]
    fn default_config_validates() {
        let raw = RawConfigFile::default();
        assert!(ConfigFile::try_from(raw).is_ok());
    }
}
