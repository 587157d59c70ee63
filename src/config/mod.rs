// src/config/mod.rs

//! `Dagrun.toml` configuration: raw deserialization, validation, loading.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate};
pub use model::{ConfigFile, CoreSection, PipelineSection};
