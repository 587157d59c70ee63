// src/pipeline/mod.rs

//! Reference data-loading pipeline built on the orchestrator core.
//!
//! The core treats these as opaque collaborators: [`source`] enumerates
//! cohorts for fan-out, [`sink`] accepts row batches keyed by table, and
//! [`tasks`] defines the loading task shapes and registers their factories.

pub mod sink;
pub mod source;
pub mod tasks;

pub use sink::{MemorySink, RowSink, TsvDirSink};
pub use source::{CohortSource, FileCohortSource, FixedCohorts};
pub use tasks::{
    LoadAllCohorts, LoadCohortClinical, LoadCohortProfile, LoadSampleMeta, PipelineContext,
    register,
};
