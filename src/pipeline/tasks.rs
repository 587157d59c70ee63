// src/pipeline/tasks.rs

//! Loading task shapes.
//!
//! Each task reads a reference dataset and pushes rows to the sink; its
//! stored target keys the completion ledger. Parametrized tasks fan out per
//! cohort via [`LoadAllCohorts`], whose dependency list is enumerated from
//! the cohort source at graph-build time.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{DependencyError, WorkError};
use crate::pipeline::sink::{Row, RowSink};
use crate::pipeline::source::CohortSource;
use crate::target::Target;
use crate::task::{Parameters, Task, TaskId, TaskRegistry};

/// Identifiers present in cohort metadata that are not loadable cohorts.
const EXCLUDED_COHORTS: &[&str] = &["LCML", "FPPP", "CNTL", "MISC"];

/// Profile data types loaded per cohort.
const PROFILE_DATA_TYPES: &[&str] = &["expression", "copy number"];

/// Shared collaborators handed to every pipeline task.
#[derive(Clone)]
pub struct PipelineContext {
    pub reference: PathBuf,
    pub sink: Arc<dyn RowSink>,
    pub cohorts: Arc<dyn CohortSource>,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// Parse a comma-separated reference file, skipping the header row.
///
/// Reference files are plain matrices without quoting, so a bare split is
/// enough.
fn read_table(path: &Path) -> Result<Vec<Row>, WorkError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| WorkError::msg(format!("cannot read {}: {e}", path.display())))?;

    Ok(contents
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect())
}

/// Loads sample metadata shared by every cohort task.
pub struct LoadSampleMeta {
    ctx: PipelineContext,
    params: Parameters,
}

impl LoadSampleMeta {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            params: Parameters::new(),
        }
    }
}

impl Task for LoadSampleMeta {
    fn name(&self) -> &str {
        "load-sample-meta"
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn output(&self) -> Target {
        Target::stored("sample metadata", "sample")
    }

    fn run(&self) -> Result<(), WorkError> {
        let rows = read_table(&self.ctx.reference.join("samples.csv"))?;
        self.ctx.sink.replace("sample", "all", &rows)
    }
}

/// Loads one cohort's clinical values into `patient_value`.
pub struct LoadCohortClinical {
    ctx: PipelineContext,
    cohort: String,
    params: Parameters,
}

impl LoadCohortClinical {
    pub fn new(ctx: PipelineContext, cohort: impl Into<String>) -> Self {
        let cohort = cohort.into();
        let params = Parameters::new().with("cohort", cohort.clone());
        Self {
            ctx,
            cohort,
            params,
        }
    }
}

impl Task for LoadCohortClinical {
    fn name(&self) -> &str {
        "load-cohort-clinical"
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn dependencies(&self) -> Result<Vec<Arc<dyn Task>>, DependencyError> {
        Ok(vec![Arc::new(LoadSampleMeta::new(self.ctx.clone()))])
    }

    fn output(&self) -> Target {
        Target::stored(format!("clinical {}", self.cohort), "patient_value")
    }

    fn run(&self) -> Result<(), WorkError> {
        let path = self
            .ctx
            .reference
            .join("clinical")
            .join(format!("{}.csv", self.cohort));
        let rows = read_table(&path)?;
        self.ctx.sink.replace("patient_value", &self.cohort, &rows)
    }
}

/// Loads one cohort's molecular profile (expression, copy number, ...) into
/// `sample_gene_value`.
pub struct LoadCohortProfile {
    ctx: PipelineContext,
    cohort: String,
    data_type: String,
    params: Parameters,
}

impl LoadCohortProfile {
    pub fn new(
        ctx: PipelineContext,
        cohort: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        let cohort = cohort.into();
        let data_type = data_type.into();
        let params = Parameters::new()
            .with("cohort", cohort.clone())
            .with("data_type", data_type.clone());
        Self {
            ctx,
            cohort,
            data_type,
            params,
        }
    }

    fn partition(&self) -> String {
        format!("{}.{}", self.cohort, self.data_type.replace(' ', "_"))
    }
}

impl Task for LoadCohortProfile {
    fn name(&self) -> &str {
        "load-cohort-profile"
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn dependencies(&self) -> Result<Vec<Arc<dyn Task>>, DependencyError> {
        Ok(vec![Arc::new(LoadSampleMeta::new(self.ctx.clone()))])
    }

    fn output(&self) -> Target {
        Target::stored(
            format!("{} {}", self.data_type, self.cohort),
            "sample_gene_value",
        )
    }

    fn run(&self) -> Result<(), WorkError> {
        let path = self
            .ctx
            .reference
            .join("profiles")
            .join(format!("{}.csv", self.partition()));
        let rows = read_table(&path)?;
        self.ctx
            .sink
            .replace("sample_gene_value", &self.partition(), &rows)
    }
}

/// Fan-out wrapper: one clinical plus one profile task per data type for
/// every cohort from the enumeration source. The work function itself is a
/// no-op; the task exists to expand the per-cohort subgraph.
pub struct LoadAllCohorts {
    ctx: PipelineContext,
    params: Parameters,
}

impl LoadAllCohorts {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            params: Parameters::new(),
        }
    }
}

impl Task for LoadAllCohorts {
    fn name(&self) -> &str {
        "load-all-cohorts"
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn dependencies(&self) -> Result<Vec<Arc<dyn Task>>, DependencyError> {
        let mut deps: Vec<Arc<dyn Task>> = Vec::new();

        for cohort in self.ctx.cohorts.cohorts()? {
            if EXCLUDED_COHORTS.contains(&cohort.as_str()) {
                continue;
            }

            deps.push(Arc::new(LoadCohortClinical::new(self.ctx.clone(), &cohort)));
            for data_type in PROFILE_DATA_TYPES {
                deps.push(Arc::new(LoadCohortProfile::new(
                    self.ctx.clone(),
                    &cohort,
                    *data_type,
                )));
            }
        }

        Ok(deps)
    }

    fn output(&self) -> Target {
        Target::stored("all cohorts", "patient_value,sample_gene_value")
    }

    fn run(&self) -> Result<(), WorkError> {
        Ok(())
    }
}

/// Register the pipeline task factories.
pub fn register(registry: &mut TaskRegistry, ctx: PipelineContext) {
    {
        let ctx = ctx.clone();
        registry.register("load-sample-meta", move |_params| {
            Ok(Arc::new(LoadSampleMeta::new(ctx.clone())) as Arc<dyn Task>)
        });
    }

    {
        let ctx = ctx.clone();
        registry.register("load-cohort-clinical", move |params: Parameters| {
            let cohort = params
                .get("cohort")
                .ok_or_else(|| DependencyError::MissingParameter("cohort".into()))?;
            Ok(Arc::new(LoadCohortClinical::new(ctx.clone(), cohort)) as Arc<dyn Task>)
        });
    }

    {
        let ctx = ctx.clone();
        registry.register("load-cohort-profile", move |params: Parameters| {
            let cohort = params
                .get("cohort")
                .ok_or_else(|| DependencyError::MissingParameter("cohort".into()))?;
            let data_type = params
                .get("data_type")
                .ok_or_else(|| DependencyError::MissingParameter("data_type".into()))?;
            Ok(Arc::new(LoadCohortProfile::new(ctx.clone(), cohort, data_type)) as Arc<dyn Task>)
        });
    }

    registry.register("load-all-cohorts", move |_params| {
        Ok(Arc::new(LoadAllCohorts::new(ctx.clone())) as Arc<dyn Task>)
    });
}
