// tests/pipeline_end_to_end.rs

//! Full pipeline run against real reference files, the TSV sink, and the
//! file-backed ledger.

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio::time::{Duration, timeout};

use dagrun::exec::run_tasks;
use dagrun::pipeline::{FixedCohorts, LoadAllCohorts, PipelineContext, TsvDirSink};
use dagrun::store::{CompletionStore, FileLedger};
use dagrun::task::Task;

type TestResult = Result<(), Box<dyn Error>>;

const RUN_TIMEOUT: Duration = Duration::from_secs(10);

fn write_reference(dir: &Path, cohorts: &[&str]) -> std::io::Result<()> {
    fs::create_dir_all(dir.join("clinical"))?;
    fs::create_dir_all(dir.join("profiles"))?;

    fs::write(dir.join("samples.csv"), "sample_id,cohort\ns1,ACC\ns2,CHOL\n")?;

    for cohort in cohorts {
        fs::write(
            dir.join("clinical").join(format!("{cohort}.csv")),
            "patient_id,parameter,value\np1,age,61\n",
        )?;
        for data_type in ["expression", "copy_number"] {
            fs::write(
                dir.join("profiles").join(format!("{cohort}.{data_type}.csv")),
                "sample_id,gene,value\ns1,TP53,7.2\n",
            )?;
        }
    }
    Ok(())
}

fn pipeline_ctx(root: &Path, cohorts: &[&str]) -> PipelineContext {
    PipelineContext {
        reference: root.join("reference"),
        sink: Arc::new(TsvDirSink::new(root.join("out"))),
        cohorts: Arc::new(FixedCohorts(cohorts.iter().map(|c| c.to_string()).collect())),
    }
}

#[tokio::test]
async fn load_all_cohorts_writes_every_partition_and_ledger_record() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_reference(&dir.path().join("reference"), &["ACC", "CHOL"])?;

    let ctx = pipeline_ctx(dir.path(), &["ACC", "CHOL"]);
    let root: Arc<dyn Task> = Arc::new(LoadAllCohorts::new(ctx));
    let store = Arc::new(FileLedger::open(dir.path().join("ledger"))?);

    let report = timeout(RUN_TIMEOUT, run_tasks(vec![root], store.clone(), 2)).await??;

    // sample meta + 2 cohorts x (1 clinical + 2 profiles) + the wrapper.
    assert_eq!(report.succeeded.len(), 8);
    assert!(report.is_success());

    let out = dir.path().join("out");
    assert!(out.join("sample/all.tsv").exists());
    assert!(out.join("patient_value/ACC.tsv").exists());
    assert!(out.join("patient_value/CHOL.tsv").exists());
    assert!(out.join("sample_gene_value/ACC.expression.tsv").exists());
    assert!(out.join("sample_gene_value/CHOL.copy_number.tsv").exists());

    let records = store.records()?;
    assert_eq!(records.len(), 8);
    assert!(records.iter().any(|r| r.identity_key == "sample metadata"));
    assert!(records.iter().any(|r| r.identity_key == "clinical ACC"));
    assert!(records.iter().any(|r| r.identity_key == "all cohorts"));
    Ok(())
}

#[tokio::test]
async fn excluded_cohorts_never_produce_tasks() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_reference(&dir.path().join("reference"), &["ACC"])?;

    // MISC is present in the enumeration but must be filtered out; no
    // reference files exist for it, so a task for it would fail loudly.
    let ctx = pipeline_ctx(dir.path(), &["ACC", "MISC", "CNTL"]);
    let root: Arc<dyn Task> = Arc::new(LoadAllCohorts::new(ctx));
    let store = Arc::new(FileLedger::open(dir.path().join("ledger"))?);

    let report = timeout(RUN_TIMEOUT, run_tasks(vec![root], store, 1)).await??;

    assert!(report.is_success());
    assert_eq!(report.succeeded.len(), 5);
    assert!(
        report
            .succeeded
            .iter()
            .all(|id| !id.to_string().contains("MISC") && !id.to_string().contains("CNTL"))
    );
    Ok(())
}

#[tokio::test]
async fn interrupted_run_resumes_where_it_left_off() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    write_reference(&dir.path().join("reference"), &["ACC"])?;

    let store = Arc::new(FileLedger::open(dir.path().join("ledger"))?);

    // Simulate an earlier run that completed only the clinical load.
    store.insert("sample metadata", "sample")?;
    store.insert("clinical ACC", "patient_value")?;

    let ctx = pipeline_ctx(dir.path(), &["ACC"]);
    let root: Arc<dyn Task> = Arc::new(LoadAllCohorts::new(ctx));
    let report = timeout(RUN_TIMEOUT, run_tasks(vec![root], store.clone(), 1)).await??;

    assert!(report.is_success());
    assert_eq!(report.skipped.len(), 2);
    // Both profile loads and the wrapper still ran.
    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(store.records()?.len(), 5);
    Ok(())
}
