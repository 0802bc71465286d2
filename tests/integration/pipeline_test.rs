use std::fs;

use ehr_cohort::models::Label;
use ehr_cohort::writer::PART_FILE_NAME;
use ehr_cohort::{Error, HeartFailurePipeline, PipelineConfig, read_dataset};
use tempfile::TempDir;

use crate::utils::{cohort_config, scenario};

fn pipeline(input: &TempDir, output: &TempDir) -> HeartFailurePipeline {
    HeartFailurePipeline::new(PipelineConfig::new(
        input.path(),
        output.path(),
        cohort_config("2019-01-01"),
    ))
}

#[tokio::test]
async fn test_pipeline_writes_labeled_sequences() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    scenario().write(input.path());

    let summary = pipeline(&input, &output).run().await.unwrap();
    assert_eq!(summary.cohort.cases, 1);
    assert_eq!(summary.cohort.controls, 1);
    assert_eq!(summary.cohort.age_excluded(), 1);
    assert_eq!(summary.selected_events, 5);
    assert_eq!(summary.rows_written, 2);

    let dataset = read_dataset(&output.path().join("heart_failure")).unwrap();
    let rows: Vec<_> = dataset
        .iter()
        .map(|s| (s.person_id, s.label, s.len()))
        .collect();
    assert_eq!(
        rows,
        vec![(1, Some(Label::Case), 3), (2, Some(Label::Control), 2)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pipeline_on_multi_thread_runtime() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    scenario().write(input.path());

    let summary = pipeline(&input, &output).run().await.unwrap();

    assert_eq!(summary.rows_written, 2);
    assert!(output.path().join("heart_failure").join(PART_FILE_NAME).is_file());
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    scenario().write(input.path());
    let part = output.path().join("heart_failure").join(PART_FILE_NAME);

    pipeline(&input, &output).run().await.unwrap();
    let first = fs::read(&part).unwrap();
    pipeline(&input, &output).run().await.unwrap();
    let second = fs::read(&part).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_table_fails_without_output() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    scenario().write_except(input.path(), &["drug_exposure"]);

    let err = pipeline(&input, &output).run().await.unwrap_err();
    match err {
        Error::MissingTable { table, .. } => assert_eq!(table, "drug_exposure"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.path().join("heart_failure").exists());
}

#[tokio::test]
async fn test_invalid_config_fails_before_reading() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    scenario().write(input.path());

    let config = PipelineConfig::new(
        input.path(),
        output.path(),
        cohort_config("2019-01-01").with_age_bounds(80, 10),
    );
    let err = HeartFailurePipeline::new(config).run().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(fs::read_dir(output.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_custom_dataset_name() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    scenario().write(input.path());

    let config = PipelineConfig::new(input.path(), output.path(), cohort_config("2019-01-01"))
        .with_dataset_name("hf_2019")
        .with_batch_size(2);
    HeartFailurePipeline::new(config).run().await.unwrap();

    assert_eq!(read_dataset(&output.path().join("hf_2019")).unwrap().len(), 2);
}
