use ehr_cohort::training::{
    ConceptSequenceStrategy, LabeledSequenceStrategy, TrainerConfig, TrainingDataLoader,
};
use ehr_cohort::{DatasetWriter, Error, build_dataset};
use tempfile::TempDir;

use crate::utils::{cohort_config, scenario};

fn write_scenario_dataset(output: &TempDir) -> std::path::PathBuf {
    let build = build_dataset(&scenario().tables(), &cohort_config("2019-01-01"));
    let writer = DatasetWriter::new(output.path(), "heart_failure");
    writer.write(&build.sequences).unwrap();
    writer.dataset_path()
}

#[test]
fn test_labeled_strategy_prepares_filtered_examples() {
    let output = TempDir::new().unwrap();
    let path = write_scenario_dataset(&output);

    let config = TrainerConfig::new(&path)
        .with_min_num_of_concepts(3)
        .with_batch_size(1)
        .with_shuffle(false, 0);
    let prepared = TrainingDataLoader::new(config)
        .load(&LabeledSequenceStrategy)
        .unwrap();

    // patient 2 has only two events
    assert_eq!(prepared.examples.len(), 1);
    assert_eq!(prepared.examples[0].person_id, 1);
    assert_eq!(prepared.examples[0].label, 1);
    assert_eq!(prepared.examples[0].tokens, vec![1, 2, 3]);
    assert_eq!(prepared.tokenizer.vocab_size(), 4);
    assert_eq!(prepared.steps_per_epoch, 1);
}

#[test]
fn test_concept_strategy_and_seeded_shuffle() {
    let output = TempDir::new().unwrap();
    let path = write_scenario_dataset(&output);

    let load = |seed| {
        let config = TrainerConfig::new(&path)
            .with_min_num_of_concepts(1)
            .with_batch_size(4)
            .with_shuffle(true, seed);
        TrainingDataLoader::new(config)
            .load(&ConceptSequenceStrategy)
            .unwrap()
    };
    let first = load(7);
    let second = load(7);

    assert_eq!(first.examples, second.examples);
    assert_eq!(first.examples.len(), 2);
    assert_eq!(first.steps_per_epoch, 1);
}

#[test]
fn test_missing_dataset_is_an_error() {
    let output = TempDir::new().unwrap();
    let config = TrainerConfig::new(output.path().join("absent"));
    let err = TrainingDataLoader::new(config)
        .load(&LabeledSequenceStrategy)
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
