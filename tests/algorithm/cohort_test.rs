use ehr_cohort::CohortConfig;
use ehr_cohort::algorithm::cohort::{
    Cohort, CohortBuilder, heart_failure_visits, partition_patients, qualifying_visits,
};
use ehr_cohort::config::ConceptSet;
use ehr_cohort::models::Label;
use ehr_cohort::tables::OmopTables;
use rustc_hash::FxHashSet;

use crate::utils::{
    HF_CONCEPT, HYPERTENSION, INPATIENT, OmopFixture, cohort_config, date, scenario,
};

fn build(config: &CohortConfig, tables: &OmopTables) -> Cohort {
    CohortBuilder::new(config).build(&tables.persons, &tables.visits, &tables.conditions)
}

#[test]
fn test_case_and_control_scenarios() {
    let tables = scenario().tables();
    let config = cohort_config("2019-01-01");
    let cohort = build(&config, &tables);

    let records: Vec<_> = cohort
        .records
        .iter()
        .map(|r| (r.person_id, r.visit_occurrence_id, r.index_date, r.label, r.age))
        .collect();
    assert_eq!(
        records,
        vec![
            (1, 100, date("2020-01-01"), Label::Case, Some(60)),
            (2, 201, date("2020-06-01"), Label::Control, Some(50)),
        ]
    );

    let stats = cohort.statistics;
    assert_eq!(stats.qualifying_visits, 7);
    assert_eq!(stats.heart_failure_visits, 1);
    assert_eq!(stats.candidate_cases, 1);
    assert_eq!(stats.candidate_controls, 2);
    assert_eq!(stats.age_excluded(), 1);
    assert_eq!(stats.cohort_size(), 2);
}

#[test]
fn test_patients_are_never_both_case_and_control() {
    let tables = scenario()
        .visit(500, 5, INPATIENT, "2019-05-01")
        .visit(501, 5, INPATIENT, "2021-05-01")
        .condition(5, Some(501), HF_CONCEPT, "2021-05-01")
        .person(5, 1950)
        .tables();
    let config = cohort_config("2019-01-01");
    let qualifying = qualifying_visits(&tables.visits, &config.visit_concepts);
    let hf =
        heart_failure_visits(&qualifying, &tables.conditions, &config.heart_failure_concepts);
    let partition = partition_patients(&qualifying, &hf, config.date_filter);

    let cases: FxHashSet<i64> = partition.cases.iter().map(|r| r.person_id).collect();
    let controls: FxHashSet<i64> = partition.controls.iter().map(|r| r.person_id).collect();
    assert!(cases.is_disjoint(&controls));
    assert!(cases.contains(&5));
    assert_eq!(
        partition
            .cases
            .iter()
            .find(|r| r.person_id == 5)
            .map(|r| r.visit_occurrence_id),
        Some(501)
    );
}

#[test]
fn test_earliest_heart_failure_visit_is_the_index() {
    let tables = OmopFixture::new()
        .person(1, 1960)
        .visit(12, 1, INPATIENT, "2021-03-01")
        .visit(11, 1, INPATIENT, "2020-03-01")
        .visit(10, 1, INPATIENT, "2018-03-01")
        .condition(1, Some(10), HF_CONCEPT, "2018-03-01")
        .condition(1, Some(11), HF_CONCEPT, "2020-03-01")
        .condition(1, Some(12), HF_CONCEPT, "2021-03-01")
        .tables();
    let config = cohort_config("2019-01-01");
    let cohort = build(&config, &tables);

    assert_eq!(cohort.len(), 1);
    assert_eq!(cohort.records[0].visit_occurrence_id, 11);
    assert_eq!(cohort.records[0].index_date, date("2020-03-01"));
}

#[test]
fn test_heart_failure_before_cutoff_excludes_patient() {
    let tables = OmopFixture::new()
        .person(1, 1960)
        .visit(10, 1, INPATIENT, "2018-03-01")
        .visit(11, 1, INPATIENT, "2020-03-01")
        .condition(1, Some(10), HF_CONCEPT, "2018-03-01")
        .condition(1, Some(11), HYPERTENSION, "2020-03-01")
        .tables();
    let config = cohort_config("2019-01-01");
    let cohort = build(&config, &tables);

    assert!(cohort.is_empty());
}

#[test]
fn test_custom_vocabulary_changes_eligibility() {
    let tables = scenario().tables();
    let config = cohort_config("2019-01-01")
        .with_heart_failure_concepts(ConceptSet::new("hypertension", [HYPERTENSION]));
    let cohort = build(&config, &tables);

    // hypertension visits now count as heart-failure visits
    let cases: Vec<_> = cohort.with_label(Label::Case).map(|r| r.person_id).collect();
    assert_eq!(cases, vec![1, 2]);
    assert_eq!(cohort.records[0].visit_occurrence_id, 101);
    assert_eq!(cohort.records[1].visit_occurrence_id, 200);
    assert_eq!(cohort.with_label(Label::Control).count(), 0);
}

#[test]
fn test_age_bounds_are_inclusive() {
    let tables = scenario().tables();
    let config = cohort_config("2019-01-01").with_age_bounds(50, 60);
    let cohort = build(&config, &tables);

    assert_eq!(cohort.len(), 2);
    assert!(cohort.records.iter().all(|r| matches!(r.age, Some(50..=60))));

    let config = cohort_config("2019-01-01").with_age_bounds(51, 59);
    let cohort = build(&config, &tables);
    assert!(cohort.is_empty());
}
