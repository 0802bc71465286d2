use chrono::Days;
use ehr_cohort::models::{Domain, Label};
use ehr_cohort::{CohortConfig, build_dataset};

use crate::utils::{
    HF_CONCEPT, HYPERTENSION, INPATIENT, OmopFixture, cohort_config, date, scenario,
};

fn concepts_of(build: &ehr_cohort::DatasetBuild, person_id: i64) -> Vec<(i64, Domain)> {
    build
        .sequences
        .iter()
        .find(|s| s.person_id == person_id)
        .map(|s| {
            s.events
                .iter()
                .map(|e| (e.standard_concept_id, e.domain))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_buffer_window_scenario() {
    let build = build_dataset(&scenario().tables(), &cohort_config("2019-01-01"));

    let case = build.sequences.iter().find(|s| s.person_id == 1).unwrap();
    assert_eq!(case.label, Some(Label::Case));
    // 2019-09-01 is kept, 2019-11-01 falls inside the buffer
    assert!(case.events.iter().all(|e| e.date == date("2019-09-01")));
    assert_eq!(
        concepts_of(&build, 1),
        vec![
            (HYPERTENSION, Domain::Condition),
            (1_112_807, Domain::Drug),
            (4_230_911, Domain::Procedure),
        ]
    );
    assert_eq!(build.selected_events, 5);
}

#[test]
fn test_no_event_leaks_past_cutoff_or_from_index_visit() {
    let config = cohort_config("2019-01-01");
    let build = build_dataset(&scenario().tables(), &config);

    for sequence in &build.sequences {
        let record = build
            .cohort
            .records
            .iter()
            .find(|r| r.person_id == sequence.person_id)
            .unwrap();
        let cutoff = record
            .index_date
            .checked_sub_days(Days::new(u64::from(config.buffer_period_days)))
            .unwrap();
        for event in &sequence.events {
            assert!(event.date <= cutoff);
            assert_ne!(event.visit_occurrence_id, record.visit_occurrence_id);
        }
    }
}

#[test]
fn test_age_excluded_patient_has_no_sequence() {
    let build = build_dataset(&scenario().tables(), &cohort_config("2019-01-01"));
    let persons: Vec<i64> = build.sequences.iter().map(|s| s.person_id).collect();
    assert_eq!(persons, vec![1, 2]);
}

#[test]
fn test_cohort_member_without_history_is_dropped() {
    let tables = OmopFixture::new()
        .person(1, 1960)
        .visit(10, 1, INPATIENT, "2020-01-01")
        .condition(1, Some(10), HF_CONCEPT, "2020-01-01")
        .tables();
    let build = build_dataset(&tables, &cohort_config("2019-01-01"));

    assert_eq!(build.cohort.len(), 1);
    assert!(build.sequences.is_empty());
}

#[test]
fn test_zero_buffer_keeps_other_visits_on_index_date() {
    let tables = OmopFixture::new()
        .person(1, 1960)
        .visit(10, 1, INPATIENT, "2020-01-01")
        .condition(1, Some(10), HF_CONCEPT, "2020-01-01")
        .drug(1, 11, 42, "2020-01-01")
        .drug(1, 10, 43, "2020-01-01")
        .tables();
    let config: CohortConfig = cohort_config("2019-01-01").with_buffer_period_days(0);
    let build = build_dataset(&tables, &config);

    assert_eq!(concepts_of(&build, 1), vec![(42, Domain::Drug)]);
}

#[test]
fn test_clipped_history_drops_events_before_date_filter() {
    let tables = scenario()
        .drug(1, 99, 7, "2018-06-01")
        .tables();

    let full = build_dataset(&tables, &cohort_config("2019-01-01"));
    assert!(concepts_of(&full, 1).contains(&(7, Domain::Drug)));

    let clipped = build_dataset(
        &tables,
        &cohort_config("2019-01-01").with_clipped_history(true),
    );
    assert!(!concepts_of(&clipped, 1).contains(&(7, Domain::Drug)));
    assert_eq!(concepts_of(&clipped, 1).len(), 3);
}
