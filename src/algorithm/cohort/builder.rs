//! Cohort construction from the decoded source tables

use crate::algorithm::cohort::statistics::CohortStatistics;
use crate::algorithm::cohort::{
    apply_age_filter, heart_failure_visits, partition_patients, qualifying_visits,
};
use crate::config::CohortConfig;
use crate::models::{CohortRecord, ConditionEvent, Label, Person, Visit};

/// The final cohort: one labeled index visit per eligible patient
#[derive(Debug, Clone, Default)]
pub struct Cohort {
    /// Records sorted by `person_id`
    pub records: Vec<CohortRecord>,
    /// Counts collected along the way
    pub statistics: CohortStatistics,
}

impl Cohort {
    /// Number of patients in the cohort
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cohort is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with the given label
    pub fn with_label(&self, label: Label) -> impl Iterator<Item = &CohortRecord> + '_ {
        self.records.iter().filter(move |record| record.label == label)
    }
}

/// Runs visit filtering, case/control partitioning and the age filter
#[derive(Debug, Clone)]
pub struct CohortBuilder<'a> {
    config: &'a CohortConfig,
}

impl<'a> CohortBuilder<'a> {
    /// Create a builder for `config`
    #[must_use]
    pub const fn new(config: &'a CohortConfig) -> Self {
        Self { config }
    }

    /// Build the cohort
    #[must_use]
    pub fn build(
        &self,
        persons: &[Person],
        visits: &[Visit],
        conditions: &[ConditionEvent],
    ) -> Cohort {
        let config = self.config;

        let qualifying = qualifying_visits(visits, &config.visit_concepts);
        let heart_failure =
            heart_failure_visits(&qualifying, conditions, &config.heart_failure_concepts);
        log::info!(
            "Found {} qualifying visits, {} with a heart-failure diagnosis",
            qualifying.len(),
            heart_failure.len()
        );

        let partition = partition_patients(&qualifying, &heart_failure, config.date_filter);
        let candidate_cases = partition.cases.len();
        let candidate_controls = partition.controls.len();

        let records = apply_age_filter(
            &partition.into_records(),
            persons,
            config.age_lower_bound,
            config.age_upper_bound,
        );

        let cases = records.iter().filter(|record| record.is_case()).count();
        let statistics = CohortStatistics {
            qualifying_visits: qualifying.len(),
            heart_failure_visits: heart_failure.len(),
            candidate_cases,
            candidate_controls,
            cases,
            controls: records.len() - cases,
        };
        log::info!(
            "Cohort has {} cases and {} controls",
            statistics.cases,
            statistics.controls
        );

        Cohort {
            records,
            statistics,
        }
    }
}
