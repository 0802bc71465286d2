//! Case/control partitioning
//!
//! Cases are anchored on their earliest heart-failure visit on or after the
//! date filter, controls on their latest qualifying visit on or after it. A
//! patient with a heart-failure visit at any date is never a control, so the
//! two groups are disjoint by construction.

use std::cmp::Reverse;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{CohortRecord, Label, PersonId, Visit};

/// Cases and controls, each sorted by `person_id`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// One record per case patient
    pub cases: Vec<CohortRecord>,
    /// One record per control patient
    pub controls: Vec<CohortRecord>,
}

impl Partition {
    /// Total number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len() + self.controls.len()
    }

    /// Whether no patient qualified
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.controls.is_empty()
    }

    /// All records sorted by `person_id`
    #[must_use]
    pub fn into_records(self) -> Vec<CohortRecord> {
        let mut records = self.cases;
        records.extend(self.controls);
        records.sort_by_key(|record| record.person_id);
        records
    }
}

/// Keep, per patient, the visit with the smallest `key`
fn select_per_patient<'a, K, F>(
    visits: impl Iterator<Item = &'a Visit>,
    key: F,
) -> FxHashMap<PersonId, Visit>
where
    K: Ord,
    F: Fn(&Visit) -> K,
{
    let mut selected: FxHashMap<PersonId, Visit> = FxHashMap::default();
    for visit in visits {
        selected
            .entry(visit.person_id)
            .and_modify(|current| {
                if key(visit) < key(current) {
                    *current = *visit;
                }
            })
            .or_insert(*visit);
    }
    selected
}

fn into_sorted_records(selected: FxHashMap<PersonId, Visit>, label: Label) -> Vec<CohortRecord> {
    let mut records: Vec<CohortRecord> = selected
        .into_values()
        .map(|visit| {
            CohortRecord::new(
                visit.person_id,
                visit.visit_occurrence_id,
                visit.visit_start_date,
                label,
            )
        })
        .collect();
    records.sort_by_key(|record| record.person_id);
    records
}

/// Earliest heart-failure visit on or after `date_filter` per patient
///
/// Ties on the start date go to the lowest visit id.
#[must_use]
pub fn select_cases(heart_failure_visits: &[Visit], date_filter: NaiveDate) -> Vec<CohortRecord> {
    let selected = select_per_patient(
        heart_failure_visits
            .iter()
            .filter(|visit| visit.visit_start_date >= date_filter),
        Visit::chronological_key,
    );
    into_sorted_records(selected, Label::Case)
}

/// Latest qualifying visit on or after `date_filter` per patient outside `excluded`
///
/// Ties on the start date go to the lowest visit id.
#[must_use]
pub fn select_controls(
    qualifying_visits: &[Visit],
    excluded: &FxHashSet<PersonId>,
    date_filter: NaiveDate,
) -> Vec<CohortRecord> {
    let selected = select_per_patient(
        qualifying_visits.iter().filter(|visit| {
            visit.visit_start_date >= date_filter && !excluded.contains(&visit.person_id)
        }),
        |visit| (Reverse(visit.visit_start_date), visit.visit_occurrence_id),
    );
    into_sorted_records(selected, Label::Control)
}

/// Split patients into cases and controls
///
/// Every patient with a heart-failure visit, whatever its date, is excluded
/// from the controls. Patients without a qualifying visit on or after
/// `date_filter` produce no record.
#[must_use]
pub fn partition_patients(
    qualifying_visits: &[Visit],
    heart_failure_visits: &[Visit],
    date_filter: NaiveDate,
) -> Partition {
    let cases = select_cases(heart_failure_visits, date_filter);

    let ever_heart_failure: FxHashSet<PersonId> = heart_failure_visits
        .iter()
        .map(|visit| visit.person_id)
        .collect();
    let controls = select_controls(qualifying_visits, &ever_heart_failure, date_filter);

    log::debug!(
        "Partitioned {} cases and {} controls ({} patients with heart failure before {})",
        cases.len(),
        controls.len(),
        ever_heart_failure.len() - cases.len(),
        date_filter
    );

    Partition { cases, controls }
}
