//! Label attachment

use rustc_hash::FxHashMap;

use crate::models::{CohortRecord, Label, PersonId, SequenceRecord};

/// Inner-join sequences with cohort labels on `person_id`
///
/// Cohort members without any admissible event and sequences of patients
/// outside the cohort are both dropped. Input order is preserved.
#[must_use]
pub fn join_labels(
    sequences: Vec<SequenceRecord>,
    cohort: &[CohortRecord],
) -> Vec<SequenceRecord> {
    let labels: FxHashMap<PersonId, Label> = cohort
        .iter()
        .map(|record| (record.person_id, record.label))
        .collect();

    let total = sequences.len();
    let joined: Vec<SequenceRecord> = sequences
        .into_iter()
        .filter_map(|sequence| {
            let label = *labels.get(&sequence.person_id)?;
            Some(SequenceRecord {
                label: Some(label),
                ..sequence
            })
        })
        .collect();

    log::debug!(
        "Joined {} of {} sequences with {} cohort labels",
        joined.len(),
        total,
        labels.len()
    );
    joined
}
