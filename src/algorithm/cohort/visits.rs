//! Visit and diagnosis filtering

use rustc_hash::FxHashSet;

use crate::config::ConceptSet;
use crate::models::{ConditionEvent, Visit, VisitId};

/// Visits whose type is in `visit_types`
#[must_use]
pub fn qualifying_visits(visits: &[Visit], visit_types: &ConceptSet) -> Vec<Visit> {
    visits
        .iter()
        .filter(|visit| visit_types.contains(visit.visit_concept_id))
        .copied()
        .collect()
}

/// Qualifying visits with at least one heart-failure diagnosis in the same visit
///
/// A visit with several qualifying diagnoses, or repeated in the visit table,
/// is returned once.
#[must_use]
pub fn heart_failure_visits(
    qualifying: &[Visit],
    conditions: &[ConditionEvent],
    heart_failure_concepts: &ConceptSet,
) -> Vec<Visit> {
    let diagnosed: FxHashSet<VisitId> = conditions
        .iter()
        .filter(|condition| heart_failure_concepts.contains(condition.condition_concept_id))
        .filter_map(|condition| condition.visit_occurrence_id)
        .collect();

    let mut seen = FxHashSet::default();
    qualifying
        .iter()
        .filter(|visit| diagnosed.contains(&visit.visit_occurrence_id))
        .filter(|visit| seen.insert(**visit))
        .copied()
        .collect()
}
