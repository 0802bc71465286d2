//! Condition occurrence model

use super::{ConceptId, PersonId, VisitId};

/// A diagnosis row of the OMOP `condition_occurrence` table
///
/// Only the columns needed to detect heart-failure visits are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionEvent {
    /// Patient identifier
    pub person_id: PersonId,
    /// Visit the diagnosis was recorded in, if any
    pub visit_occurrence_id: Option<VisitId>,
    /// Diagnosis concept
    pub condition_concept_id: ConceptId,
}

impl ConditionEvent {
    /// Create a condition event
    #[must_use]
    pub const fn new(
        person_id: PersonId,
        visit_occurrence_id: Option<VisitId>,
        condition_concept_id: ConceptId,
    ) -> Self {
        Self {
            person_id,
            visit_occurrence_id,
            condition_concept_id,
        }
    }
}
