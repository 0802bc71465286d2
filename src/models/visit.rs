//! Visit model

use chrono::NaiveDate;

use super::{ConceptId, PersonId, VisitId};

/// A row of the OMOP `visit_occurrence` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Visit {
    /// Visit identifier
    pub visit_occurrence_id: VisitId,
    /// Patient identifier
    pub person_id: PersonId,
    /// Visit type concept
    pub visit_concept_id: ConceptId,
    /// First day of the visit
    pub visit_start_date: NaiveDate,
}

impl Visit {
    /// Create a visit
    #[must_use]
    pub const fn new(
        visit_occurrence_id: VisitId,
        person_id: PersonId,
        visit_concept_id: ConceptId,
        visit_start_date: NaiveDate,
    ) -> Self {
        Self {
            visit_occurrence_id,
            person_id,
            visit_concept_id,
            visit_start_date,
        }
    }

    /// Ordering key for earliest-first selection: start date, then visit id
    #[must_use]
    pub const fn chronological_key(&self) -> (NaiveDate, VisitId) {
        (self.visit_start_date, self.visit_occurrence_id)
    }
}
