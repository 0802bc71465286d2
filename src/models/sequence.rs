//! Per-patient event sequences

use chrono::NaiveDate;

use super::{ConceptId, Domain, EhrRecord, Label, PersonId, VisitId};

/// One element of a patient's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceEvent {
    /// Standard concept of the event
    pub standard_concept_id: ConceptId,
    /// Event date
    pub date: NaiveDate,
    /// Visit the event belongs to
    pub visit_occurrence_id: VisitId,
    /// Source table
    pub domain: Domain,
}

impl SequenceEvent {
    /// Sort key: date, then domain, concept and visit
    ///
    /// The trailing keys only order events that share a date, so the sequence
    /// is identical across runs regardless of input row order.
    #[must_use]
    pub const fn sort_key(&self) -> (NaiveDate, Domain, ConceptId, VisitId) {
        (
            self.date,
            self.domain,
            self.standard_concept_id,
            self.visit_occurrence_id,
        )
    }
}

impl From<&EhrRecord> for SequenceEvent {
    fn from(record: &EhrRecord) -> Self {
        Self {
            standard_concept_id: record.standard_concept_id,
            date: record.date,
            visit_occurrence_id: record.visit_occurrence_id,
            domain: record.domain,
        }
    }
}

/// A patient's chronologically ordered history, optionally labeled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Patient identifier
    pub person_id: PersonId,
    /// Events in chronological order
    pub events: Vec<SequenceEvent>,
    /// Outcome label once joined with the cohort
    pub label: Option<Label>,
}

impl SequenceRecord {
    /// Number of events in the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the sequence has no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events from a single domain, in sequence order
    pub fn events_in(&self, domain: Domain) -> impl Iterator<Item = &SequenceEvent> + '_ {
        self.events.iter().filter(move |event| event.domain == domain)
    }
}
