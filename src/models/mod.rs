//! Domain models for cohort construction
//!
//! Plain value types for the OMOP source rows the pipeline consumes and the
//! derived cohort and sequence records it produces. No model is mutated once a
//! stage has produced it; each stage returns new values.

pub mod cohort;
pub mod condition;
pub mod ehr;
pub mod person;
pub mod sequence;
pub mod visit;

pub use cohort::{CohortRecord, Label};
pub use condition::ConditionEvent;
pub use ehr::{Domain, EhrRecord};
pub use person::Person;
pub use sequence::{SequenceEvent, SequenceRecord};
pub use visit::Visit;

/// OMOP `person_id`
pub type PersonId = i64;
/// OMOP `visit_occurrence_id`
pub type VisitId = i64;
/// OMOP standard concept id
pub type ConceptId = i64;
