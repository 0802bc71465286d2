//! Unified clinical event model
//!
//! Condition, drug and procedure occurrences share one shape once their
//! table-specific concept and date columns are mapped onto it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::{ConceptId, PersonId, VisitId};
use crate::error::{Error, Result};

/// Source clinical table an event originated from
///
/// The derived ordering (condition, drug, procedure) is the secondary sort key
/// for events that share a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    /// `condition_occurrence`
    Condition,
    /// `drug_exposure`
    Drug,
    /// `procedure_occurrence`
    Procedure,
}

impl Domain {
    /// All domains in sort order
    pub const ALL: [Self; 3] = [Self::Condition, Self::Drug, Self::Procedure];

    /// Name of the OMOP table, also used as the domain tag in the output
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Condition => "condition_occurrence",
            Self::Drug => "drug_exposure",
            Self::Procedure => "procedure_occurrence",
        }
    }

    /// Column holding the standard concept id
    #[must_use]
    pub const fn concept_column(self) -> &'static str {
        match self {
            Self::Condition => "condition_concept_id",
            Self::Drug => "drug_concept_id",
            Self::Procedure => "procedure_concept_id",
        }
    }

    /// Column holding the event date
    #[must_use]
    pub const fn date_column(self) -> &'static str {
        match self {
            Self::Condition => "condition_start_date",
            Self::Drug => "drug_exposure_start_date",
            Self::Procedure => "procedure_date",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.table_name() == s)
            .ok_or_else(|| Error::config(format!("Unknown domain '{s}'")))
    }
}

/// A clinical event from any domain table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EhrRecord {
    /// Patient identifier
    pub person_id: PersonId,
    /// Standard concept of the event
    pub standard_concept_id: ConceptId,
    /// Event date
    pub date: NaiveDate,
    /// Visit the event belongs to
    pub visit_occurrence_id: VisitId,
    /// Source table
    pub domain: Domain,
}

impl EhrRecord {
    /// Create an event record
    #[must_use]
    pub const fn new(
        person_id: PersonId,
        standard_concept_id: ConceptId,
        date: NaiveDate,
        visit_occurrence_id: VisitId,
        domain: Domain,
    ) -> Self {
        Self {
            person_id,
            standard_concept_id,
            date,
            visit_occurrence_id,
            domain,
        }
    }
}
