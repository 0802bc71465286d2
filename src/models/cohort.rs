//! Cohort records

use std::fmt;

use chrono::NaiveDate;

use super::{PersonId, VisitId};

/// Outcome label of a cohort member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// No heart-failure visit at any time
    Control,
    /// Heart-failure visit on or after the date filter
    Case,
}

impl Label {
    /// Binary encoding: 1 for cases, 0 for controls
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Case => 1,
            Self::Control => 0,
        }
    }

    /// Decode the binary encoding
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Case),
            0 => Some(Self::Control),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Case => write!(f, "case"),
            Self::Control => write!(f, "control"),
        }
    }
}

/// One patient's index visit and label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortRecord {
    /// Patient identifier
    pub person_id: PersonId,
    /// Index visit
    pub visit_occurrence_id: VisitId,
    /// Start date of the index visit
    pub index_date: NaiveDate,
    /// Case or control
    pub label: Label,
    /// Age at the index date, set by the age filter
    pub age: Option<i32>,
}

impl CohortRecord {
    /// Create a cohort record before ages are known
    #[must_use]
    pub const fn new(
        person_id: PersonId,
        visit_occurrence_id: VisitId,
        index_date: NaiveDate,
        label: Label,
    ) -> Self {
        Self {
            person_id,
            visit_occurrence_id,
            index_date,
            label,
            age: None,
        }
    }

    /// Copy of this record with the age attached
    #[must_use]
    pub const fn with_age(self, age: i32) -> Self {
        Self {
            age: Some(age),
            ..self
        }
    }

    /// Whether this record is a case
    #[must_use]
    pub fn is_case(&self) -> bool {
        self.label == Label::Case
    }
}
