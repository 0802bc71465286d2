//! Person model

use chrono::{Datelike, NaiveDate};

use super::PersonId;

/// A patient from the OMOP `person` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Person {
    /// Patient identifier
    pub person_id: PersonId,
    /// Year of birth
    pub year_of_birth: i32,
}

impl Person {
    /// Create a person
    #[must_use]
    pub const fn new(person_id: PersonId, year_of_birth: i32) -> Self {
        Self {
            person_id,
            year_of_birth,
        }
    }

    /// Age at `date` counted in calendar years only
    ///
    /// Month and day are ignored: someone born in 1950 is 70 for the whole of 2020.
    /// Returns `None` when the difference does not fit in an `i32`.
    #[must_use]
    pub fn age_at(&self, date: NaiveDate) -> Option<i32> {
        date.year().checked_sub(self.year_of_birth)
    }
}
