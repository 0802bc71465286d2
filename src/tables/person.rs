//! `person` table decoder

use arrow::record_batch::RecordBatch;

use super::{OmopTable, PERSON, log_skipped};
use crate::error::Result;
use crate::models::Person;
use crate::utils::arrow::extract_int64_column;
use crate::utils::arrow::extractors::int64_at;

const COLUMNS: &[&str] = &["person_id", "year_of_birth"];

impl OmopTable for Person {
    fn table_name() -> &'static str {
        PERSON
    }

    fn columns() -> &'static [&'static str] {
        COLUMNS
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let person_ids = extract_int64_column(batch, PERSON, "person_id")?;
        let birth_years = extract_int64_column(batch, PERSON, "year_of_birth")?;

        let persons: Vec<Self> = (0..batch.num_rows())
            .filter_map(|row| {
                let person_id = int64_at(&person_ids, row)?;
                let year_of_birth = i32::try_from(int64_at(&birth_years, row)?).ok()?;
                Some(Self::new(person_id, year_of_birth))
            })
            .collect();

        log_skipped(PERSON, batch.num_rows(), persons.len());
        Ok(persons)
    }
}
