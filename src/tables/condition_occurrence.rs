//! `condition_occurrence` table decoder for diagnosis detection

use arrow::record_batch::RecordBatch;

use super::{CONDITION_OCCURRENCE, OmopTable, log_skipped};
use crate::error::Result;
use crate::models::ConditionEvent;
use crate::utils::arrow::extract_int64_column;
use crate::utils::arrow::extractors::int64_at;

const COLUMNS: &[&str] = &["person_id", "visit_occurrence_id", "condition_concept_id"];

impl OmopTable for ConditionEvent {
    fn table_name() -> &'static str {
        CONDITION_OCCURRENCE
    }

    fn columns() -> &'static [&'static str] {
        COLUMNS
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let person_ids = extract_int64_column(batch, CONDITION_OCCURRENCE, "person_id")?;
        let visit_ids = extract_int64_column(batch, CONDITION_OCCURRENCE, "visit_occurrence_id")?;
        let concepts = extract_int64_column(batch, CONDITION_OCCURRENCE, "condition_concept_id")?;

        let conditions: Vec<Self> = (0..batch.num_rows())
            .filter_map(|row| {
                Some(Self::new(
                    int64_at(&person_ids, row)?,
                    int64_at(&visit_ids, row),
                    int64_at(&concepts, row)?,
                ))
            })
            .collect();

        log_skipped(CONDITION_OCCURRENCE, batch.num_rows(), conditions.len());
        Ok(conditions)
    }
}
