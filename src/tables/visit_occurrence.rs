//! `visit_occurrence` table decoder

use arrow::record_batch::RecordBatch;

use super::{OmopTable, VISIT_OCCURRENCE, log_skipped};
use crate::error::Result;
use crate::models::Visit;
use crate::utils::arrow::extractors::{date_at, int64_at};
use crate::utils::arrow::{extract_date32_column, extract_int64_column};

const COLUMNS: &[&str] = &[
    "visit_occurrence_id",
    "person_id",
    "visit_concept_id",
    "visit_start_date",
];

impl OmopTable for Visit {
    fn table_name() -> &'static str {
        VISIT_OCCURRENCE
    }

    fn columns() -> &'static [&'static str] {
        COLUMNS
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let visit_ids = extract_int64_column(batch, VISIT_OCCURRENCE, "visit_occurrence_id")?;
        let person_ids = extract_int64_column(batch, VISIT_OCCURRENCE, "person_id")?;
        let visit_concepts = extract_int64_column(batch, VISIT_OCCURRENCE, "visit_concept_id")?;
        let start_dates = extract_date32_column(batch, VISIT_OCCURRENCE, "visit_start_date")?;

        let visits: Vec<Self> = (0..batch.num_rows())
            .filter_map(|row| {
                Some(Self::new(
                    int64_at(&visit_ids, row)?,
                    int64_at(&person_ids, row)?,
                    int64_at(&visit_concepts, row)?,
                    date_at(&start_dates, row)?,
                ))
            })
            .collect();

        log_skipped(VISIT_OCCURRENCE, batch.num_rows(), visits.len());
        Ok(visits)
    }
}
