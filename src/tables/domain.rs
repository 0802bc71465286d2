//! Extraction of unified clinical events from the domain tables

use arrow::record_batch::RecordBatch;

use super::log_skipped;
use crate::error::Result;
use crate::models::{Domain, EhrRecord};
use crate::utils::arrow::extractors::{date_at, int64_at};
use crate::utils::arrow::{extract_date32_column, extract_int64_column};

/// Concept id OMOP uses for source values without a standard mapping
pub const UNMAPPED_CONCEPT_ID: i64 = 0;

/// Columns read from a domain table
#[must_use]
pub fn domain_columns(domain: Domain) -> [&'static str; 4] {
    [
        "person_id",
        domain.concept_column(),
        domain.date_column(),
        "visit_occurrence_id",
    ]
}

/// Decode a batch of a domain table into [`EhrRecord`]s
///
/// Rows with an unmapped concept, no visit, or no date are dropped: they cannot
/// be placed in a sequence or checked against the index visit.
///
/// # Errors
/// Returns an error if a required column is missing or has an unusable type
pub fn ehr_records_from_batch(batch: &RecordBatch, domain: Domain) -> Result<Vec<EhrRecord>> {
    let table = domain.table_name();
    let person_ids = extract_int64_column(batch, table, "person_id")?;
    let concepts = extract_int64_column(batch, table, domain.concept_column())?;
    let dates = extract_date32_column(batch, table, domain.date_column())?;
    let visit_ids = extract_int64_column(batch, table, "visit_occurrence_id")?;

    let records: Vec<EhrRecord> = (0..batch.num_rows())
        .filter_map(|row| {
            let concept = int64_at(&concepts, row).filter(|&c| c != UNMAPPED_CONCEPT_ID)?;
            Some(EhrRecord::new(
                int64_at(&person_ids, row)?,
                concept,
                date_at(&dates, row)?,
                int64_at(&visit_ids, row)?,
                domain,
            ))
        })
        .collect();

    log_skipped(table, batch.num_rows(), records.len());
    Ok(records)
}
