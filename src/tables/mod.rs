//! OMOP table decoding and loading
//!
//! Each source table is read schema-on-read: integer ids of any width and dates
//! stored as `Date32`, `Date64`, timestamps or ISO strings are accepted. Rows
//! missing a required key are skipped.

pub mod condition_occurrence;
pub mod domain;
pub mod loader;
pub mod person;
pub mod visit_occurrence;

use arrow::record_batch::RecordBatch;

use crate::error::Result;

pub use domain::ehr_records_from_batch;
pub use loader::{OmopTables, TableLoader};

/// Name of the `person` table
pub const PERSON: &str = "person";
/// Name of the `visit_occurrence` table
pub const VISIT_OCCURRENCE: &str = "visit_occurrence";
/// Name of the `condition_occurrence` table
pub const CONDITION_OCCURRENCE: &str = "condition_occurrence";

/// A model that can be decoded from the record batches of one OMOP table
pub trait OmopTable: Sized {
    /// Name of the table folder under the input folder
    fn table_name() -> &'static str;

    /// Columns the decoder reads; used as the read projection
    fn columns() -> &'static [&'static str];

    /// Decode one record batch, skipping rows with null required keys
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;

    /// Decode a sequence of record batches
    fn from_batches(batches: &[RecordBatch]) -> Result<Vec<Self>> {
        let mut rows = Vec::with_capacity(crate::utils::arrow::row_count(batches));
        for batch in batches {
            rows.extend(Self::from_batch(batch)?);
        }
        Ok(rows)
    }
}

/// Log how many rows of a batch were skipped for null keys
pub(crate) fn log_skipped(table: &str, total: usize, kept: usize) {
    if kept < total {
        log::debug!(
            "Skipped {} of {} rows in '{}' with missing required values",
            total - kept,
            total,
            table
        );
    }
}
