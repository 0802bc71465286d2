//! Log lines for table reads and pipeline stages

use std::path::Path;
use std::time::Duration;

use arrow::record_batch::RecordBatch;

use crate::utils::arrow::row_count;

/// Announce the Parquet files about to be read for one table
pub fn log_table_read_start(path: &Path, files: usize) {
    log::info!("Reading {files} Parquet file(s) from {}", path.display());
}

/// Report rows and batches read for one table
pub fn log_table_read_complete(path: &Path, batches: &[RecordBatch], elapsed: Duration) {
    log::info!(
        "Read {} rows in {} batches from {} in {elapsed:?}",
        row_count(batches),
        batches.len(),
        path.display()
    );
}

/// A table folder without part files; the table is treated as empty
pub fn log_empty_table(path: &Path) {
    log::warn!("No Parquet files found in {}", path.display());
}

/// Report the output size and duration of a pipeline stage
pub fn log_stage_complete(stage: &str, items: usize, unit: &str, elapsed: Duration) {
    log::info!("{stage}: {items} {unit} in {elapsed:?}");
}
