//! Utility functions for working with Parquet files

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::utils::logging::{log_empty_table, log_table_read_complete, log_table_read_start};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Batch size from the `PARQUET_BATCH_SIZE` environment variable, if set
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&size| size > 0)
}

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

fn is_parquet_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "parquet")
}

/// Find the Parquet files that make up a table
///
/// `path` may be a single `.parquet` file or a directory of part files. Part
/// files are returned sorted by path so every run reads rows in the same order.
///
/// # Errors
/// Returns an error if the path is neither a Parquet file nor a readable directory
pub fn find_parquet_files(path: &Path) -> Result<Vec<PathBuf>> {
    if is_parquet_file(path) {
        return Ok(vec![path.to_path_buf()]);
    }

    validate_directory(path)?;

    let files = std::fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|p| is_parquet_file(p))
        .sorted()
        .collect_vec();

    if files.is_empty() {
        log_empty_table(path);
    }

    Ok(files)
}

/// Read a Parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `columns` - Optional column names to project; names absent from the file are skipped
/// * `batch_size` - Rows per record batch
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_parquet(
    path: &Path,
    columns: Option<&[&str]>,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open file {}: {e}", path.display()),
        ))
    })?;

    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(batch_size);

    if let Some(columns) = columns {
        let file_schema = builder.schema().clone();
        let indices = columns
            .iter()
            .filter_map(|name| file_schema.index_of(name).ok())
            .collect_vec();
        let mask = ProjectionMask::roots(builder.parquet_schema(), indices);
        builder = builder.with_projection(mask);
    }

    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(batches)
}

/// Load every Parquet file of a table in parallel
///
/// Batches are returned in file order regardless of which thread read them.
///
/// # Errors
/// Returns the first error encountered while listing or reading files
pub fn load_parquet_files_parallel(
    path: &Path,
    columns: Option<&[&str]>,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();
    let files = find_parquet_files(path)?;
    log_table_read_start(path, files.len());

    let batches = files
        .par_iter()
        .map(|file| read_parquet(file, columns, batch_size))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect_vec();

    log_table_read_complete(path, &batches, start.elapsed());
    Ok(batches)
}
