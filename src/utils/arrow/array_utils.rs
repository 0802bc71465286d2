//! Utilities for locating and adapting columns in record batches

use arrow::array::ArrayRef;
use arrow::compute::kernels::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Error, Result};

/// Whether `actual` can be cast to `expected` for schema-on-read purposes
fn is_adaptable(actual: &DataType, expected: &DataType) -> bool {
    match expected {
        DataType::Int64 => actual.is_integer(),
        DataType::Date32 => matches!(
            actual,
            DataType::Date32
                | DataType::Date64
                | DataType::Timestamp(_, _)
                | DataType::Utf8
                | DataType::LargeUtf8
        ),
        other => actual == other,
    }
}

/// Get a column from a record batch, cast to `expected_type`
///
/// # Arguments
/// * `batch` - The record batch containing the column
/// * `table` - Table name used in error messages
/// * `column_name` - The name of the column to extract
/// * `expected_type` - The type the caller will downcast to
///
/// # Returns
/// The column array, converted if its physical type differs
///
/// # Errors
/// Returns [`Error::ColumnNotFound`] if the column is missing and
/// [`Error::InvalidColumnType`] if it cannot be interpreted as `expected_type`
pub fn get_column(
    batch: &RecordBatch,
    table: &str,
    column_name: &str,
    expected_type: &DataType,
) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(column_name)
        .map_err(|_| Error::ColumnNotFound {
            table: table.to_string(),
            column: column_name.to_string(),
        })?;

    let column = batch.column(idx);
    let actual_type = column.data_type();

    if actual_type == expected_type {
        return Ok(column.clone());
    }

    if !is_adaptable(actual_type, expected_type) {
        return Err(Error::InvalidColumnType {
            column: column_name.to_string(),
            data_type: actual_type.to_string(),
            expected: expected_type.to_string(),
        });
    }

    debug!("Converting column '{column_name}' from {actual_type:?} to {expected_type:?}");
    Ok(cast::cast(column, expected_type)?)
}

/// Total number of rows across batches
#[must_use]
pub fn row_count(batches: &[RecordBatch]) -> usize {
    batches.iter().map(RecordBatch::num_rows).sum()
}
