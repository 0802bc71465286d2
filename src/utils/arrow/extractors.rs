//! Typed column extraction for record batches

use arrow::array::{Array, AsArray, Date32Array, Int64Array};
use arrow::datatypes::{DataType, Date32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::utils::arrow::array_utils::get_column;

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Convert an Arrow `Date32` value (days since the Unix epoch) to a date
#[must_use]
pub fn date32_to_naive_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(Duration::days(i64::from(days)))
}

/// Convert a date to an Arrow `Date32` value
#[must_use]
pub fn naive_date_to_date32(date: NaiveDate) -> i32 {
    // Every representable NaiveDate is within i32 days of the epoch
    i32::try_from((date - unix_epoch()).num_days()).unwrap_or(i32::MAX)
}

/// Extract an integer column as `Int64`, accepting any integer width
///
/// # Errors
/// Returns an error if the column is missing or not an integer column
pub fn extract_int64_column(
    batch: &RecordBatch,
    table: &str,
    column_name: &str,
) -> Result<Int64Array> {
    let array = get_column(batch, table, column_name, &DataType::Int64)?;
    array
        .as_primitive_opt::<Int64Type>()
        .cloned()
        .ok_or_else(|| Error::InvalidColumnType {
            column: column_name.to_string(),
            data_type: array.data_type().to_string(),
            expected: DataType::Int64.to_string(),
        })
}

/// Extract a date column as `Date32`, accepting dates, timestamps and ISO strings
///
/// Strings that are not valid dates become nulls.
///
/// # Errors
/// Returns an error if the column is missing or of an unrelated type
pub fn extract_date32_column(
    batch: &RecordBatch,
    table: &str,
    column_name: &str,
) -> Result<Date32Array> {
    let array = get_column(batch, table, column_name, &DataType::Date32)?;
    array
        .as_primitive_opt::<Date32Type>()
        .cloned()
        .ok_or_else(|| Error::InvalidColumnType {
            column: column_name.to_string(),
            data_type: array.data_type().to_string(),
            expected: DataType::Date32.to_string(),
        })
}

/// Value at `row`, or `None` when null
#[must_use]
pub fn int64_at(array: &Int64Array, row: usize) -> Option<i64> {
    (!array.is_null(row)).then(|| array.value(row))
}

/// Date at `row`, or `None` when null
#[must_use]
pub fn date_at(array: &Date32Array, row: usize) -> Option<NaiveDate> {
    if array.is_null(row) {
        None
    } else {
        date32_to_naive_date(array.value(row))
    }
}
