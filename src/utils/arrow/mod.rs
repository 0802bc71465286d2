//! Arrow data handling utilities
//!
//! Helpers for pulling typed columns out of record batches whose physical types
//! vary between OMOP exports, and for converting between Arrow `Date32` values
//! and `chrono` dates.

pub mod array_utils;
pub mod extractors;

pub use self::array_utils::{get_column, row_count};
pub use self::extractors::{
    date32_to_naive_date, extract_date32_column, extract_int64_column, naive_date_to_date32,
};
