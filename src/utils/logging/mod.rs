//! Logging utilities for output and progress tracking

pub mod log;
pub mod progress;

pub use self::log::{
    log_empty_table, log_stage_complete, log_table_read_complete, log_table_read_start,
};
pub use self::progress::{create_spinner, finish_spinner};
