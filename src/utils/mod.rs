//! Utility functions shared by the table readers, the pipeline and the writer

pub mod arrow;
pub mod io;
pub mod logging;

pub use self::io::{DEFAULT_BATCH_SIZE, get_batch_size};
