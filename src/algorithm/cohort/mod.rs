//! Cohort selection
//!
//! 1. Visit & diagnosis filter: qualifying visits and the heart-failure subset
//! 2. Case/control partition: one index visit per patient
//! 3. Age filter: age at the index date within the configured bounds

pub mod age;
pub mod builder;
pub mod partition;
pub mod statistics;
pub mod visits;

pub use age::apply_age_filter;
pub use builder::{Cohort, CohortBuilder};
pub use partition::{Partition, partition_patients, select_cases, select_controls};
pub use statistics::CohortStatistics;
pub use visits::{heart_failure_visits, qualifying_visits};
