//! Heart-failure cohort labeling and event-sequence construction for OMOP
//! Parquet tables.
//!
//! The pipeline selects one labeled index visit per patient and gathers the
//! patient's history strictly before a buffer window preceding that visit,
//! then persists the labeled sequences as a Parquet dataset.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod tables;
pub mod training;
pub mod utils;
pub mod writer;

// Core types
pub use config::{CohortConfig, CohortConfigFile, ConceptSet, PipelineConfig};
pub use error::{Error, Result};
pub use models::{CohortRecord, Domain, EhrRecord, Label, SequenceEvent, SequenceRecord};

// Stages
pub use algorithm::cohort::{Cohort, CohortBuilder, CohortStatistics};
pub use algorithm::sequence::{TemporalSelector, serialize_sequences};
pub use pipeline::{DatasetBuild, HeartFailurePipeline, PipelineSummary, build_dataset};
pub use tables::{OmopTables, TableLoader};
pub use writer::{DatasetWriter, join_labels, read_dataset};
