//! End-to-end heart-failure dataset pipeline
//!
//! load tables → visit/diagnosis filter → case/control partition → age
//! filter → temporal selection → serialization → label join → write

use std::fmt;
use std::time::{Duration, Instant};

use crate::algorithm::cohort::{Cohort, CohortBuilder, CohortStatistics};
use crate::algorithm::sequence::{TemporalSelector, serialize_sequences};
use crate::config::{CohortConfig, PipelineConfig};
use crate::error::{Error, Result};
use crate::models::SequenceRecord;
use crate::tables::{OmopTables, TableLoader};
use crate::utils::logging::{create_spinner, finish_spinner, log_stage_complete};
use crate::writer::{DatasetWriter, join_labels};

/// In-memory result of cohort selection and sequence construction
#[derive(Debug, Clone, Default)]
pub struct DatasetBuild {
    /// The labeled cohort
    pub cohort: Cohort,
    /// Labeled sequences ordered by `person_id`
    pub sequences: Vec<SequenceRecord>,
    /// Events that passed the temporal selector
    pub selected_events: usize,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Cohort counts
    pub cohort: CohortStatistics,
    /// Events that passed the temporal selector
    pub selected_events: usize,
    /// Rows in the persisted dataset
    pub rows_written: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cohort)?;
        writeln!(f, "  Selected Events: {}", self.selected_events)?;
        writeln!(f, "  Rows Written: {}", self.rows_written)?;
        write!(f, "  Elapsed: {:?}", self.elapsed)
    }
}

/// Run cohort selection and sequence construction on decoded tables
#[must_use]
pub fn build_dataset(tables: &OmopTables, config: &CohortConfig) -> DatasetBuild {
    let cohort =
        CohortBuilder::new(config).build(&tables.persons, &tables.visits, &tables.conditions);

    let history_start = config
        .clip_history_to_date_filter
        .then_some(config.date_filter);
    let selector =
        TemporalSelector::new(&cohort.records, config.buffer_period_days, history_start);
    let selected = selector.select(&tables.events);
    let selected_events = selected.len();

    let sequences = join_labels(serialize_sequences(selected), &cohort.records);
    log::info!(
        "Built {} sequences from {} selected events",
        sequences.len(),
        selected_events
    );

    DatasetBuild {
        cohort,
        sequences,
        selected_events,
    }
}

/// Drives a full run from input folder to persisted dataset
#[derive(Debug, Clone)]
pub struct HeartFailurePipeline {
    config: PipelineConfig,
}

impl HeartFailurePipeline {
    /// Create a pipeline for `config`
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Configuration of this pipeline
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and persist the dataset
    ///
    /// Configuration and missing tables are reported before any data is read.
    /// Nothing is written unless every stage succeeds.
    ///
    /// # Errors
    /// Returns the first configuration, loading or writing error
    pub async fn run(&self) -> Result<PipelineSummary> {
        let start = Instant::now();
        let config = &self.config;
        config.validate()?;
        log::info!("{}", config.cohort);

        let mut loader = TableLoader::new(&config.input_folder);
        if let Some(batch_size) = config.batch_size {
            loader = loader.with_batch_size(batch_size);
        }
        loader.check_tables()?;

        let spinner = create_spinner("Loading OMOP tables", config.show_progress);
        let tables = loader.load_all_async().await?;
        finish_spinner(&spinner, "Loaded OMOP tables");
        tables.log_summary();

        let spinner = create_spinner("Building cohort and sequences", config.show_progress);
        let stage_start = Instant::now();
        let cohort_config = config.cohort.clone();
        let build = tokio::task::spawn_blocking(move || build_dataset(&tables, &cohort_config))
            .await
            .map_err(|e| Error::Task(e.to_string()))?;
        finish_spinner(&spinner, "Built cohort and sequences");
        log_stage_complete(
            "Sequence construction",
            build.sequences.len(),
            "sequences",
            stage_start.elapsed(),
        );

        let spinner = create_spinner("Writing dataset", config.show_progress);
        let stage_start = Instant::now();
        let writer = DatasetWriter::new(&config.output_folder, &config.dataset_name);
        let sequences = build.sequences;
        let rows_written = tokio::task::spawn_blocking(move || writer.write(&sequences))
            .await
            .map_err(|e| Error::Task(e.to_string()))??;
        finish_spinner(&spinner, "Wrote dataset");
        log_stage_complete("Dataset write", rows_written, "rows", stage_start.elapsed());

        let summary = PipelineSummary {
            cohort: build.cohort.statistics,
            selected_events: build.selected_events,
            rows_written,
            elapsed: start.elapsed(),
        };
        log::info!("{summary}");
        Ok(summary)
    }
}
