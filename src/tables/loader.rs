//! Loading of the OMOP input tables
//!
//! Tables are read on tokio's blocking pool so the five relations load
//! concurrently, and the part files of each table are read in parallel with
//! rayon. Missing tables are reported before anything is read.

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use super::domain::domain_columns;
use super::{CONDITION_OCCURRENCE, OmopTable, PERSON, VISIT_OCCURRENCE, ehr_records_from_batch};
use crate::error::{Error, Result};
use crate::models::{ConditionEvent, Domain, EhrRecord, Person, Visit};
use crate::utils::io::{DEFAULT_BATCH_SIZE, get_batch_size, load_parquet_files_parallel};

/// The decoded input relations
#[derive(Debug, Clone, Default)]
pub struct OmopTables {
    /// Rows of `person`
    pub persons: Vec<Person>,
    /// Rows of `visit_occurrence`
    pub visits: Vec<Visit>,
    /// Diagnosis rows of `condition_occurrence`
    pub conditions: Vec<ConditionEvent>,
    /// Events from every domain table, grouped by domain in [`Domain::ALL`] order
    pub events: Vec<EhrRecord>,
}

impl OmopTables {
    /// Log row counts per relation
    pub fn log_summary(&self) {
        log::info!(
            "Loaded {} persons, {} visits, {} conditions and {} clinical events",
            self.persons.len(),
            self.visits.len(),
            self.conditions.len(),
            self.events.len()
        );
    }
}

/// Reads OMOP tables from an input folder
#[derive(Debug, Clone)]
pub struct TableLoader {
    input_folder: PathBuf,
    batch_size: usize,
}

impl TableLoader {
    /// Create a loader; the batch size comes from `PARQUET_BATCH_SIZE` when set
    pub fn new(input_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_folder: input_folder.into(),
            batch_size: get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }

    /// Set the read batch size
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Every table the pipeline needs
    #[must_use]
    pub fn required_tables() -> Vec<&'static str> {
        let mut tables = vec![PERSON, VISIT_OCCURRENCE];
        tables.extend(Domain::ALL.iter().map(|domain| domain.table_name()));
        tables
    }

    /// Location of a table: `<input>/<table>/` or `<input>/<table>.parquet`
    ///
    /// # Errors
    /// Returns [`Error::MissingTable`] if neither exists
    pub fn table_path(&self, table: &str) -> Result<PathBuf> {
        let dir = self.input_folder.join(table);
        if dir.is_dir() {
            return Ok(dir);
        }
        let file = self.input_folder.join(format!("{table}.parquet"));
        if file.is_file() {
            return Ok(file);
        }
        Err(Error::MissingTable {
            table: table.to_string(),
            path: dir,
        })
    }

    /// Fail fast when any required table is missing
    ///
    /// # Errors
    /// Returns [`Error::MissingTable`] for the first missing table
    pub fn check_tables(&self) -> Result<()> {
        for table in Self::required_tables() {
            self.table_path(table)?;
        }
        Ok(())
    }

    /// Read the raw record batches of a table, projected to `columns`
    ///
    /// # Errors
    /// Returns an error if the table is missing or unreadable
    pub fn load_batches(&self, table: &str, columns: &[&str]) -> Result<Vec<RecordBatch>> {
        let path = self.table_path(table)?;
        load_parquet_files_parallel(&path, Some(columns), self.batch_size)
    }

    /// Load and decode a single-model table
    ///
    /// # Errors
    /// Returns an error if the table is missing, unreadable or lacks required columns
    pub fn load_table<T: OmopTable>(&self) -> Result<Vec<T>> {
        let batches = self.load_batches(T::table_name(), T::columns())?;
        T::from_batches(&batches)
    }

    /// Load the unified events of one domain table
    ///
    /// # Errors
    /// Returns an error if the table is missing, unreadable or lacks required columns
    pub fn load_domain(&self, domain: Domain) -> Result<Vec<EhrRecord>> {
        let batches = self.load_batches(domain.table_name(), &domain_columns(domain))?;
        decode_domain(&batches, domain)
    }

    /// Load `condition_occurrence` once, decoding both diagnoses and events
    ///
    /// # Errors
    /// Returns an error if the table is missing, unreadable or lacks required columns
    pub fn load_conditions(&self) -> Result<(Vec<ConditionEvent>, Vec<EhrRecord>)> {
        let columns = ConditionEvent::columns()
            .iter()
            .copied()
            .chain(domain_columns(Domain::Condition))
            .unique()
            .collect_vec();
        let batches = self.load_batches(CONDITION_OCCURRENCE, &columns)?;
        let conditions = ConditionEvent::from_batches(&batches)?;
        let events = decode_domain(&batches, Domain::Condition)?;
        Ok((conditions, events))
    }

    /// Load every input table concurrently on tokio's blocking pool
    ///
    /// # Errors
    /// Returns the first loading error; a panicking loader surfaces as [`Error::Task`]
    pub async fn load_all_async(&self) -> Result<OmopTables> {
        self.check_tables()?;
        let start = Instant::now();

        let (persons, visits, (conditions, condition_events), drug_events, procedure_events) =
            futures::try_join!(
                spawn_load(self.clone(), |loader| loader.load_table::<Person>()),
                spawn_load(self.clone(), |loader| loader.load_table::<Visit>()),
                spawn_load(self.clone(), TableLoader::load_conditions),
                spawn_load(self.clone(), |loader| loader.load_domain(Domain::Drug)),
                spawn_load(self.clone(), |loader| loader.load_domain(Domain::Procedure)),
            )?;

        let mut events = condition_events;
        events.extend(drug_events);
        events.extend(procedure_events);

        let tables = OmopTables {
            persons,
            visits,
            conditions,
            events,
        };
        log::debug!("Loaded input tables concurrently in {:?}", start.elapsed());
        Ok(tables)
    }
}

fn decode_domain(batches: &[RecordBatch], domain: Domain) -> Result<Vec<EhrRecord>> {
    let mut records = Vec::new();
    for batch in batches {
        records.extend(ehr_records_from_batch(batch, domain)?);
    }
    Ok(records)
}

fn spawn_load<T, F>(loader: TableLoader, load: F) -> impl Future<Output = Result<T>>
where
    T: Send + 'static,
    F: FnOnce(&TableLoader) -> Result<T> + Send + 'static,
{
    async move {
        tokio::task::spawn_blocking(move || load(&loader))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }
}
