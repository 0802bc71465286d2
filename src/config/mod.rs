//! Configuration for cohort selection and sequence construction.
//!
//! Every eligibility parameter is supplied from outside the selection logic:
//! the visit-type and heart-failure vocabularies are [`ConceptSet`] values that
//! can be loaded from JSON, and the numeric bounds live on [`CohortConfig`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default lower age bound (inclusive)
pub const DEFAULT_AGE_LOWER_BOUND: i32 = 10;
/// Default upper age bound (inclusive)
pub const DEFAULT_AGE_UPPER_BOUND: i32 = 80;
/// Default gap between the last usable event and the index date
pub const DEFAULT_BUFFER_PERIOD_DAYS: u32 = 90;
/// Default name of the persisted dataset under the output folder
pub const DEFAULT_DATASET_NAME: &str = "heart_failure";
const VISIT_CONCEPTS_JSON: &str = include_str!("../../resources/visit_concepts.json");
const HEART_FAILURE_CONCEPTS_JSON: &str =
    include_str!("../../resources/heart_failure_concepts.json");

/// Date format accepted for every date parameter
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
///
/// # Errors
/// Returns [`Error::InvalidDate`] when the string is not a valid ISO date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

/// On-disk shape of a vocabulary file: either a bare list or a named list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConceptSetFile {
    List(Vec<i64>),
    Named {
        name: Option<String>,
        concept_ids: Vec<i64>,
    },
}

/// A named set of standard concept ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptSet {
    name: String,
    concept_ids: BTreeSet<i64>,
}

impl ConceptSet {
    /// Create a concept set from any collection of ids; duplicates collapse
    pub fn new(name: impl Into<String>, concept_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            name: name.into(),
            concept_ids: concept_ids.into_iter().collect(),
        }
    }

    /// The bundled qualifying visit types: inpatient, emergency room, and
    /// emergency room and inpatient visits
    ///
    /// # Panics
    /// Panics only if the vocabulary compiled into the binary is malformed
    #[must_use]
    pub fn default_visit_types() -> Self {
        Self::from_json_str("inpatient_or_er_visit", VISIT_CONCEPTS_JSON)
            .expect("bundled visit vocabulary is valid JSON")
    }

    /// The bundled heart-failure diagnosis vocabulary
    ///
    /// # Panics
    /// Panics only if the vocabulary compiled into the binary is malformed
    #[must_use]
    pub fn default_heart_failure() -> Self {
        Self::from_json_str("heart_failure", HEART_FAILURE_CONCEPTS_JSON)
            .expect("bundled heart-failure vocabulary is valid JSON")
    }

    /// Parse a vocabulary from JSON, using `default_name` when the file is a bare list
    ///
    /// # Errors
    /// Returns an error if the JSON is not a list of ids or a `{name, concept_ids}` object
    pub fn from_json_str(default_name: &str, json: &str) -> Result<Self> {
        let parsed: ConceptSetFile = serde_json::from_str(json)?;
        Ok(match parsed {
            ConceptSetFile::List(ids) => Self::new(default_name, ids),
            ConceptSetFile::Named { name, concept_ids } => {
                Self::new(name.unwrap_or_else(|| default_name.to_string()), concept_ids)
            }
        })
    }

    /// Load a vocabulary from a JSON file, named after the file stem when unnamed
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read vocabulary file {}: {e}",
                path.display()
            ))
        })?;
        let default_name = path
            .file_stem()
            .map_or_else(|| "concepts".to_string(), |s| s.to_string_lossy().into_owned());
        let set = Self::from_json_str(&default_name, &content)?;
        log::debug!(
            "Loaded {} concepts for '{}' from {}",
            set.len(),
            set.name,
            path.display()
        );
        Ok(set)
    }

    /// Name of the vocabulary
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `concept_id` belongs to the set
    #[must_use]
    pub fn contains(&self, concept_id: i64) -> bool {
        self.concept_ids.contains(&concept_id)
    }

    /// Number of distinct concepts
    #[must_use]
    pub fn len(&self) -> usize {
        self.concept_ids.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concept_ids.is_empty()
    }

    /// Concept ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.concept_ids.iter().copied()
    }
}

/// Parameters of cohort selection and sequence construction
#[derive(Debug, Clone)]
pub struct CohortConfig {
    /// Start of the eligible observation window for index visits (inclusive)
    pub date_filter: NaiveDate,
    /// Visit types that count as qualifying visits
    pub visit_concepts: ConceptSet,
    /// Diagnoses that make a qualifying visit a heart-failure visit
    pub heart_failure_concepts: ConceptSet,
    /// Minimum age at the index date (inclusive)
    pub age_lower_bound: i32,
    /// Maximum age at the index date (inclusive)
    pub age_upper_bound: i32,
    /// Events must predate the index date by at least this many days
    pub buffer_period_days: u32,
    /// Also drop history events dated before `date_filter`
    pub clip_history_to_date_filter: bool,
}

impl CohortConfig {
    /// Create a configuration with default vocabularies and bounds
    #[must_use]
    pub fn new(date_filter: NaiveDate) -> Self {
        Self {
            date_filter,
            visit_concepts: ConceptSet::default_visit_types(),
            heart_failure_concepts: ConceptSet::default_heart_failure(),
            age_lower_bound: DEFAULT_AGE_LOWER_BOUND,
            age_upper_bound: DEFAULT_AGE_UPPER_BOUND,
            buffer_period_days: DEFAULT_BUFFER_PERIOD_DAYS,
            clip_history_to_date_filter: false,
        }
    }

    /// Set the qualifying visit vocabulary
    #[must_use]
    pub fn with_visit_concepts(mut self, concepts: ConceptSet) -> Self {
        self.visit_concepts = concepts;
        self
    }

    /// Set the heart-failure diagnosis vocabulary
    #[must_use]
    pub fn with_heart_failure_concepts(mut self, concepts: ConceptSet) -> Self {
        self.heart_failure_concepts = concepts;
        self
    }

    /// Set the inclusive age bounds
    #[must_use]
    pub fn with_age_bounds(mut self, lower: i32, upper: i32) -> Self {
        self.age_lower_bound = lower;
        self.age_upper_bound = upper;
        self
    }

    /// Set the buffer period in days
    #[must_use]
    pub fn with_buffer_period_days(mut self, days: u32) -> Self {
        self.buffer_period_days = days;
        self
    }

    /// Drop history events dated before `date_filter`
    #[must_use]
    pub fn with_clipped_history(mut self, clip: bool) -> Self {
        self.clip_history_to_date_filter = clip;
        self
    }

    /// Check the configuration before any table is touched
    ///
    /// # Errors
    /// Returns [`Error::Config`] for inverted or negative age bounds and empty vocabularies
    pub fn validate(&self) -> Result<()> {
        if self.age_lower_bound < 0 {
            return Err(Error::config(format!(
                "Age lower bound must not be negative, got {}",
                self.age_lower_bound
            )));
        }
        if self.age_lower_bound > self.age_upper_bound {
            return Err(Error::config(format!(
                "Age lower bound {} exceeds upper bound {}",
                self.age_lower_bound, self.age_upper_bound
            )));
        }
        if self.visit_concepts.is_empty() {
            return Err(Error::config("Qualifying visit vocabulary is empty"));
        }
        if self.heart_failure_concepts.is_empty() {
            return Err(Error::config("Heart-failure vocabulary is empty"));
        }
        Ok(())
    }
}

impl fmt::Display for CohortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cohort Configuration:")?;
        writeln!(f, "  Date Filter: {}", self.date_filter)?;
        writeln!(
            f,
            "  Visit Concepts: {} ({} ids)",
            self.visit_concepts.name(),
            self.visit_concepts.len()
        )?;
        writeln!(
            f,
            "  Heart Failure Concepts: {} ({} ids)",
            self.heart_failure_concepts.name(),
            self.heart_failure_concepts.len()
        )?;
        writeln!(
            f,
            "  Age Bounds: {}-{}",
            self.age_lower_bound, self.age_upper_bound
        )?;
        writeln!(f, "  Buffer Period: {} days", self.buffer_period_days)?;
        writeln!(
            f,
            "  Clip History To Date Filter: {}",
            self.clip_history_to_date_filter
        )
    }
}

/// Optional settings read from a JSON configuration file
///
/// Every field is optional; absent fields keep their defaults and command line
/// flags take precedence over the file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CohortConfigFile {
    /// Cutoff date in `YYYY-MM-DD`
    pub date_filter: Option<String>,
    /// Minimum age at the index date
    pub age_lower_bound: Option<i32>,
    /// Maximum age at the index date
    pub age_upper_bound: Option<i32>,
    /// Buffer period in days
    pub buffer_period_days: Option<u32>,
    /// Inline qualifying visit concept ids
    pub visit_concepts: Option<Vec<i64>>,
    /// Inline heart-failure concept ids
    pub heart_failure_concepts: Option<Vec<i64>>,
    /// Path to a qualifying visit vocabulary file
    pub visit_concepts_file: Option<PathBuf>,
    /// Path to a heart-failure vocabulary file
    pub heart_failure_concepts_file: Option<PathBuf>,
    /// Drop history events before the date filter
    pub clip_history_to_date_filter: Option<bool>,
    /// Name of the output dataset
    pub dataset_name: Option<String>,
}

impl CohortConfigFile {
    /// Read a configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains unknown keys
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Resolve the date filter, preferring `override_date` over the file value
    ///
    /// # Errors
    /// Returns an error when no date is available or the file value is malformed
    pub fn resolve_date_filter(&self, override_date: Option<NaiveDate>) -> Result<NaiveDate> {
        match (override_date, &self.date_filter) {
            (Some(date), _) => Ok(date),
            (None, Some(value)) => parse_date(value),
            (None, None) => Err(Error::config("A date filter is required")),
        }
    }

    /// Apply the file's settings on top of `config`
    ///
    /// # Errors
    /// Returns an error if a referenced vocabulary file cannot be loaded
    pub fn apply(&self, mut config: CohortConfig) -> Result<CohortConfig> {
        if let Some(lower) = self.age_lower_bound {
            config.age_lower_bound = lower;
        }
        if let Some(upper) = self.age_upper_bound {
            config.age_upper_bound = upper;
        }
        if let Some(days) = self.buffer_period_days {
            config.buffer_period_days = days;
        }
        if let Some(clip) = self.clip_history_to_date_filter {
            config.clip_history_to_date_filter = clip;
        }
        if let Some(ids) = &self.visit_concepts {
            config.visit_concepts = ConceptSet::new("visit_concepts", ids.iter().copied());
        }
        if let Some(path) = &self.visit_concepts_file {
            config.visit_concepts = ConceptSet::from_json_file(path)?;
        }
        if let Some(ids) = &self.heart_failure_concepts {
            config.heart_failure_concepts =
                ConceptSet::new("heart_failure_concepts", ids.iter().copied());
        }
        if let Some(path) = &self.heart_failure_concepts_file {
            config.heart_failure_concepts = ConceptSet::from_json_file(path)?;
        }
        Ok(config)
    }
}

/// Locations and I/O settings of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder holding one sub-folder (or `.parquet` file) per OMOP table
    pub input_folder: PathBuf,
    /// Folder receiving the persisted dataset
    pub output_folder: PathBuf,
    /// Name of the dataset directory under `output_folder`
    pub dataset_name: String,
    /// Cohort selection parameters
    pub cohort: CohortConfig,
    /// Rows per record batch when reading Parquet
    pub batch_size: Option<usize>,
    /// Whether to draw progress spinners
    pub show_progress: bool,
}

impl PipelineConfig {
    /// Create a pipeline configuration with the default dataset name
    pub fn new(
        input_folder: impl Into<PathBuf>,
        output_folder: impl Into<PathBuf>,
        cohort: CohortConfig,
    ) -> Self {
        Self {
            input_folder: input_folder.into(),
            output_folder: output_folder.into(),
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            cohort,
            batch_size: None,
            show_progress: false,
        }
    }

    /// Set the dataset name
    #[must_use]
    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    /// Set the read batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Enable or disable progress spinners
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Full path of the persisted dataset
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.output_folder.join(&self.dataset_name)
    }

    /// Check paths and cohort parameters
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an empty dataset name, a missing input folder
    /// or invalid cohort parameters
    pub fn validate(&self) -> Result<()> {
        if self.dataset_name.trim().is_empty() || self.dataset_name.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "Invalid dataset name '{}'",
                self.dataset_name
            )));
        }
        if !self.input_folder.is_dir() {
            return Err(Error::config(format!(
                "Input folder does not exist: {}",
                self.input_folder.display()
            )));
        }
        self.cohort.validate()
    }
}
