//! Generic training data driver

use std::fmt;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::training::strategy::DatasetStrategy;
use crate::training::tokenizer::Tokenizer;
use crate::writer::read_dataset;

/// Sequences shorter than this are dropped
pub const DEFAULT_MIN_NUM_OF_CONCEPTS: usize = 5;
/// Examples per training step
pub const DEFAULT_TRAINING_BATCH_SIZE: usize = 128;

/// Settings of the training data loader
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Folder of the persisted dataset
    pub dataset_path: PathBuf,
    /// Examples per training step
    pub batch_size: usize,
    /// Minimum number of events per sequence
    pub min_num_of_concepts: usize,
    /// Shuffle examples before preparation
    pub shuffle: bool,
    /// Seed of the shuffle
    pub seed: u64,
}

impl TrainerConfig {
    /// Create a configuration with default settings for `dataset_path`
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            batch_size: DEFAULT_TRAINING_BATCH_SIZE,
            min_num_of_concepts: DEFAULT_MIN_NUM_OF_CONCEPTS,
            shuffle: true,
            seed: 0,
        }
    }

    /// Set the batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the minimum sequence length
    #[must_use]
    pub fn with_min_num_of_concepts(mut self, min: usize) -> Self {
        self.min_num_of_concepts = min;
        self
    }

    /// Enable or disable seeded shuffling
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool, seed: u64) -> Self {
        self.shuffle = shuffle;
        self.seed = seed;
        self
    }
}

impl fmt::Display for TrainerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dataset={} batch_size={} min_num_of_concepts={} shuffle={} seed={}",
            self.dataset_path.display(),
            self.batch_size,
            self.min_num_of_concepts,
            self.shuffle,
            self.seed
        )
    }
}

/// Examples ready for a training loop
#[derive(Debug, Clone)]
pub struct PreparedDataset<E> {
    /// Prepared examples
    pub examples: Vec<E>,
    /// Batches per epoch
    pub steps_per_epoch: usize,
    /// Vocabulary fitted on the kept sequences
    pub tokenizer: Tokenizer,
}

/// Reads a persisted dataset and prepares it with a [`DatasetStrategy`]
#[derive(Debug, Clone)]
pub struct TrainingDataLoader {
    config: TrainerConfig,
}

impl TrainingDataLoader {
    /// Create a loader
    #[must_use]
    pub const fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Load, filter, shuffle, tokenize and prepare the dataset
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the dataset does not exist or the batch size is
    /// zero, and any error raised while decoding the dataset
    pub fn load<S: DatasetStrategy>(&self, strategy: &S) -> Result<PreparedDataset<S::Example>> {
        let config = &self.config;
        log::info!("Preparing {} data: {config}", strategy.name());

        if config.batch_size == 0 {
            return Err(Error::config("Training batch size must be positive"));
        }
        if !config.dataset_path.exists() {
            return Err(Error::config(format!(
                "Training dataset does not exist: {}",
                config.dataset_path.display()
            )));
        }

        let mut sequences = read_dataset(&config.dataset_path)?;
        let total = sequences.len();
        sequences.retain(|s| s.len() >= config.min_num_of_concepts);
        log::debug!(
            "Kept {} of {} sequences with at least {} concepts",
            sequences.len(),
            total,
            config.min_num_of_concepts
        );

        if config.shuffle {
            let mut rng = StdRng::seed_from_u64(config.seed);
            sequences.shuffle(&mut rng);
        }

        let tokenizer = Tokenizer::fit(&sequences);
        let examples = strategy.prepare(&sequences, &tokenizer);
        let steps_per_epoch = examples.len().div_ceil(config.batch_size);

        Ok(PreparedDataset {
            examples,
            steps_per_epoch,
            tokenizer,
        })
    }
}
