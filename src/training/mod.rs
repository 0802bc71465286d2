//! Training data preparation
//!
//! Reads the persisted dataset and turns it into model inputs. Only the data
//! side lives here; models and optimizers are out of scope.

pub mod loader;
pub mod strategy;
pub mod tokenizer;

pub use loader::{PreparedDataset, TrainerConfig, TrainingDataLoader};
pub use strategy::{
    ConceptSequence, ConceptSequenceStrategy, DatasetStrategy, LabeledSequence,
    LabeledSequenceStrategy,
};
pub use tokenizer::{PADDING_TOKEN, Tokenizer};
