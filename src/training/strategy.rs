//! Dataset preparation strategies
//!
//! A strategy decides what one training example looks like. The loader drives
//! any strategy the same way: read, filter, shuffle, tokenize, prepare.

use crate::models::{Label, PersonId, SequenceRecord};
use crate::training::tokenizer::Tokenizer;

/// Turns tokenized sequences into model-specific examples
pub trait DatasetStrategy {
    /// One prepared example
    type Example;

    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Build examples from filtered, ordered sequences
    fn prepare(&self, sequences: &[SequenceRecord], tokenizer: &Tokenizer) -> Vec<Self::Example>;
}

/// Token sequence of one patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptSequence {
    /// Patient identifier
    pub person_id: PersonId,
    /// Token ids in chronological order
    pub tokens: Vec<u32>,
}

/// Token sequence of one patient with its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSequence {
    /// Patient identifier
    pub person_id: PersonId,
    /// Token ids in chronological order
    pub tokens: Vec<u32>,
    /// 1 for cases, 0 for controls
    pub label: i32,
}

/// Unlabeled token sequences, for concept embedding models
#[derive(Debug, Clone, Copy, Default)]
pub struct ConceptSequenceStrategy;

impl DatasetStrategy for ConceptSequenceStrategy {
    type Example = ConceptSequence;

    fn name(&self) -> &'static str {
        "concept_sequence"
    }

    fn prepare(&self, sequences: &[SequenceRecord], tokenizer: &Tokenizer) -> Vec<ConceptSequence> {
        sequences
            .iter()
            .map(|s| ConceptSequence {
                person_id: s.person_id,
                tokens: tokenizer.encode(s),
            })
            .collect()
    }
}

/// Labeled token sequences, for the heart-failure classifier
///
/// Sequences without a label are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledSequenceStrategy;

impl DatasetStrategy for LabeledSequenceStrategy {
    type Example = LabeledSequence;

    fn name(&self) -> &'static str {
        "labeled_sequence"
    }

    fn prepare(&self, sequences: &[SequenceRecord], tokenizer: &Tokenizer) -> Vec<LabeledSequence> {
        sequences
            .iter()
            .filter_map(|s| {
                Some(LabeledSequence {
                    person_id: s.person_id,
                    tokens: tokenizer.encode(s),
                    label: s.label.map(Label::as_i32)?,
                })
            })
            .collect()
    }
}
