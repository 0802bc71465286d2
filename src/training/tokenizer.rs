//! Concept vocabulary for model inputs

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::models::{ConceptId, SequenceRecord};

/// Token reserved for padding
pub const PADDING_TOKEN: u32 = 0;

/// Maps concept ids to dense token indices
///
/// Index 0 is reserved for padding; concepts are numbered from 1 in ascending
/// concept id order, so the mapping only depends on the set of concepts seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenizer {
    tokens: FxHashMap<ConceptId, u32>,
}

impl Tokenizer {
    /// Fit a vocabulary on every concept appearing in `sequences`
    #[must_use]
    pub fn fit(sequences: &[SequenceRecord]) -> Self {
        let concepts: BTreeSet<ConceptId> = sequences
            .iter()
            .flat_map(|s| s.events.iter().map(|e| e.standard_concept_id))
            .collect();
        let tokens = concepts.into_iter().zip(1u32..).collect();
        Self { tokens }
    }

    /// Token of `concept_id`, or `None` for unseen concepts
    #[must_use]
    pub fn token(&self, concept_id: ConceptId) -> Option<u32> {
        self.tokens.get(&concept_id).copied()
    }

    /// Encode a sequence, mapping unseen concepts to the padding token
    #[must_use]
    pub fn encode(&self, sequence: &SequenceRecord) -> Vec<u32> {
        sequence
            .events
            .iter()
            .map(|e| self.token(e.standard_concept_id).unwrap_or(PADDING_TOKEN))
            .collect()
    }

    /// Vocabulary size including the padding token
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.tokens.len() + 1
    }
}
