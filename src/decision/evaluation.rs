//! Evaluation modes and the conversational pair sequence.
//!
//! Conversational evaluation walks `(option, criterion)` pairs in row-major
//! order: `index = option_index * criteria + criterion_index`. Every walk
//! starts at position 0 and moves one pair per accepted reply, whether or
//! not a pair already has a score. Stepping past the last pair ends it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the score ledger is being filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Direct numeric entry, any order, freely revisable.
    #[default]
    Manual,
    /// One pair at a time, interpreted from free text.
    Conversational,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Conversational => "conversational",
        })
    }
}

/// An `(option, criterion)` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// Position of the option.
    pub option_index: usize,
    /// Position of the criterion.
    pub criterion_index: usize,
}

impl Pair {
    /// Create a pair.
    #[must_use]
    pub const fn new(option_index: usize, criterion_index: usize) -> Self {
        Self {
            option_index,
            criterion_index,
        }
    }
}

/// Row-major enumeration of the pairs of an `options × criteria` matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSequence {
    options: usize,
    criteria: usize,
}

impl PairSequence {
    /// Sequence over the given matrix size.
    #[must_use]
    pub const fn new(options: usize, criteria: usize) -> Self {
        Self { options, criteria }
    }

    /// Number of pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.options * self.criteria
    }

    /// True for an empty matrix.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The pair at a sequence position.
    #[must_use]
    pub const fn pair_at(&self, index: usize) -> Option<Pair> {
        if index >= self.len() {
            return None;
        }
        Some(Pair::new(index / self.criteria, index % self.criteria))
    }

    /// Sequence position of a pair.
    #[must_use]
    pub const fn position(&self, pair: Pair) -> usize {
        pair.option_index * self.criteria + pair.criterion_index
    }

    /// Where every walk starts; `None` for an empty matrix.
    #[must_use]
    pub const fn first(&self) -> Option<Pair> {
        self.pair_at(0)
    }

    /// The pair immediately after `current`; `None` past the end.
    #[must_use]
    pub const fn after(&self, current: Pair) -> Option<Pair> {
        self.pair_at(self.position(current) + 1)
    }
}
