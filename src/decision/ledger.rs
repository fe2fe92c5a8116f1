//! Score and weight ledgers.
//!
//! Both ledgers are upsert-only maps from a positional key to a [`Rating`]:
//! writing an existing key replaces its value, so at most one entry per key
//! can exist. Values are clamped on the way in. There is no delete.
//!
//! Keys are positions into the session's option/criterion lists. Removing an
//! option or criterion does not touch the ledgers; completeness only counts
//! entries whose keys are inside the current list bounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rating::Rating;

/// One recorded score, in the shape the interpreter's explain request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    /// Position of the option.
    pub option_index: usize,
    /// Position of the criterion.
    pub criterion_index: usize,
    /// The score.
    pub score: Rating,
}

/// One recorded weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    /// Position of the criterion.
    pub criterion_index: usize,
    /// The weight.
    pub weight: Rating,
}

/// Scores keyed by `(option_index, criterion_index)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    entries: BTreeMap<(usize, usize), Rating>,
}

impl ScoreLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the score for a pair, clamping `value` into `1..=5`.
    ///
    /// Returns the stored rating.
    pub fn upsert(&mut self, option_index: usize, criterion_index: usize, value: i64) -> Rating {
        let rating = Rating::clamped(value);
        self.entries.insert((option_index, criterion_index), rating);
        rating
    }

    /// Score for a pair, if one was recorded.
    #[must_use]
    pub fn get(&self, option_index: usize, criterion_index: usize) -> Option<u8> {
        self.rating(option_index, criterion_index).map(Rating::value)
    }

    /// Score for a pair as a [`Rating`].
    #[must_use]
    pub fn rating(&self, option_index: usize, criterion_index: usize) -> Option<Rating> {
        self.entries.get(&(option_index, criterion_index)).copied()
    }

    /// Whether a pair has been scored.
    #[must_use]
    pub fn contains(&self, option_index: usize, criterion_index: usize) -> bool {
        self.entries.contains_key(&(option_index, criterion_index))
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// True when every pair of the current lists has a score.
    #[must_use]
    pub fn is_complete(&self, options: usize, criteria: usize) -> bool {
        let in_bounds = self
            .entries
            .keys()
            .filter(|(o, c)| *o < options && *c < criteria)
            .count();
        in_bounds == options * criteria
    }

    /// All entries in `(option, criterion)` order.
    pub fn entries(&self) -> impl Iterator<Item = ScoreEntry> + '_ {
        self.entries.iter().map(|(&(o, c), &score)| ScoreEntry {
            option_index: o,
            criterion_index: c,
            score,
        })
    }
}

/// Weights keyed by `criterion_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightLedger {
    entries: BTreeMap<usize, Rating>,
}

impl WeightLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the weight for a criterion, clamping `value` into `1..=5`.
    pub fn upsert(&mut self, criterion_index: usize, value: i64) -> Rating {
        let rating = Rating::clamped(value);
        self.entries.insert(criterion_index, rating);
        rating
    }

    /// Weight for a criterion, if one was recorded.
    #[must_use]
    pub fn get(&self, criterion_index: usize) -> Option<u8> {
        self.rating(criterion_index).map(Rating::value)
    }

    /// Weight for a criterion as a [`Rating`].
    #[must_use]
    pub fn rating(&self, criterion_index: usize) -> Option<Rating> {
        self.entries.get(&criterion_index).copied()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// True when every current criterion has a weight.
    #[must_use]
    pub fn is_complete(&self, criteria: usize) -> bool {
        self.entries.keys().filter(|c| **c < criteria).count() == criteria
    }

    /// All entries in criterion order.
    pub fn entries(&self) -> impl Iterator<Item = WeightEntry> + '_ {
        self.entries
            .iter()
            .map(|(&criterion_index, &weight)| WeightEntry {
                criterion_index,
                weight,
            })
    }
}
