//! Aggregation engine.
//!
//! Pure functions from a decision snapshot to a ranked result. Absent scores
//! count as 0 and absent weights as 1, so a partially filled matrix can be
//! previewed at any time.

use serde::{Deserialize, Serialize};

use super::ledger::{ScoreLedger, WeightLedger};
use super::rating::Rating;

/// Score used for a pair that has not been scored.
pub const MISSING_SCORE: u32 = 0;
/// Weight used for a criterion that has not been weighted.
pub const MISSING_WEIGHT: u32 = 1;

/// One cell of the result matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBreakdown {
    /// Score used (0 when absent).
    pub score: u32,
    /// Weight used (1 when absent).
    pub weight: u32,
    /// `score * weight`.
    pub weighted: u32,
}

/// Derived ranking over the current decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Weighted total per option, in option order.
    pub weighted_totals: Vec<u32>,
    /// `criteria × 5 × 5`.
    pub max_possible_total: u32,
    /// First option reaching the highest total; `None` without options.
    pub winner_index: Option<usize>,
}

impl DecisionResult {
    /// Total of the winning option.
    #[must_use]
    pub fn winning_total(&self) -> Option<u32> {
        self.winner_index
            .and_then(|i| self.weighted_totals.get(i).copied())
    }
}

/// Sum of score × weight over every criterion for one option.
#[must_use]
pub fn weighted_total(
    option_index: usize,
    criteria: usize,
    scores: &ScoreLedger,
    weights: &WeightLedger,
) -> u32 {
    (0..criteria)
        .map(|c| cell(option_index, c, scores, weights).weighted)
        .sum()
}

/// The score, weight and product used for one `(option, criterion)` pair.
#[must_use]
pub fn cell(
    option_index: usize,
    criterion_index: usize,
    scores: &ScoreLedger,
    weights: &WeightLedger,
) -> CellBreakdown {
    let score = scores
        .get(option_index, criterion_index)
        .map_or(MISSING_SCORE, u32::from);
    let weight = weights.get(criterion_index).map_or(MISSING_WEIGHT, u32::from);
    CellBreakdown {
        score,
        weight,
        weighted: score * weight,
    }
}

/// Highest achievable total: every score and every weight at 5.
#[must_use]
pub fn max_possible_total(criteria: usize) -> u32 {
    let per_criterion = u32::from(Rating::MAX.value()) * u32::from(Rating::MAX.value());
    u32::try_from(criteria)
        .unwrap_or(u32::MAX)
        .saturating_mul(per_criterion)
}

/// Index of the first maximal total.
///
/// Options are scanned in ascending order and only a strictly greater total
/// replaces the running leader, so ties go to the lowest index.
#[must_use]
pub fn winner_index(totals: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, &total) in totals.iter().enumerate() {
        match best {
            Some((_, leader)) if total <= leader => {}
            _ => best = Some((index, total)),
        }
    }
    best.map(|(index, _)| index)
}

/// Compute the full result for a decision snapshot.
///
/// # Example
///
/// ```
/// use deecide::decision::{aggregate, ScoreLedger, WeightLedger};
///
/// let mut scores = ScoreLedger::new();
/// let mut weights = WeightLedger::new();
/// scores.upsert(0, 0, 5);
/// scores.upsert(0, 1, 2);
/// scores.upsert(1, 0, 4);
/// scores.upsert(1, 1, 5);
/// weights.upsert(0, 5);
/// weights.upsert(1, 1);
///
/// let result = aggregate(2, 2, &scores, &weights);
/// assert_eq!(result.weighted_totals, vec![27, 25]);
/// assert_eq!(result.max_possible_total, 50);
/// assert_eq!(result.winner_index, Some(0));
/// ```
#[must_use]
pub fn aggregate(
    options: usize,
    criteria: usize,
    scores: &ScoreLedger,
    weights: &WeightLedger,
) -> DecisionResult {
    let weighted_totals: Vec<u32> = (0..options)
        .map(|o| weighted_total(o, criteria, scores, weights))
        .collect();
    let winner_index = winner_index(&weighted_totals);
    DecisionResult {
        weighted_totals,
        max_possible_total: max_possible_total(criteria),
        winner_index,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn pizza_vs_sushi(taste_weight: i64) -> (ScoreLedger, WeightLedger) {
        let mut scores = ScoreLedger::new();
        scores.upsert(0, 0, 5);
        scores.upsert(0, 1, 2);
        scores.upsert(1, 0, 4);
        scores.upsert(1, 1, 5);
        let mut weights = WeightLedger::new();
        weights.upsert(0, taste_weight);
        weights.upsert(1, 1);
        (scores, weights)
    }

    #[test]
    fn test_tie_goes_to_first_option() {
        let (scores, weights) = pizza_vs_sushi(3);
        let result = aggregate(2, 2, &scores, &weights);
        assert_eq!(result.weighted_totals, vec![17, 17]);
        assert_eq!(result.winner_index, Some(0));
    }

    #[test]
    fn test_heavier_taste_weight_favours_pizza() {
        let (scores, weights) = pizza_vs_sushi(5);
        let result = aggregate(2, 2, &scores, &weights);
        assert_eq!(result.weighted_totals, vec![27, 25]);
        assert_eq!(result.winner_index, Some(0));
        assert_eq!(result.winning_total(), Some(27));
    }

    #[test]
    fn test_missing_entries_use_defaults() {
        let mut scores = ScoreLedger::new();
        scores.upsert(1, 0, 4);
        let weights = WeightLedger::new();
        let result = aggregate(2, 2, &scores, &weights);
        // Unscored pairs add 0, unweighted criteria multiply by 1.
        assert_eq!(result.weighted_totals, vec![0, 4]);
        assert_eq!(result.winner_index, Some(1));
    }

    #[test]
    fn test_cell_breakdown() {
        let (scores, weights) = pizza_vs_sushi(3);
        assert_eq!(
            cell(1, 0, &scores, &weights),
            CellBreakdown {
                score: 4,
                weight: 3,
                weighted: 12
            }
        );
        assert_eq!(
            cell(5, 0, &scores, &weights),
            CellBreakdown {
                score: 0,
                weight: 3,
                weighted: 0
            }
        );
    }

    #[test]
    fn test_all_zero_totals_pick_first() {
        assert_eq!(winner_index(&[0, 0, 0]), Some(0));
    }

    #[test]
    fn test_no_options_no_winner() {
        let result = aggregate(0, 3, &ScoreLedger::new(), &WeightLedger::new());
        assert!(result.weighted_totals.is_empty());
        assert_eq!(result.winner_index, None);
        assert_eq!(result.winning_total(), None);
        assert_eq!(result.max_possible_total, 75);
    }

    #[test]
    fn test_later_strictly_greater_wins() {
        assert_eq!(winner_index(&[3, 9, 9, 4]), Some(1));
    }

    proptest! {
        #[test]
        fn prop_total_matches_definition(
            options in 1usize..6,
            criteria in 1usize..6,
            raw_scores in prop::collection::vec(prop::option::of(-2i64..9), 36),
            raw_weights in prop::collection::vec(prop::option::of(-2i64..9), 6),
        ) {
            let mut scores = ScoreLedger::new();
            let mut weights = WeightLedger::new();
            for o in 0..options {
                for c in 0..criteria {
                    if let Some(v) = raw_scores[o * 6 + c] {
                        scores.upsert(o, c, v);
                    }
                }
            }
            for (c, w) in raw_weights.iter().enumerate().take(criteria) {
                if let Some(v) = w {
                    weights.upsert(c, *v);
                }
            }

            let result = aggregate(options, criteria, &scores, &weights);
            for o in 0..options {
                let expected: u32 = (0..criteria)
                    .map(|c| {
                        let s = raw_scores[o * 6 + c].map_or(0, |v| u32::try_from(v.clamp(1, 5)).unwrap());
                        let w = raw_weights[c].map_or(1, |v| u32::try_from(v.clamp(1, 5)).unwrap());
                        s * w
                    })
                    .sum();
                prop_assert_eq!(result.weighted_totals[o], expected);
            }
            prop_assert_eq!(result.max_possible_total, u32::try_from(criteria).unwrap() * 25);
        }

        #[test]
        fn prop_winner_is_smallest_maximal_index(totals in prop::collection::vec(0u32..50, 1..10)) {
            let max = *totals.iter().max().unwrap();
            let expected = totals.iter().position(|t| *t == max);
            prop_assert_eq!(winner_index(&totals), expected);
        }
    }
}
