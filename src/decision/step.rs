//! Wizard steps and transition guards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of options before criteria can be entered.
pub const MIN_OPTIONS: usize = 2;
/// Minimum number of criteria before evaluation can start.
pub const MIN_CRITERIA: usize = 1;

/// The six steps of the decision wizard, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Naming the decision.
    Input,
    /// Listing the options.
    Options,
    /// Listing the criteria.
    Criteria,
    /// Scoring every option on every criterion.
    Evaluation,
    /// Weighting every criterion.
    Weighing,
    /// Ranked result.
    Results,
}

impl Step {
    /// All steps in forward order.
    pub const ALL: [Self; 6] = [
        Self::Input,
        Self::Options,
        Self::Criteria,
        Self::Evaluation,
        Self::Weighing,
        Self::Results,
    ];

    /// The step a forward transition leads to.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Input => Some(Self::Options),
            Self::Options => Some(Self::Criteria),
            Self::Criteria => Some(Self::Evaluation),
            Self::Evaluation => Some(Self::Weighing),
            Self::Weighing => Some(Self::Results),
            Self::Results => None,
        }
    }

    /// The step a backward transition leads to.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Input => None,
            Self::Options => Some(Self::Input),
            Self::Criteria => Some(Self::Options),
            Self::Evaluation => Some(Self::Criteria),
            Self::Weighing => Some(Self::Evaluation),
            Self::Results => Some(Self::Weighing),
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Options => "options",
            Self::Criteria => "criteria",
            Self::Evaluation => "evaluation",
            Self::Weighing => "weighing",
            Self::Results => "results",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transition did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "guard", rename_all = "snake_case")]
pub enum Guard {
    /// The title is blank.
    TitleRequired,
    /// Fewer than [`MIN_OPTIONS`] options.
    NotEnoughOptions {
        /// Options listed so far.
        have: usize,
    },
    /// Fewer than [`MIN_CRITERIA`] criteria.
    NotEnoughCriteria {
        /// Criteria listed so far.
        have: usize,
    },
    /// Some pair has no score.
    ScoresIncomplete {
        /// Scores recorded within bounds.
        scored: usize,
        /// Pairs in the matrix.
        required: usize,
    },
    /// Some criterion has no weight.
    WeightsIncomplete {
        /// Weights recorded within bounds.
        weighted: usize,
        /// Criteria in the list.
        required: usize,
    },
    /// No step in that direction.
    NoSuchStep,
    /// The session was not in the step the caller expected.
    StepChanged {
        /// The step the caller expected.
        expected: Step,
    },
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleRequired => f.write_str("enter what you are deciding first"),
            Self::NotEnoughOptions { have } => {
                write!(f, "add at least {MIN_OPTIONS} options (have {have})")
            }
            Self::NotEnoughCriteria { have } => {
                write!(f, "add at least {MIN_CRITERIA} criterion (have {have})")
            }
            Self::ScoresIncomplete { scored, required } => {
                write!(f, "score every option on every criterion ({scored}/{required})")
            }
            Self::WeightsIncomplete { weighted, required } => {
                write!(f, "weight every criterion ({weighted}/{required})")
            }
            Self::NoSuchStep => f.write_str("there is no step in that direction"),
            Self::StepChanged { expected } => {
                write!(f, "no longer in the {expected} step")
            }
        }
    }
}

/// Outcome of a step transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session moved.
    Moved {
        /// Step before the move.
        from: Step,
        /// Step after the move.
        to: Step,
    },
    /// The session stayed where it was.
    Blocked {
        /// The current step.
        step: Step,
        /// What prevented the move.
        guard: Guard,
    },
}

impl Transition {
    /// Whether the session moved.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}
