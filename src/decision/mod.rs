//! The decision session core.
//!
//! - [`DecisionSession`]: the wizard state machine
//! - [`ScoreLedger`] / [`WeightLedger`]: clamped 1–5 ratings
//! - [`aggregate()`]: weighted totals and the winner
//! - [`RequestTracker`]: stale-reply suppression for interpreter calls
//!
//! Nothing here performs I/O. Interpreter calls leave the session as
//! [`Effect`]s and come back as [`Completion`]s.

mod aggregate;
mod chat;
mod evaluation;
mod ledger;
mod model;
mod pending;
mod rating;
mod session;
mod step;

pub use aggregate::{
    aggregate, cell, max_possible_total, weighted_total, winner_index, CellBreakdown,
    DecisionResult, MISSING_SCORE, MISSING_WEIGHT,
};
pub use chat::{ChatMessage, ChatRole};
pub use evaluation::{EvaluationMode, Pair, PairSequence};
pub use ledger::{ScoreEntry, ScoreLedger, WeightEntry, WeightLedger};
pub use model::{Decision, ItemKind};
pub use pending::{Purpose, RequestState, RequestTracker, Ticket};
pub use rating::Rating;
pub use session::{
    Completion, DecisionSession, Effect, Resolution, SessionTimings, DEFAULT_EVALUATION_ADVANCE,
    DEFAULT_WEIGHING_ADVANCE,
};
pub use step::{Guard, Step, Transition, MIN_CRITERIA, MIN_OPTIONS};
