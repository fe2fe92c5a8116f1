//! Outstanding interpreter requests.
//!
//! Each purpose has one slot. Issuing a request stores a fresh [`Ticket`] in
//! the slot; a completion is only applied if its ticket is still the one held
//! there. Cancelling or re-issuing therefore turns any in-flight completion
//! for that purpose into a stale one.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::ItemKind;

/// What an interpreter request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Suggested options or criteria.
    Suggestions(ItemKind),
    /// Conversational score for the current pair.
    Evaluation,
    /// Conversational weights for all criteria.
    Weighing,
    /// Explanation of the final ranking.
    Explanation,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suggestions(kind) => write!(f, "{} suggestion", kind.singular()),
            Self::Evaluation => f.write_str("evaluation"),
            Self::Weighing => f.write_str("weighing"),
            Self::Explanation => f.write_str("explanation"),
        }
    }
}

/// Identity of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    /// Monotonic per session.
    pub id: u64,
    /// Slot the request occupies.
    pub purpose: Purpose,
}

/// Lifecycle of an advisory value fetched from the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState<T> {
    /// Nothing requested.
    #[default]
    Idle,
    /// Waiting for the interpreter.
    Pending,
    /// The value arrived.
    Ready(T),
    /// The interpreter failed; the message is for display.
    Failed(String),
}

impl<T> RequestState<T> {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The value, when ready.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// One slot per [`Purpose`].
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next_id: u64,
    option_suggestions: Option<Ticket>,
    criterion_suggestions: Option<Ticket>,
    evaluation: Option<Ticket>,
    weighing: Option<Ticket>,
    explanation: Option<Ticket>,
}

impl RequestTracker {
    /// Tracker with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, purpose: Purpose) -> &mut Option<Ticket> {
        match purpose {
            Purpose::Suggestions(ItemKind::Options) => &mut self.option_suggestions,
            Purpose::Suggestions(ItemKind::Criteria) => &mut self.criterion_suggestions,
            Purpose::Evaluation => &mut self.evaluation,
            Purpose::Weighing => &mut self.weighing,
            Purpose::Explanation => &mut self.explanation,
        }
    }

    /// Issue a ticket for `purpose`, superseding any ticket already held.
    pub fn issue(&mut self, purpose: Purpose) -> Ticket {
        self.next_id += 1;
        let ticket = Ticket {
            id: self.next_id,
            purpose,
        };
        *self.slot(purpose) = Some(ticket);
        ticket
    }

    /// Whether a request for `purpose` is outstanding.
    #[must_use]
    pub fn is_pending(&self, purpose: Purpose) -> bool {
        let slot = match purpose {
            Purpose::Suggestions(ItemKind::Options) => self.option_suggestions,
            Purpose::Suggestions(ItemKind::Criteria) => self.criterion_suggestions,
            Purpose::Evaluation => self.evaluation,
            Purpose::Weighing => self.weighing,
            Purpose::Explanation => self.explanation,
        };
        slot.is_some()
    }

    /// Drop the outstanding request for `purpose`, if any.
    ///
    /// Returns true when something was cancelled.
    pub fn cancel(&mut self, purpose: Purpose) -> bool {
        self.slot(purpose).take().is_some()
    }

    /// Release the slot if `ticket` is the current one.
    ///
    /// Returns false for a stale ticket, leaving the slot untouched.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        let slot = self.slot(ticket.purpose);
        if *slot == Some(ticket) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Cancel every outstanding request. Ticket ids keep increasing.
    pub fn cancel_all(&mut self) {
        self.option_suggestions = None;
        self.criterion_suggestions = None;
        self.evaluation = None;
        self.weighing = None;
        self.explanation = None;
    }
}
