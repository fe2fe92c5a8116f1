//! The decision session state machine.
//!
//! A [`DecisionSession`] owns the decision, both ledgers, the current step and
//! every outstanding interpreter request. It never awaits anything: operations
//! that need the interpreter queue an [`Effect`] carrying a [`Ticket`], and
//! the caller later hands the outcome back as a [`Completion`]. A completion
//! whose ticket was cancelled or superseded in the meantime is discarded.
//!
//! ```
//! use deecide::decision::{DecisionSession, Effect, Step};
//!
//! let mut session = DecisionSession::new();
//! session.set_title("Where to eat tonight").unwrap();
//! assert!(session.advance().moved());
//! assert_eq!(session.step(), Step::Options);
//!
//! // Entering the options step asks for suggestions.
//! let effects = session.drain_effects();
//! assert!(matches!(effects.as_slice(), [Effect::Suggest { .. }]));
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::aggregate::{self, CellBreakdown, DecisionResult};
use super::chat::{self, AppliedWeight, ChatMessage};
use super::evaluation::{EvaluationMode, Pair, PairSequence};
use super::ledger::{ScoreLedger, WeightLedger};
use super::model::{Decision, ItemKind};
use super::pending::{Purpose, RequestState, RequestTracker, Ticket};
use super::rating::Rating;
use super::step::{Guard, Step, Transition, MIN_CRITERIA, MIN_OPTIONS};
use crate::error::{CollaboratorError, SessionError};
use crate::interpret::{
    EvaluateReply, EvaluateRequest, ExplainRequest, SuggestRequest, WeightReply, WeightRequest,
};

/// Pause between the last conversational score and leaving evaluation.
pub const DEFAULT_EVALUATION_ADVANCE: Duration = Duration::from_millis(2000);
/// Pause between the last conversational weight and leaving weighing.
pub const DEFAULT_WEIGHING_ADVANCE: Duration = Duration::from_millis(3000);

/// Auto-advance delays after a conversational step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Delay after the score ledger completes.
    pub evaluation_advance: Duration,
    /// Delay after the weight ledger completes.
    pub weighing_advance: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            evaluation_advance: DEFAULT_EVALUATION_ADVANCE,
            weighing_advance: DEFAULT_WEIGHING_ADVANCE,
        }
    }
}

/// An interpreter call the session wants made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch suggestions for a list.
    Suggest {
        /// Identity of the request.
        ticket: Ticket,
        /// Payload.
        request: SuggestRequest,
    },
    /// Interpret a conversational score.
    Evaluate {
        /// Identity of the request.
        ticket: Ticket,
        /// Payload.
        request: EvaluateRequest,
    },
    /// Interpret conversational weights.
    Weigh {
        /// Identity of the request.
        ticket: Ticket,
        /// Payload.
        request: WeightRequest,
    },
    /// Explain the ranking.
    Explain {
        /// Identity of the request.
        ticket: Ticket,
        /// Payload.
        request: ExplainRequest,
    },
}

impl Effect {
    /// Identity of the request.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Suggest { ticket, .. }
            | Self::Evaluate { ticket, .. }
            | Self::Weigh { ticket, .. }
            | Self::Explain { ticket, .. } => *ticket,
        }
    }
}

/// Outcome of an [`Effect`], handed back to [`DecisionSession::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Reply to [`Effect::Suggest`].
    Suggestions {
        /// Ticket of the effect.
        ticket: Ticket,
        /// Suggestions or the failure.
        result: Result<Vec<String>, CollaboratorError>,
    },
    /// Reply to [`Effect::Evaluate`].
    Evaluation {
        /// Ticket of the effect.
        ticket: Ticket,
        /// Interpreted score or the failure.
        result: Result<EvaluateReply, CollaboratorError>,
    },
    /// Reply to [`Effect::Weigh`].
    Weights {
        /// Ticket of the effect.
        ticket: Ticket,
        /// Interpreted weights or the failure.
        result: Result<WeightReply, CollaboratorError>,
    },
    /// Reply to [`Effect::Explain`].
    Explanation {
        /// Ticket of the effect.
        ticket: Ticket,
        /// Explanation text or the failure.
        result: Result<String, CollaboratorError>,
    },
}

impl Completion {
    /// Ticket of the originating effect.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Suggestions { ticket, .. }
            | Self::Evaluation { ticket, .. }
            | Self::Weights { ticket, .. }
            | Self::Explanation { ticket, .. } => *ticket,
        }
    }
}

/// What [`DecisionSession::resolve`] did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The ticket was cancelled or superseded; nothing changed.
    Stale {
        /// The discarded ticket.
        ticket: Ticket,
    },
    /// The reply was applied.
    Applied {
        /// What the request was for.
        purpose: Purpose,
    },
    /// A conversational reply failed; the user was asked to rephrase.
    Retry {
        /// What the request was for.
        purpose: Purpose,
        /// Why.
        error: CollaboratorError,
    },
    /// An advisory request failed; the failure is shown in its place.
    Failed {
        /// What the request was for.
        purpose: Purpose,
        /// Why.
        error: CollaboratorError,
    },
    /// The reply completed a ledger conversationally. The caller should call
    /// [`DecisionSession::advance_from`] with `step` once `advance_after` has
    /// elapsed.
    Completed {
        /// What the request was for.
        purpose: Purpose,
        /// Step that is now ready to be left.
        step: Step,
        /// Delay before advancing.
        advance_after: Duration,
    },
}

/// One decision being worked through the wizard.
#[derive(Debug, Clone)]
pub struct DecisionSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    decision: Decision,
    scores: ScoreLedger,
    weights: WeightLedger,
    step: Step,
    mode: EvaluationMode,
    timings: SessionTimings,
    requests: RequestTracker,
    option_suggestions: RequestState<Vec<String>>,
    criterion_suggestions: RequestState<Vec<String>>,
    explanation: RequestState<String>,
    cursor: Option<Pair>,
    awaiting: Option<Pair>,
    evaluation_chat: Vec<ChatMessage>,
    weighing_chat: Vec<ChatMessage>,
    outbox: Vec<Effect>,
}

impl Default for DecisionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionSession {
    /// Fresh session in the input step, manual mode, default timings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            decision: Decision::default(),
            scores: ScoreLedger::new(),
            weights: WeightLedger::new(),
            step: Step::Input,
            mode: EvaluationMode::default(),
            timings: SessionTimings::default(),
            requests: RequestTracker::new(),
            option_suggestions: RequestState::Idle,
            criterion_suggestions: RequestState::Idle,
            explanation: RequestState::Idle,
            cursor: None,
            awaiting: None,
            evaluation_chat: Vec::new(),
            weighing_chat: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Use custom auto-advance delays.
    #[must_use]
    pub fn with_timings(mut self, timings: SessionTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Use a starting evaluation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// When this session (or its last reset) started.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Title and lists.
    #[must_use]
    pub const fn decision(&self) -> &Decision {
        &self.decision
    }

    /// Recorded scores.
    #[must_use]
    pub const fn scores(&self) -> &ScoreLedger {
        &self.scores
    }

    /// Recorded weights.
    #[must_use]
    pub const fn weights(&self) -> &WeightLedger {
        &self.weights
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Current evaluation mode.
    #[must_use]
    pub const fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Auto-advance delays.
    #[must_use]
    pub const fn timings(&self) -> SessionTimings {
        self.timings
    }

    /// The pair conversational evaluation is asking about.
    #[must_use]
    pub const fn current_pair(&self) -> Option<Pair> {
        self.cursor
    }

    /// Conversational evaluation transcript for the current visit.
    #[must_use]
    pub fn evaluation_transcript(&self) -> &[ChatMessage] {
        &self.evaluation_chat
    }

    /// Conversational weighing transcript for the current visit.
    #[must_use]
    pub fn weighing_transcript(&self) -> &[ChatMessage] {
        &self.weighing_chat
    }

    /// Raw suggestion state for a list.
    #[must_use]
    pub const fn suggestions(&self, kind: ItemKind) -> &RequestState<Vec<String>> {
        match kind {
            ItemKind::Options => &self.option_suggestions,
            ItemKind::Criteria => &self.criterion_suggestions,
        }
    }

    /// Explanation state in the results step.
    #[must_use]
    pub const fn explanation(&self) -> &RequestState<String> {
        &self.explanation
    }

    /// Whether a request for `purpose` is outstanding.
    #[must_use]
    pub fn is_pending(&self, purpose: Purpose) -> bool {
        self.requests.is_pending(purpose)
    }

    /// Take every effect queued since the last call.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    /// Suggestions worth showing: trimmed, non-blank, not already listed and
    /// not repeated, all compared case-insensitively.
    #[must_use]
    pub fn visible_suggestions(&self, kind: ItemKind) -> Vec<&str> {
        let Some(raw) = self.suggestions(kind).ready() else {
            return Vec::new();
        };
        let mut seen: Vec<String> = Vec::new();
        raw.iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter(|s| {
                let key = s.to_lowercase();
                if self.decision.contains(kind, s) || seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    fn require_step(&self, action: &'static str, step: Step) -> Result<(), SessionError> {
        if self.step == step {
            Ok(())
        } else {
            Err(SessionError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    /// Set the decision title.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongStep`] outside the input step,
    /// [`SessionError::BlankText`] for blank text.
    pub fn set_title(&mut self, text: &str) -> Result<(), SessionError> {
        self.require_step("edit the title", Step::Input)?;
        let title = text.trim();
        if title.is_empty() {
            return Err(SessionError::BlankText { field: "title" });
        }
        self.decision.title = title.to_owned();
        Ok(())
    }

    /// Append trimmed text to a list. Returns the new entry's index.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongStep`] outside the list's own step,
    /// [`SessionError::BlankText`] for blank text.
    pub fn add_item(&mut self, kind: ItemKind, text: &str) -> Result<usize, SessionError> {
        let action = match kind {
            ItemKind::Options => "add options",
            ItemKind::Criteria => "add criteria",
        };
        self.require_step(action, list_step(kind))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::BlankText {
                field: kind.singular(),
            });
        }
        let items = self.decision.items_mut(kind);
        items.push(text.to_owned());
        tracing::debug!(session_id = %self.id, kind = kind.as_wire(), text, "Item added");
        Ok(items.len() - 1)
    }

    /// Remove an entry by index, shifting later entries down.
    ///
    /// Recorded scores and weights are not re-indexed.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongStep`] outside the list's own step,
    /// [`SessionError::IndexOutOfRange`] for a bad index.
    pub fn remove_item(&mut self, kind: ItemKind, index: usize) -> Result<String, SessionError> {
        let action = match kind {
            ItemKind::Options => "remove options",
            ItemKind::Criteria => "remove criteria",
        };
        self.require_step(action, list_step(kind))?;
        let items = self.decision.items_mut(kind);
        if index >= items.len() {
            return Err(SessionError::IndexOutOfRange {
                kind,
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// Add an option. See [`Self::add_item`].
    ///
    /// # Errors
    ///
    /// As [`Self::add_item`].
    pub fn add_option(&mut self, text: &str) -> Result<usize, SessionError> {
        self.add_item(ItemKind::Options, text)
    }

    /// Remove an option. See [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// As [`Self::remove_item`].
    pub fn remove_option(&mut self, index: usize) -> Result<String, SessionError> {
        self.remove_item(ItemKind::Options, index)
    }

    /// Add a criterion. See [`Self::add_item`].
    ///
    /// # Errors
    ///
    /// As [`Self::add_item`].
    pub fn add_criterion(&mut self, text: &str) -> Result<usize, SessionError> {
        self.add_item(ItemKind::Criteria, text)
    }

    /// Remove a criterion. See [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// As [`Self::remove_item`].
    pub fn remove_criterion(&mut self, index: usize) -> Result<String, SessionError> {
        self.remove_item(ItemKind::Criteria, index)
    }

    /// Append the `index`th entry of [`Self::visible_suggestions`].
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongStep`] outside the list's own step,
    /// [`SessionError::IndexOutOfRange`] for a bad index.
    pub fn add_suggestion(&mut self, kind: ItemKind, index: usize) -> Result<String, SessionError> {
        self.require_step("pick suggestions", list_step(kind))?;
        let visible = self.visible_suggestions(kind);
        let len = visible.len();
        let chosen = visible
            .get(index)
            .map(|s| (*s).to_owned())
            .ok_or(SessionError::IndexOutOfRange { kind, index, len })?;
        self.add_item(kind, &chosen)?;
        Ok(chosen)
    }

    fn check_index(kind: ItemKind, index: usize, len: usize) -> Result<(), SessionError> {
        if index < len {
            Ok(())
        } else {
            Err(SessionError::IndexOutOfRange { kind, index, len })
        }
    }

    /// Record a score directly, in either evaluation mode. The value is
    /// clamped and the previous score for the pair is replaced.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongStep`] outside evaluation,
    /// [`SessionError::IndexOutOfRange`] for a bad index.
    pub fn set_score(
        &mut self,
        option_index: usize,
        criterion_index: usize,
        value: i64,
    ) -> Result<Rating, SessionError> {
        self.require_step("set scores", Step::Evaluation)?;
        Self::check_index(ItemKind::Options, option_index, self.decision.options.len())?;
        Self::check_index(ItemKind::Criteria, criterion_index, self.decision.criteria.len())?;
        let rating = self.scores.upsert(option_index, criterion_index, value);
        tracing::debug!(
            session_id = %self.id,
            option_index,
            criterion_index,
            score = rating.value(),
            "Score recorded"
        );
        Ok(rating)
    }

    /// Record a weight directly. The value is clamped and replaces any
    /// previous weight for the criterion.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongStep`] outside weighing,
    /// [`SessionError::IndexOutOfRange`] for a bad index.
    pub fn set_weight(&mut self, criterion_index: usize, value: i64) -> Result<Rating, SessionError> {
        self.require_step("set weights", Step::Weighing)?;
        Self::check_index(ItemKind::Criteria, criterion_index, self.decision.criteria.len())?;
        let rating = self.weights.upsert(criterion_index, value);
        tracing::debug!(
            session_id = %self.id,
            criterion_index,
            weight = rating.value(),
            "Weight recorded"
        );
        Ok(rating)
    }

    /// Switch evaluation mode. Any outstanding evaluation request is
    /// cancelled. Returns false when the mode was already `mode`.
    pub fn set_mode(&mut self, mode: EvaluationMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.requests.cancel(Purpose::Evaluation);
        self.awaiting = None;
        if self.step == Step::Evaluation {
            self.evaluation_chat.clear();
            self.cursor = None;
            if mode == EvaluationMode::Conversational {
                self.start_conversation();
            }
        }
        tracing::info!(session_id = %self.id, %mode, "Evaluation mode changed");
        true
    }

    // ------------------------------------------------------------------
    // Conversation
    // ------------------------------------------------------------------

    fn sequence(&self) -> PairSequence {
        PairSequence::new(self.decision.options.len(), self.decision.criteria.len())
    }

    fn pair_texts(&self, pair: Pair) -> Option<(&str, &str)> {
        Some((
            self.decision.options.get(pair.option_index)?.as_str(),
            self.decision.criteria.get(pair.criterion_index)?.as_str(),
        ))
    }

    fn start_conversation(&mut self) {
        self.cursor = self.sequence().first();
        let opening = self.cursor.and_then(|pair| {
            self.pair_texts(pair)
                .map(|(option, criterion)| chat::evaluation_prompt(option, criterion))
        });
        let opening =
            opening.unwrap_or_else(|| "There is nothing to evaluate yet.".into());
        self.evaluation_chat.push(ChatMessage::assistant(opening));
    }

    /// Describe the current pair in free text. Queues an [`Effect::Evaluate`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::WrongStep`] outside evaluation
    /// - [`SessionError::NotConversational`] in manual mode
    /// - [`SessionError::BlankText`] for blank text
    /// - [`SessionError::RequestPending`] while the previous message is out
    /// - [`SessionError::NothingToEvaluate`] once the walk has passed the last pair
    pub fn send_evaluation_message(&mut self, text: &str) -> Result<(), SessionError> {
        self.require_step("describe scores", Step::Evaluation)?;
        if self.mode != EvaluationMode::Conversational {
            return Err(SessionError::NotConversational);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::BlankText { field: "message" });
        }
        if self.requests.is_pending(Purpose::Evaluation) {
            return Err(SessionError::RequestPending {
                purpose: Purpose::Evaluation,
            });
        }
        let pair = self.cursor.ok_or(SessionError::NothingToEvaluate)?;
        let (option, criterion) = self
            .pair_texts(pair)
            .map(|(o, c)| (o.to_owned(), c.to_owned()))
            .ok_or(SessionError::NothingToEvaluate)?;

        self.evaluation_chat.push(ChatMessage::user(text));
        let ticket = self.requests.issue(Purpose::Evaluation);
        self.awaiting = Some(pair);
        self.outbox.push(Effect::Evaluate {
            ticket,
            request: EvaluateRequest {
                user_message: text.to_owned(),
                option,
                criterion,
            },
        });
        Ok(())
    }

    /// Describe the importance of the criteria in free text. Queues an
    /// [`Effect::Weigh`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::WrongStep`] outside weighing
    /// - [`SessionError::BlankText`] for blank text
    /// - [`SessionError::RequestPending`] while the previous message is out
    pub fn send_weighing_message(&mut self, text: &str) -> Result<(), SessionError> {
        self.require_step("describe weights", Step::Weighing)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::BlankText { field: "message" });
        }
        if self.requests.is_pending(Purpose::Weighing) {
            return Err(SessionError::RequestPending {
                purpose: Purpose::Weighing,
            });
        }
        self.weighing_chat.push(ChatMessage::user(text));
        let ticket = self.requests.issue(Purpose::Weighing);
        self.outbox.push(Effect::Weigh {
            ticket,
            request: WeightRequest {
                user_message: text.to_owned(),
                criteria: self.decision.criteria.clone(),
            },
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn in_bounds_scores(&self) -> usize {
        let (options, criteria) = (self.decision.options.len(), self.decision.criteria.len());
        self.scores
            .entries()
            .filter(|e| e.option_index < options && e.criterion_index < criteria)
            .count()
    }

    fn in_bounds_weights(&self) -> usize {
        let criteria = self.decision.criteria.len();
        self.weights
            .entries()
            .filter(|e| e.criterion_index < criteria)
            .count()
    }

    fn forward_guard(&self) -> Option<Guard> {
        let options = self.decision.options.len();
        let criteria = self.decision.criteria.len();
        match self.step {
            Step::Input if self.decision.title.trim().is_empty() => Some(Guard::TitleRequired),
            Step::Options if options < MIN_OPTIONS => Some(Guard::NotEnoughOptions { have: options }),
            Step::Criteria if criteria < MIN_CRITERIA => {
                Some(Guard::NotEnoughCriteria { have: criteria })
            }
            Step::Evaluation if !self.scores.is_complete(options, criteria) => {
                Some(Guard::ScoresIncomplete {
                    scored: self.in_bounds_scores(),
                    required: self.decision.pair_count(),
                })
            }
            Step::Weighing if !self.weights.is_complete(criteria) => {
                Some(Guard::WeightsIncomplete {
                    weighted: self.in_bounds_weights(),
                    required: criteria,
                })
            }
            Step::Results => Some(Guard::NoSuchStep),
            _ => None,
        }
    }

    fn blocked(&self, guard: Guard) -> Transition {
        tracing::debug!(session_id = %self.id, step = %self.step, %guard, "Transition blocked");
        Transition::Blocked {
            step: self.step,
            guard,
        }
    }

    /// Move to the next step if its guard passes.
    pub fn advance(&mut self) -> Transition {
        let from = self.step;
        if let Some(guard) = self.forward_guard() {
            return self.blocked(guard);
        }
        let Some(to) = from.next() else {
            return self.blocked(Guard::NoSuchStep);
        };
        self.move_to(to);
        Transition::Moved { from, to }
    }

    /// [`Self::advance`], but only if the session is still in `expected`.
    ///
    /// Used for delayed auto-advance so a user who navigated away in the
    /// meantime is not moved.
    pub fn advance_from(&mut self, expected: Step) -> Transition {
        if self.step != expected {
            return self.blocked(Guard::StepChanged { expected });
        }
        self.advance()
    }

    /// Move to the previous step. Never guarded; nothing is discarded.
    pub fn back(&mut self) -> Transition {
        let from = self.step;
        let Some(to) = from.previous() else {
            return self.blocked(Guard::NoSuchStep);
        };
        self.move_to(to);
        Transition::Moved { from, to }
    }

    /// Discard the decision and start over in the input step.
    ///
    /// Every outstanding request becomes stale. The evaluation mode and
    /// timings are kept.
    pub fn reset(&mut self) {
        let mut requests = std::mem::take(&mut self.requests);
        requests.cancel_all();
        let previous = self.id;
        *self = Self {
            requests,
            mode: self.mode,
            timings: self.timings,
            ..Self::new()
        };
        tracing::info!(previous_session_id = %previous, session_id = %self.id, "Session reset");
    }

    fn move_to(&mut self, to: Step) {
        let from = self.step;
        self.leave(from);
        self.step = to;
        self.enter(to);
        tracing::info!(session_id = %self.id, %from, %to, "Step changed");
    }

    fn leave(&mut self, step: Step) {
        match step {
            Step::Options | Step::Criteria => {
                let kind = if step == Step::Options {
                    ItemKind::Options
                } else {
                    ItemKind::Criteria
                };
                if self.requests.cancel(Purpose::Suggestions(kind)) {
                    *self.suggestions_mut(kind) = RequestState::Idle;
                }
            }
            Step::Evaluation => {
                self.requests.cancel(Purpose::Evaluation);
                self.awaiting = None;
            }
            Step::Weighing => {
                self.requests.cancel(Purpose::Weighing);
            }
            Step::Results => {
                self.requests.cancel(Purpose::Explanation);
                self.explanation = RequestState::Idle;
            }
            Step::Input => {}
        }
    }

    fn enter(&mut self, step: Step) {
        match step {
            Step::Options => self.request_suggestions(ItemKind::Options),
            Step::Criteria => self.request_suggestions(ItemKind::Criteria),
            Step::Evaluation => {
                self.evaluation_chat.clear();
                self.cursor = None;
                if self.mode == EvaluationMode::Conversational {
                    self.start_conversation();
                }
            }
            Step::Weighing => {
                self.weighing_chat = vec![ChatMessage::assistant(chat::weighing_prompt(
                    &self.decision.criteria,
                ))];
            }
            Step::Results => self.request_explanation(),
            Step::Input => {}
        }
    }

    fn suggestions_mut(&mut self, kind: ItemKind) -> &mut RequestState<Vec<String>> {
        match kind {
            ItemKind::Options => &mut self.option_suggestions,
            ItemKind::Criteria => &mut self.criterion_suggestions,
        }
    }

    fn request_suggestions(&mut self, kind: ItemKind) {
        let ticket = self.requests.issue(Purpose::Suggestions(kind));
        *self.suggestions_mut(kind) = RequestState::Pending;
        self.outbox.push(Effect::Suggest {
            ticket,
            request: SuggestRequest {
                decision_title: self.decision.title.clone(),
                kind,
            },
        });
    }

    fn request_explanation(&mut self) {
        let result = self.preview();
        let ticket = self.requests.issue(Purpose::Explanation);
        self.explanation = RequestState::Pending;
        self.outbox.push(Effect::Explain {
            ticket,
            request: ExplainRequest {
                decision_title: self.decision.title.clone(),
                options: self.decision.options.clone(),
                criteria: self.decision.criteria.clone(),
                scores: self.scores.entries().collect(),
                weights: self.weights.entries().collect(),
                winner_index: result.winner_index.unwrap_or(0),
            },
        });
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Aggregate the current ledgers, whatever the step.
    #[must_use]
    pub fn preview(&self) -> DecisionResult {
        aggregate::aggregate(
            self.decision.options.len(),
            self.decision.criteria.len(),
            &self.scores,
            &self.weights,
        )
    }

    /// The final result, available in the results step only.
    #[must_use]
    pub fn result(&self) -> Option<DecisionResult> {
        (self.step == Step::Results).then(|| self.preview())
    }

    /// Score, weight and product for one pair.
    #[must_use]
    pub fn cell(&self, option_index: usize, criterion_index: usize) -> CellBreakdown {
        aggregate::cell(option_index, criterion_index, &self.scores, &self.weights)
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Apply the outcome of an effect.
    pub fn resolve(&mut self, completion: Completion) -> Resolution {
        let ticket = completion.ticket();
        if !self.requests.complete(ticket) {
            tracing::debug!(
                session_id = %self.id,
                ticket = ticket.id,
                purpose = %ticket.purpose,
                "Discarding stale completion"
            );
            return Resolution::Stale { ticket };
        }
        match completion {
            Completion::Suggestions { result, .. } => match ticket.purpose {
                Purpose::Suggestions(kind) => self.apply_suggestions(kind, result),
                _ => Resolution::Stale { ticket },
            },
            Completion::Evaluation { result, .. } => self.apply_evaluation(ticket, result),
            Completion::Weights { result, .. } => self.apply_weights(result),
            Completion::Explanation { result, .. } => self.apply_explanation(result),
        }
    }

    fn apply_suggestions(
        &mut self,
        kind: ItemKind,
        result: Result<Vec<String>, CollaboratorError>,
    ) -> Resolution {
        let purpose = Purpose::Suggestions(kind);
        match result {
            Ok(list) => {
                tracing::debug!(session_id = %self.id, kind = kind.as_wire(), count = list.len(), "Suggestions ready");
                *self.suggestions_mut(kind) = RequestState::Ready(list);
                Resolution::Applied { purpose }
            }
            Err(error) => {
                tracing::warn!(session_id = %self.id, kind = kind.as_wire(), %error, "Suggestions failed");
                *self.suggestions_mut(kind) = RequestState::Failed(error.to_string());
                Resolution::Failed { purpose, error }
            }
        }
    }

    fn apply_evaluation(
        &mut self,
        ticket: Ticket,
        result: Result<EvaluateReply, CollaboratorError>,
    ) -> Resolution {
        let purpose = Purpose::Evaluation;
        let Some(pair) = self.awaiting.take() else {
            return Resolution::Stale { ticket };
        };
        let reply = match result {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(session_id = %self.id, %error, "Evaluation reply unusable");
                self.evaluation_chat
                    .push(ChatMessage::assistant(chat::EVALUATION_RETRY));
                return Resolution::Retry { purpose, error };
            }
        };

        let value = reply
            .score
            .unwrap_or_else(|| i64::from(Rating::DEFAULT.value()));
        let rating = self
            .scores
            .upsert(pair.option_index, pair.criterion_index, value);
        self.cursor = self.sequence().after(pair);

        let next = self.cursor.and_then(|p| self.pair_texts(p));
        let ack = chat::evaluation_ack(rating, reply.reasoning.trim(), next);
        self.evaluation_chat.push(ChatMessage::assistant(ack));
        tracing::debug!(
            session_id = %self.id,
            option_index = pair.option_index,
            criterion_index = pair.criterion_index,
            score = rating.value(),
            "Conversational score recorded"
        );

        if self.cursor.is_none() {
            tracing::info!(session_id = %self.id, "Conversational walk finished");
            Resolution::Completed {
                purpose,
                step: Step::Evaluation,
                advance_after: self.timings.evaluation_advance,
            }
        } else {
            Resolution::Applied { purpose }
        }
    }

    fn apply_weights(&mut self, result: Result<WeightReply, CollaboratorError>) -> Resolution {
        let purpose = Purpose::Weighing;
        let reply = match result {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(session_id = %self.id, %error, "Weighing reply unusable");
                self.weighing_chat
                    .push(ChatMessage::assistant(chat::WEIGHING_RETRY));
                return Resolution::Retry { purpose, error };
            }
        };

        let criteria = self.decision.criteria.len();
        let mut applied: Vec<(usize, Rating, &str)> = Vec::new();
        for item in &reply.weights {
            let index = match usize::try_from(item.criterion_index) {
                Ok(index) if index < criteria => index,
                _ => {
                    tracing::debug!(
                        session_id = %self.id,
                        criterion_index = item.criterion_index,
                        "Ignoring weight for unknown criterion"
                    );
                    continue;
                }
            };
            let value = item
                .weight
                .unwrap_or_else(|| i64::from(Rating::DEFAULT.value()));
            let rating = self.weights.upsert(index, value);
            applied.push((index, rating, item.reasoning.trim()));
        }

        if applied.is_empty() {
            self.weighing_chat
                .push(ChatMessage::assistant(chat::WEIGHING_RETRY));
            return Resolution::Retry {
                purpose,
                error: CollaboratorError::interpretation("no weight named a listed criterion"),
            };
        }

        let lines: Vec<AppliedWeight<'_>> = applied
            .iter()
            .filter_map(|&(index, weight, reasoning)| {
                Some(AppliedWeight {
                    criterion: self.decision.criteria.get(index)?.as_str(),
                    weight,
                    reasoning,
                })
            })
            .collect();
        let missing: Vec<&str> = self
            .decision
            .criteria
            .iter()
            .enumerate()
            .filter(|(i, _)| self.weights.get(*i).is_none())
            .map(|(_, c)| c.as_str())
            .collect();
        let ack = chat::weighing_ack(&lines, reply.summary.trim(), &missing);
        let complete = missing.is_empty();
        self.weighing_chat.push(ChatMessage::assistant(ack));
        tracing::debug!(session_id = %self.id, applied = applied.len(), "Conversational weights recorded");

        if complete {
            tracing::info!(session_id = %self.id, "Every criterion weighted conversationally");
            Resolution::Completed {
                purpose,
                step: Step::Weighing,
                advance_after: self.timings.weighing_advance,
            }
        } else {
            Resolution::Applied { purpose }
        }
    }

    fn apply_explanation(&mut self, result: Result<String, CollaboratorError>) -> Resolution {
        let purpose = Purpose::Explanation;
        match result {
            Ok(text) => {
                self.explanation = RequestState::Ready(text);
                Resolution::Applied { purpose }
            }
            Err(error) => {
                tracing::warn!(session_id = %self.id, %error, "Explanation failed");
                self.explanation = RequestState::Failed(error.to_string());
                Resolution::Failed { purpose, error }
            }
        }
    }
}

const fn list_step(kind: ItemKind) -> Step {
    match kind {
        ItemKind::Options => Step::Options,
        ItemKind::Criteria => Step::Criteria,
    }
}
