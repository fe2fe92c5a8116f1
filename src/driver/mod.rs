//! Async driver for a [`DecisionSession`].
//!
//! The session is synchronous; the driver owns it and performs the effects it
//! queues. Each effect runs on its own tokio task and reports back over an
//! mpsc channel, so a slow interpreter never blocks editing. Auto-advance
//! delays are timers on the same channel.
//!
//! ```text
//! DecisionSession ──drain_effects──► spawn(task per effect)
//!        ▲                                   │
//!        └──── resolve / advance_from ◄── DriverEvent (mpsc)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::decision::{Completion, DecisionSession, Effect, Resolution, Step, Transition};
use crate::error::CollaboratorError;
use crate::metrics::{CallEvent, InterpreterMetrics, Timer};
use crate::prompts::Capability;
use crate::traits::Interpreter;

const CHANNEL_CAPACITY: usize = 32;

/// Something that happened off the session's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// An interpreter call finished.
    Completed(Completion),
    /// An auto-advance delay elapsed for `step`.
    AdvanceDue(Step),
}

/// What handling a [`DriverEvent`] did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// A completion was resolved.
    Resolved(Resolution),
    /// A delayed advance was attempted.
    Advanced(Transition),
}

/// Owns a session and runs its interpreter calls concurrently.
pub struct SessionDriver {
    session: DecisionSession,
    interpreter: Arc<dyn Interpreter>,
    metrics: Arc<InterpreterMetrics>,
    event_tx: mpsc::Sender<DriverEvent>,
    event_rx: mpsc::Receiver<DriverEvent>,
    in_flight: usize,
}

impl std::fmt::Debug for SessionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDriver")
            .field("session", &self.session.id())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl SessionDriver {
    /// Wrap `session`; effects already queued are dispatched on the first
    /// [`SessionDriver::dispatch`].
    #[must_use]
    pub fn new(
        session: DecisionSession,
        interpreter: Arc<dyn Interpreter>,
        metrics: Arc<InterpreterMetrics>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            session,
            interpreter,
            metrics,
            event_tx,
            event_rx,
            in_flight: 0,
        }
    }

    /// The driven session.
    #[must_use]
    pub const fn session(&self) -> &DecisionSession {
        &self.session
    }

    /// Mutable access for user edits. Call [`SessionDriver::dispatch`]
    /// afterwards so any queued effects start.
    pub const fn session_mut(&mut self) -> &mut DecisionSession {
        &mut self.session
    }

    /// Shared call metrics.
    #[must_use]
    pub fn metrics(&self) -> &Arc<InterpreterMetrics> {
        &self.metrics
    }

    /// Number of spawned calls and timers not yet handled.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start every effect the session has queued.
    pub fn dispatch(&mut self) {
        for effect in self.session.drain_effects() {
            let ticket = effect.ticket();
            tracing::debug!(
                session_id = %self.session.id(),
                ticket = ticket.id,
                purpose = %ticket.purpose,
                "Dispatching interpreter request"
            );
            let interpreter = Arc::clone(&self.interpreter);
            let metrics = Arc::clone(&self.metrics);
            let tx = self.event_tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                let completion = perform(interpreter.as_ref(), &metrics, effect).await;
                let _ = tx.send(DriverEvent::Completed(completion)).await;
            });
        }
    }

    fn schedule_advance(&mut self, step: Step, delay: Duration) {
        tracing::debug!(
            session_id = %self.session.id(),
            step = %step,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Scheduling auto-advance"
        );
        let tx = self.event_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DriverEvent::AdvanceDue(step)).await;
        });
    }

    /// Wait for the next event. Pending forever while nothing is in flight,
    /// so it is safe to use inside `tokio::select!`.
    pub async fn next_event(&mut self) -> Option<DriverEvent> {
        if self.in_flight == 0 {
            return std::future::pending().await;
        }
        self.event_rx.recv().await
    }

    /// Apply an event to the session and start whatever it queued.
    pub fn handle(&mut self, event: DriverEvent) -> Update {
        self.in_flight = self.in_flight.saturating_sub(1);
        let update = match event {
            DriverEvent::Completed(completion) => {
                let resolution = self.session.resolve(completion);
                if let Resolution::Completed {
                    step,
                    advance_after,
                    ..
                } = resolution
                {
                    self.schedule_advance(step, advance_after);
                }
                Update::Resolved(resolution)
            }
            DriverEvent::AdvanceDue(step) => Update::Advanced(self.session.advance_from(step)),
        };
        self.dispatch();
        update
    }

    /// Handle events until nothing is in flight.
    pub async fn settle(&mut self) -> Vec<Update> {
        self.dispatch();
        let mut updates = Vec::new();
        while self.in_flight > 0 {
            match self.event_rx.recv().await {
                Some(event) => updates.push(self.handle(event)),
                None => break,
            }
        }
        updates
    }

    /// Give the session back.
    #[must_use]
    pub fn into_session(self) -> DecisionSession {
        self.session
    }
}

fn record<T>(
    metrics: &InterpreterMetrics,
    capability: Capability,
    timer: &Timer,
    result: &Result<T, CollaboratorError>,
) {
    let event = CallEvent::new(capability, timer.elapsed_ms(), result.is_ok());
    let event = match result {
        Ok(_) => event,
        Err(e) => event.with_error_kind(e.kind()),
    };
    metrics.record(event);
}

async fn perform(
    interpreter: &dyn Interpreter,
    metrics: &InterpreterMetrics,
    effect: Effect,
) -> Completion {
    let timer = Timer::start();
    match effect {
        Effect::Suggest { ticket, request } => {
            let result = interpreter.suggest(request).await;
            record(metrics, Capability::Suggest, &timer, &result);
            Completion::Suggestions { ticket, result }
        }
        Effect::Evaluate { ticket, request } => {
            let result = interpreter.evaluate(request).await;
            record(metrics, Capability::Evaluate, &timer, &result);
            Completion::Evaluation { ticket, result }
        }
        Effect::Weigh { ticket, request } => {
            let result = interpreter.weigh(request).await;
            record(metrics, Capability::Weight, &timer, &result);
            Completion::Weights { ticket, result }
        }
        Effect::Explain { ticket, request } => {
            let result = interpreter.explain(request).await;
            record(metrics, Capability::Explain, &timer, &result);
            Completion::Explanation { ticket, result }
        }
    }
}
