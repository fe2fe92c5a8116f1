//! Plain-text rendering of a session.

use std::fmt::Write as _;

use crate::decision::{
    ChatMessage, ChatRole, DecisionSession, EvaluationMode, ItemKind, Purpose, RequestState,
    Resolution, Step, Transition,
};
use crate::driver::Update;

fn position(step: Step) -> usize {
    Step::ALL.iter().position(|s| *s == step).unwrap_or(0) + 1
}

/// Full view of the current step.
#[must_use]
pub fn render_step(session: &DecisionSession) -> String {
    let step = session.step();
    let mut text = format!(
        "== Step {}/{}: {} ==\n",
        position(step),
        Step::ALL.len(),
        step
    );
    let decision = session.decision();
    if step != Step::Input {
        let _ = writeln!(text, "Deciding: {}", decision.title);
    }
    match step {
        Step::Input => {
            if decision.title.is_empty() {
                text.push_str("What are you trying to decide? Type it, then 'next'.\n");
            } else {
                let _ = writeln!(text, "Deciding: {}\nType to change it, or 'next'.", decision.title);
            }
        }
        Step::Options => render_list(&mut text, session, ItemKind::Options),
        Step::Criteria => render_list(&mut text, session, ItemKind::Criteria),
        Step::Evaluation => render_evaluation(&mut text, session),
        Step::Weighing => render_weighing(&mut text, session),
        Step::Results => render_results(&mut text, session),
    }
    text
}

fn render_list(text: &mut String, session: &DecisionSession, kind: ItemKind) {
    let items = session.decision().items(kind);
    if items.is_empty() {
        let _ = writeln!(text, "No {} yet. Type one per line.", kind.as_wire());
    } else {
        let heading = match kind {
            ItemKind::Options => "Options",
            ItemKind::Criteria => "Criteria",
        };
        let _ = writeln!(text, "{heading}:");
        for (i, item) in items.iter().enumerate() {
            let _ = writeln!(text, "  {}. {item}", i + 1);
        }
    }
    text.push_str(&render_suggestions(session, kind));
}

/// The suggestion block for a list.
#[must_use]
pub fn render_suggestions(session: &DecisionSession, kind: ItemKind) -> String {
    match session.suggestions(kind) {
        RequestState::Idle => String::new(),
        RequestState::Pending => "Fetching suggestions...\n".to_string(),
        RequestState::Failed(reason) => format!("Suggestions unavailable: {reason}\n"),
        RequestState::Ready(_) => {
            let visible = session.visible_suggestions(kind);
            if visible.is_empty() {
                return String::new();
            }
            let mut text = String::from("Suggestions ('pick N' to add):\n");
            for (i, suggestion) in visible.iter().enumerate() {
                let _ = writeln!(text, "  {}. {suggestion}", i + 1);
            }
            text
        }
    }
}

fn render_evaluation(text: &mut String, session: &DecisionSession) {
    let _ = writeln!(text, "Mode: {} ('mode manual|chat' to switch)", session.mode());
    text.push_str(&render_matrix(session));
    if session.mode() == EvaluationMode::Conversational {
        text.push_str(&render_transcript(session.evaluation_transcript()));
    } else {
        text.push_str("Enter scores with 'score <option> <criterion> <1-5>'.\n");
    }
}

/// Score matrix with `-` for unscored pairs.
#[must_use]
pub fn render_matrix(session: &DecisionSession) -> String {
    let decision = session.decision();
    let mut text = String::new();
    for (c, criterion) in decision.criteria.iter().enumerate() {
        let _ = writeln!(text, "  [{}] {criterion}", c + 1);
    }
    for (o, option) in decision.options.iter().enumerate() {
        let cells: Vec<String> = (0..decision.criteria.len())
            .map(|c| {
                session
                    .scores()
                    .get(o, c)
                    .map_or_else(|| "-".to_string(), |s| s.to_string())
            })
            .collect();
        let _ = writeln!(text, "  {}. {option}: {}", o + 1, cells.join(" "));
    }
    text
}

fn render_weighing(text: &mut String, session: &DecisionSession) {
    for (c, criterion) in session.decision().criteria.iter().enumerate() {
        let weight = session
            .weights()
            .get(c)
            .map_or_else(|| "-".to_string(), |w| format!("{w}/5"));
        let _ = writeln!(text, "  {}. {criterion}: {weight}", c + 1);
    }
    text.push_str(&render_transcript(session.weighing_transcript()));
    text.push_str("Describe what matters to you, or use 'weight <criterion> <1-5>'.\n");
}

fn render_results(text: &mut String, session: &DecisionSession) {
    let decision = session.decision();
    let result = session.preview();
    let mut ranked: Vec<(usize, u32)> = result.weighted_totals.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (rank, (o, total)) in ranked.iter().enumerate() {
        let name = decision.options.get(*o).map_or("", String::as_str);
        let marker = if result.winner_index == Some(*o) {
            " (winner)"
        } else {
            ""
        };
        let _ = writeln!(
            text,
            "  {}. {name}: {total}/{}{marker}",
            rank + 1,
            result.max_possible_total
        );
    }
    text.push_str(&render_explanation(session));
    text.push_str("'back' to revise, 'reset' to start over.\n");
}

fn render_explanation(session: &DecisionSession) -> String {
    match session.explanation() {
        RequestState::Idle => String::new(),
        RequestState::Pending => "Explaining the result...\n".to_string(),
        RequestState::Ready(explanation) => format!("\n{explanation}\n\n"),
        RequestState::Failed(reason) => format!("Explanation unavailable: {reason}\n"),
    }
}

fn render_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => "you",
        ChatRole::Assistant => "assistant",
    };
    format!("[{speaker}] {}\n", message.content)
}

fn render_transcript(transcript: &[ChatMessage]) -> String {
    transcript.iter().map(render_message).collect()
}

fn last_reply(transcript: &[ChatMessage]) -> String {
    transcript
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::Assistant)
        .map(render_message)
        .unwrap_or_default()
}

/// Output for a user-requested transition.
#[must_use]
pub fn render_transition(session: &DecisionSession, transition: Transition) -> String {
    match transition {
        Transition::Moved { .. } => render_step(session),
        Transition::Blocked { guard, .. } => format!("Can't move on yet: {guard}\n"),
    }
}

/// Output for something the driver did in the background; `None` when there
/// is nothing to show.
#[must_use]
pub fn render_update(session: &DecisionSession, update: &Update) -> Option<String> {
    match update {
        Update::Resolved(Resolution::Stale { .. }) => None,
        Update::Resolved(
            Resolution::Applied { purpose }
            | Resolution::Retry { purpose, .. }
            | Resolution::Failed { purpose, .. }
            | Resolution::Completed { purpose, .. },
        ) => Some(match purpose {
            Purpose::Suggestions(kind) => render_suggestions(session, *kind),
            Purpose::Evaluation => last_reply(session.evaluation_transcript()),
            Purpose::Weighing => last_reply(session.weighing_transcript()),
            Purpose::Explanation => render_explanation(session),
        })
        .filter(|s| !s.is_empty()),
        Update::Advanced(transition @ Transition::Moved { .. }) => {
            Some(render_transition(session, *transition))
        }
        Update::Advanced(Transition::Blocked { .. }) => None,
    }
}
