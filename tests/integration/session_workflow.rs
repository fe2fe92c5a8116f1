//! The wizard end to end through the public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use deecide::decision::{
    DecisionSession, EvaluationMode, Guard, ItemKind, Pair, RequestState, Step, Transition,
};
use pretty_assertions::assert_eq;

use super::support::{driver, session_in_evaluation, ScriptedInterpreter};

#[tokio::test]
async fn test_manual_decision_from_title_to_explanation() {
    let interpreter = Arc::new(ScriptedInterpreter::default());
    let mut driver = driver(DecisionSession::new(), Arc::clone(&interpreter));

    let session = driver.session_mut();
    session.set_title("  Dinner tonight ").unwrap();
    assert!(session.advance().moved());
    session.add_option("Pizza").unwrap();
    driver.settle().await;

    let session = driver.session_mut();
    assert_eq!(session.visible_suggestions(ItemKind::Options), vec!["Suggested option"]);
    assert_eq!(session.add_suggestion(ItemKind::Options, 0).unwrap(), "Suggested option");
    assert!(session.visible_suggestions(ItemKind::Options).is_empty());
    assert!(session.advance().moved());
    session.add_criterion("Taste").unwrap();
    session.add_criterion("Price").unwrap();
    assert!(session.advance().moved());

    for (o, c, v) in [(0, 0, 5), (0, 1, 2), (1, 0, 4), (1, 1, 5)] {
        session.set_score(o, c, v).unwrap();
    }
    assert!(session.advance().moved());
    session.set_weight(0, 5).unwrap();
    session.set_weight(1, 1).unwrap();
    assert_eq!(
        session.advance(),
        Transition::Moved {
            from: Step::Weighing,
            to: Step::Results
        }
    );
    driver.settle().await;

    let session = driver.session();
    assert_eq!(session.decision().title, "Dinner tonight");
    let result = session.result().unwrap();
    assert_eq!(result.weighted_totals, vec![27, 25]);
    assert_eq!(result.winner_index, Some(0));
    assert_eq!(
        session.explanation(),
        &RequestState::Ready("Pizza comes out ahead.".into())
    );

    let requests = interpreter.explain_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].winner_index, 0);
    assert_eq!(requests[0].scores.len(), 4);
    assert_eq!(requests[0].weight_of(0), Some(5));
}

#[test]
fn test_guards_block_each_forward_step() {
    let mut session = DecisionSession::new();
    assert_eq!(
        session.advance(),
        Transition::Blocked {
            step: Step::Input,
            guard: Guard::TitleRequired
        }
    );
    session.set_title("Dinner").unwrap();
    session.advance();
    session.add_option("Pizza").unwrap();
    assert!(matches!(
        session.advance(),
        Transition::Blocked {
            guard: Guard::NotEnoughOptions { have: 1 },
            ..
        }
    ));
    session.add_option("Sushi").unwrap();
    session.advance();
    assert!(matches!(
        session.advance(),
        Transition::Blocked {
            guard: Guard::NotEnoughCriteria { have: 0 },
            ..
        }
    ));
    session.add_criterion("Taste").unwrap();
    session.advance();
    session.set_score(0, 0, 4).unwrap();
    assert!(matches!(
        session.advance(),
        Transition::Blocked {
            guard: Guard::ScoresIncomplete {
                scored: 1,
                required: 2
            },
            ..
        }
    ));
    session.set_score(1, 0, 4).unwrap();
    session.advance();
    assert!(matches!(
        session.advance(),
        Transition::Blocked {
            guard: Guard::WeightsIncomplete {
                weighted: 0,
                required: 1
            },
            ..
        }
    ));
    assert_eq!(session.step(), Step::Weighing);
}

#[test]
fn test_going_back_keeps_everything() {
    let mut session = session_in_evaluation(EvaluationMode::Manual, &["Pizza", "Sushi"], &["Taste"]);
    session.set_score(0, 0, 5).unwrap();
    session.back();
    session.back();
    assert_eq!(session.step(), Step::Options);
    session.advance();
    session.advance();
    assert_eq!(session.step(), Step::Evaluation);
    assert_eq!(session.scores().get(0, 0), Some(5));
    assert_eq!(session.decision().options, vec!["Pizza", "Sushi"]);
}

#[test]
fn test_removal_keeps_positional_scores() {
    let mut session = session_in_evaluation(
        EvaluationMode::Manual,
        &["Pizza", "Sushi", "Tacos"],
        &["Taste"],
    );
    session.set_score(2, 0, 5).unwrap();
    session.back();
    session.back();
    assert_eq!(session.remove_option(0).unwrap(), "Pizza");

    // Entries are not renumbered; the score for old index 2 is now out of range.
    assert_eq!(session.scores().get(2, 0), Some(5));
    assert_eq!(session.preview().weighted_totals, vec![0, 0]);
}

#[test]
fn test_switching_modes_keeps_scores() {
    let mut session = session_in_evaluation(EvaluationMode::Manual, &["Pizza", "Sushi"], &["Taste"]);
    session.set_score(0, 0, 4).unwrap();
    assert!(session.set_mode(EvaluationMode::Conversational));
    assert_eq!(session.scores().get(0, 0), Some(4));
    assert_eq!(session.current_pair(), Some(Pair::new(0, 0)));
    assert!(!session.set_mode(EvaluationMode::Conversational));
}

#[test]
fn test_scores_are_clamped() {
    let mut session = session_in_evaluation(EvaluationMode::Manual, &["Pizza", "Sushi"], &["Taste"]);
    assert_eq!(session.set_score(0, 0, 9).unwrap().value(), 5);
    assert_eq!(session.set_score(1, 0, 0).unwrap().value(), 1);
}

#[test]
fn test_reset_starts_over() {
    let mut session = session_in_evaluation(EvaluationMode::Conversational, &["A", "B"], &["C"]);
    let id = session.id();
    session.reset();
    assert_eq!(session.step(), Step::Input);
    assert!(session.decision().title.is_empty());
    assert_eq!(session.scores().count(), 0);
    assert_eq!(session.mode(), EvaluationMode::Conversational);
    assert_ne!(session.id(), id);
}
