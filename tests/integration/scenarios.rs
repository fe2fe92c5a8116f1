//! Aggregation and conversational scenarios on small decisions.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use deecide::decision::{
    aggregate, EvaluationMode, Pair, Purpose, Resolution, ScoreLedger, Step, WeightLedger,
};
use deecide::driver::Update;
use deecide::interpret::{WeightItem, WeightReply};
use pretty_assertions::assert_eq;

use super::support::{driver, session_in_evaluation, ScriptedInterpreter};

fn two_by_two_scores() -> ScoreLedger {
    let mut scores = ScoreLedger::new();
    scores.upsert(0, 0, 5);
    scores.upsert(0, 1, 2);
    scores.upsert(1, 0, 4);
    scores.upsert(1, 1, 5);
    scores
}

#[test]
fn test_tie_goes_to_first_option() {
    let mut weights = WeightLedger::new();
    weights.upsert(0, 3);
    weights.upsert(1, 1);

    let result = aggregate(2, 2, &two_by_two_scores(), &weights);

    assert_eq!(result.weighted_totals, vec![17, 17]);
    assert_eq!(result.winner_index, Some(0));
}

#[test]
fn test_heavier_weight_decides() {
    let mut weights = WeightLedger::new();
    weights.upsert(0, 5);
    weights.upsert(1, 1);

    let result = aggregate(2, 2, &two_by_two_scores(), &weights);

    assert_eq!(result.weighted_totals, vec![27, 25]);
    assert_eq!(result.max_possible_total, 50);
    assert_eq!(result.winner_index, Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_conversation_visits_pairs_in_row_major_order() {
    let interpreter = Arc::new(ScriptedInterpreter::with_scores(&[5, 2, 4, 5]));
    let session = session_in_evaluation(
        EvaluationMode::Conversational,
        &["Pizza", "Sushi"],
        &["Taste", "Price"],
    );
    let mut driver = driver(session, Arc::clone(&interpreter));

    let mut visited = Vec::new();
    let mut last = Vec::new();
    for message in ["great", "pricey", "good", "cheap"] {
        visited.push(driver.session().current_pair().unwrap());
        driver.session_mut().send_evaluation_message(message).unwrap();
        last = driver.settle().await;
    }

    assert_eq!(
        visited,
        vec![Pair::new(0, 0), Pair::new(0, 1), Pair::new(1, 0), Pair::new(1, 1)]
    );
    let asked: Vec<(String, String)> = interpreter
        .evaluate_requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| (r.option.clone(), r.criterion.clone()))
        .collect();
    assert_eq!(asked[1], ("Pizza".to_string(), "Price".to_string()));
    assert_eq!(asked[2], ("Sushi".to_string(), "Taste".to_string()));

    assert!(matches!(
        last.first(),
        Some(Update::Resolved(Resolution::Completed {
            purpose: Purpose::Evaluation,
            step: Step::Evaluation,
            ..
        }))
    ));
    assert_eq!(driver.session().step(), Step::Weighing);
    assert_eq!(driver.session().scores().get(0, 1), Some(2));
    assert_eq!(driver.session().scores().get(1, 1), Some(5));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_criterion_index_is_ignored() {
    let interpreter = Arc::new(ScriptedInterpreter::default());
    interpreter.push_weights(Ok(WeightReply {
        weights: vec![
            WeightItem {
                criterion_index: 0,
                weight: Some(5),
                reasoning: "Most important".into(),
            },
            WeightItem {
                criterion_index: 5,
                weight: Some(1),
                reasoning: "Not a criterion".into(),
            },
            WeightItem {
                criterion_index: 2,
                weight: Some(2),
                reasoning: "Minor".into(),
            },
        ],
        summary: "Taste first.".into(),
    }));

    let mut session = session_in_evaluation(
        EvaluationMode::Manual,
        &["Pizza", "Sushi"],
        &["Taste", "Price", "Distance"],
    );
    for o in 0..2 {
        for c in 0..3 {
            session.set_score(o, c, 3).unwrap();
        }
    }
    assert!(session.advance().moved());
    let mut driver = driver(session, interpreter);
    driver
        .session_mut()
        .send_weighing_message("taste matters most, distance a bit")
        .unwrap();
    let updates = driver.settle().await;

    assert_eq!(
        updates,
        vec![Update::Resolved(Resolution::Applied {
            purpose: Purpose::Weighing
        })]
    );
    let weights = driver.session().weights();
    assert_eq!(weights.get(0), Some(5));
    assert_eq!(weights.get(1), None);
    assert_eq!(weights.get(2), Some(2));
    assert_eq!(weights.count(), 2);
    let reply = &driver.session().weighing_transcript().last().unwrap().content;
    assert!(reply.contains("Still missing: Price"));
    assert_eq!(driver.session().step(), Step::Weighing);
}
