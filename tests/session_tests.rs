use neuroforge::config::Config;
use neuroforge::games::GameType;
use neuroforge::generator::ResponseValue;
use neuroforge::session::{GameSession, Phase, SessionOrigin, SessionRecord};
use neuroforge::store::{MemoryStore, SessionStore};

fn new_session(store: &mut MemoryStore, game: GameType, seed: u64) -> GameSession {
    GameSession::create(store, "tester", game, Config::default(), Some(seed), 0)
}

/// Drive a session to completion, answering correctly with the given
/// pattern (cycled). Returns the finalized record.
fn drive(session: &mut GameSession, pattern: &[bool]) -> SessionRecord {
    let mut now = 0u64;
    session.begin(now);

    let mut turn = 0usize;
    loop {
        match session.poll(now) {
            Phase::Completed => break,
            Phase::AwaitingResponse => {
                let answer = session
                    .current_stimulus()
                    .map(|s| s.answer.clone())
                    .unwrap_or(ResponseValue::Empty);
                let response = if pattern[turn % pattern.len()] {
                    answer
                } else {
                    ResponseValue::Empty
                };
                turn += 1;
                now += 700;
                session.submit(&response, now);
            }
            _ => match session.next_deadline() {
                Some(dl) => now = now.max(dl),
                None => break,
            },
        }
    }
    session.record().clone()
}

#[test]
fn lifecycle_walks_intro_countdown_gameplay() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 5);

    assert_eq!(session.phase(), Phase::Intro);
    // Polling before begin does nothing.
    assert_eq!(session.poll(100), Phase::Intro);

    session.begin(0);
    assert_eq!(session.phase(), Phase::Countdown);
    assert_eq!(session.poll(2999), Phase::Countdown);

    // Grid puzzles are interactive the instant the countdown ends.
    assert_eq!(session.poll(3000), Phase::AwaitingResponse);
    assert!(session.current_stimulus().is_some());
}

#[test]
fn correct_answer_scores_and_raises_the_level() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 5);
    session.begin(0);
    session.poll(3000);

    let answer = session.current_stimulus().unwrap().answer.clone();
    let outcome = session.submit(&answer, 3600).expect("round should commit");
    assert!(outcome.is_correct);
    assert_eq!(outcome.reaction_time_ms, 600);
    // Level 1 base plus 14 full speed steps.
    assert_eq!(session.score(), 170);
    assert_eq!(session.phase(), Phase::Feedback);

    // Next round runs at the next level once feedback ends.
    session.poll(3600 + 400);
    assert_eq!(session.level(), 2);
}

#[test]
fn wrong_answer_costs_a_life_and_holds_the_level() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 5);
    session.begin(0);
    session.poll(3000);

    let outcome = session.submit(&ResponseValue::Empty, 3500).unwrap();
    assert!(!outcome.is_correct);
    assert_eq!(session.lives_left(), 2);
    assert_eq!(session.score(), 0);

    session.poll(3500 + 500);
    assert_eq!(session.level(), 1);
}

#[test]
fn submit_is_ignored_outside_awaiting_response() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 5);

    assert!(session.submit(&ResponseValue::Empty, 0).is_none());
    session.begin(0);
    assert!(session.submit(&ResponseValue::Empty, 1000).is_none());

    session.poll(3000);
    let answer = session.current_stimulus().unwrap().answer.clone();
    assert!(session.submit(&answer, 3400).is_some());
    // Feedback phase: a second commit for the same round is rejected.
    assert!(session.submit(&answer, 3450).is_none());
}

#[test]
fn exhausted_lives_end_the_session() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 9);
    let record = drive(&mut session, &[false]);

    assert_eq!(record.telemetry.len(), 3);
    assert_eq!(record.accuracy_percentage, 0.0);
    assert!(record.completed_at_ms.is_some());
    assert_eq!(session.lives_left(), 0);
}

#[test]
fn global_countdown_expiry_finalizes_without_input() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 2);
    session.begin(0);
    session.poll(3000);

    assert_eq!(session.poll(1_000_000), Phase::Completed);
    let record = session.record();
    // Finalization is stamped at the expiry instant, not the poll instant.
    assert_eq!(record.completed_at_ms, Some(63_000));
    assert!(record.telemetry.is_empty());
    assert_eq!(record.final_score, 0);
}

#[test]
fn finalization_is_idempotent() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 2);
    session.begin(0);
    session.poll(3000);
    session.poll(1_000_000);

    let first = serde_json::to_string(session.record()).unwrap();
    session.poll(2_000_000);
    assert!(session.submit(&ResponseValue::Empty, 2_000_000).is_none());
    let second = serde_json::to_string(session.record()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn time_bonus_never_exceeds_the_full_duration() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 5);
    session.begin(0);
    session.poll(3000);

    let answer = session.current_stimulus().unwrap().answer.clone();
    session.submit(&answer, 3600);
    assert!(session.time_left_ms(3600) <= 60_000);
}

#[test]
fn abandon_cancels_all_scheduled_work() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 5);
    session.begin(0);
    session.poll(3000);

    session.abandon();
    assert_eq!(session.phase(), Phase::Completed);
    assert_eq!(session.next_deadline(), None);
    assert!(session.submit(&ResponseValue::CellIndex(0), 4000).is_none());
    // The record was never finalized.
    assert!(session.record().completed_at_ms.is_none());
}

#[test]
fn code_recall_ends_after_clearing_the_level_cap() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DispatcherConsole, 77);
    let record = drive(&mut session, &[true]);

    assert_eq!(record.telemetry.len(), 4);
    assert_eq!(record.accuracy_percentage, 100.0);
    assert_eq!(record.difficulty_level_reached, 4);
}

#[test]
fn sequence_recall_ends_after_five_rounds() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::SonicConservatory, 31);
    let record = drive(&mut session, &[true]);

    assert_eq!(record.telemetry.len(), 5);
    assert_eq!(record.difficulty_level_reached, 5);
}

#[test]
fn telemetry_is_append_only_across_rounds() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 8);
    session.begin(0);
    let mut now = 0u64;
    let mut lengths = Vec::new();

    for _ in 0..4 {
        loop {
            match session.poll(now) {
                Phase::AwaitingResponse => break,
                Phase::Completed => return,
                _ => now = session.next_deadline().unwrap(),
            }
        }
        let answer = session.current_stimulus().unwrap().answer.clone();
        now += 650;
        session.submit(&answer, now);
        lengths.push(session.record().telemetry.len());
    }

    assert_eq!(lengths, vec![1, 2, 3, 4]);
    for (i, outcome) in session.record().telemetry.iter().enumerate() {
        assert_eq!(outcome.round, i as u32 + 1);
    }
}

#[test]
fn derived_metrics_match_the_game_family() {
    use neuroforge::session::DerivedMetrics;

    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::MatrixAssessment, 13);
    let record = drive(&mut session, &[true, true, false]);

    match record.derived.expect("finalized sessions carry metrics") {
        DerivedMetrics::MatrixAssessment {
            problems_seen,
            rule_tally,
        } => {
            assert_eq!(problems_seen as usize, record.telemetry.len());
            assert_eq!(rule_tally.iter().sum::<u32>(), problems_seen);
        }
        other => panic!("unexpected metrics {other:?}"),
    }
}

#[test]
fn store_failure_degrades_to_local_only() {
    let mut store = MemoryStore::new();
    store.fail_create = true;

    let mut session = new_session(&mut store, GameType::DetailSpotter, 4);
    assert_eq!(session.record().origin, SessionOrigin::LocalOnly);
    assert!(session.record().session_id.0.starts_with("local-"));

    // Gameplay is unaffected.
    session.begin(0);
    assert_eq!(session.poll(3000), Phase::AwaitingResponse);

    // Local-only sessions never reach the store.
    store.fail_create = false;
    assert!(!session.persist(&mut store));
    assert_eq!(store.update_attempts, 0);
}

#[test]
fn finalize_write_retries_exactly_once() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 6);
    drive(&mut session, &[true, false]);

    store.fail_next_updates = 1;
    store.update_attempts = 0;
    assert!(session.persist(&mut store));
    assert_eq!(store.update_attempts, 2);

    let saved = store.fetch_latest_sessions("tester").unwrap();
    assert!(saved[0].is_completed());
    assert_eq!(saved[0].final_score, session.record().final_score);
}

#[test]
fn finalize_gives_up_after_the_single_retry() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 6);
    drive(&mut session, &[true, false]);

    store.fail_next_updates = 5;
    store.update_attempts = 0;
    assert!(!session.persist(&mut store));
    assert_eq!(store.update_attempts, 2);
    // The in-memory record keeps the results.
    assert!(session.record().completed_at_ms.is_some());
}

#[test]
fn checkpoint_is_single_attempt() {
    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::DetailSpotter, 6);
    session.begin(0);
    session.poll(3000);

    store.fail_next_updates = 1;
    store.update_attempts = 0;
    session.checkpoint(&mut store);
    assert_eq!(store.update_attempts, 1);
}

#[test]
fn patch_application_is_idempotent() {
    use neuroforge::session::SessionPatch;

    let mut store = MemoryStore::new();
    let mut session = new_session(&mut store, GameType::StroopChaos, 21);
    let record = drive(&mut session, &[true, false, true]);

    let patch = SessionPatch {
        final_score: Some(record.final_score),
        completed_at_ms: record.completed_at_ms,
        telemetry: Some(record.telemetry.clone()),
        ..Default::default()
    };

    let mut once = record.clone();
    patch.apply_to(&mut once);
    let mut twice = once.clone();
    patch.apply_to(&mut twice);

    assert_eq!(
        serde_json::to_string(&once).unwrap(),
        serde_json::to_string(&twice).unwrap()
    );
}
