use neuroforge::config::NormalizerParams;
use neuroforge::games::GameType;
use neuroforge::normalizer;
use neuroforge::session::{SessionId, SessionPatch};
use neuroforge::store::{
    fetch_history_with_retry, BaselineStats, BaselineTable, JsonFileStore, MemoryStore,
    SessionStore,
};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

struct TestContext {
    _dir: TempDir,
    root: PathBuf,
    baselines: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("store");
        let baselines = dir.path().join("baselines.csv");

        let mut file = File::create(&baselines).unwrap();
        writeln!(file, "game_type,mean_latency_ms,std_latency_ms").unwrap();
        writeln!(file, "detail_spotter,850,120").unwrap();
        writeln!(file, "matrix_assessment,1400,300").unwrap();
        writeln!(file, "not_a_real_game,999,1").unwrap();

        Self {
            _dir: dir,
            root,
            baselines,
        }
    }

    fn open(&self) -> JsonFileStore {
        JsonFileStore::open(&self.root, Some(&self.baselines)).expect("store should open")
    }
}

#[test]
fn created_sessions_get_unique_game_scoped_ids() {
    let ctx = TestContext::new();
    let mut store = ctx.open();

    let a = store.create_session("alice", GameType::DetailSpotter).unwrap();
    let b = store.create_session("alice", GameType::DetailSpotter).unwrap();
    let c = store.create_session("bob", GameType::StroopChaos).unwrap();

    assert_ne!(a, b);
    assert!(a.0.starts_with("detail_spotter-"));
    assert!(c.0.starts_with("stroop_chaos-"));
}

#[test]
fn updates_survive_a_store_reopen() {
    let ctx = TestContext::new();
    let id = {
        let mut store = ctx.open();
        let id = store.create_session("alice", GameType::DetailSpotter).unwrap();
        let patch = SessionPatch {
            started_at_ms: Some(1000),
            completed_at_ms: Some(61_000),
            final_score: Some(1480),
            accuracy_percentage: Some(92.5),
            ..Default::default()
        };
        store.update_session(&id, &patch).unwrap();
        id
    };

    let store = ctx.open();
    let sessions = store.fetch_latest_sessions("alice").unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, id);
    assert_eq!(sessions[0].final_score, 1480);
    assert_eq!(sessions[0].accuracy_percentage, 92.5);
    assert!(sessions[0].is_completed());
}

#[test]
fn updating_an_unknown_session_fails() {
    let ctx = TestContext::new();
    let mut store = ctx.open();

    let result = store.update_session(&SessionId("ghost-0001".into()), &SessionPatch::default());
    assert!(result.is_err());
}

#[test]
fn sessions_come_back_newest_first_with_unfinished_last() {
    let ctx = TestContext::new();
    let mut store = ctx.open();

    let old = store.create_session("alice", GameType::DetailSpotter).unwrap();
    let new = store.create_session("alice", GameType::MatrixAssessment).unwrap();
    let open = store.create_session("alice", GameType::StroopChaos).unwrap();
    store.create_session("bob", GameType::DetailSpotter).unwrap();

    let finish = |ts: u64| SessionPatch {
        started_at_ms: Some(ts - 60_000),
        completed_at_ms: Some(ts),
        ..Default::default()
    };
    store.update_session(&old, &finish(100_000)).unwrap();
    store.update_session(&new, &finish(900_000)).unwrap();

    let sessions = store.fetch_latest_sessions("alice").unwrap();
    let ids: Vec<&SessionId> = sessions.iter().map(|s| &s.session_id).collect();
    assert_eq!(ids, vec![&new, &old, &open]);
}

#[test]
fn fetch_is_scoped_to_the_requested_user() {
    let ctx = TestContext::new();
    let mut store = ctx.open();

    store.create_session("alice", GameType::DetailSpotter).unwrap();
    store.create_session("bob", GameType::DetailSpotter).unwrap();

    assert_eq!(store.fetch_latest_sessions("alice").unwrap().len(), 1);
    assert_eq!(store.fetch_latest_sessions("carol").unwrap().len(), 0);
}

#[test]
fn baseline_rows_load_and_unknown_games_are_skipped() {
    let ctx = TestContext::new();
    let store = ctx.open();

    let detail = store
        .fetch_baseline(GameType::DetailSpotter)
        .unwrap()
        .expect("row exists");
    assert_eq!(detail.mean_latency_ms, 850.0);
    assert_eq!(detail.std_latency_ms, 120.0);

    // No row for this game; the bogus CSV line must not have landed anywhere.
    assert!(store.fetch_baseline(GameType::SonicConservatory).unwrap().is_none());
}

#[test]
fn malformed_baseline_numbers_are_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "game_type,mean_latency_ms,std_latency_ms").unwrap();
    writeln!(file, "detail_spotter,not_a_number,120").unwrap();

    assert!(BaselineTable::load_csv(&path).is_err());
}

#[test]
fn missing_baseline_file_still_opens_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("store");
    let missing = dir.path().join("nope.csv");

    let store = JsonFileStore::open(&root, Some(&missing)).expect("store should open");
    assert!(store.fetch_baseline(GameType::DetailSpotter).unwrap().is_none());
}

#[test]
fn one_fetch_retry_recovers_the_history() {
    let mut store = MemoryStore::default();
    store.create_session("alice", GameType::DetailSpotter).unwrap();
    store.fail_next_fetches.set(1);

    let records = fetch_history_with_retry(&store, "alice");

    assert_eq!(records.len(), 1);
    assert_eq!(store.fetch_attempts.get(), 2);
}

#[test]
fn persistent_fetch_failure_falls_back_to_neutral_priors() {
    let mut store = MemoryStore::default();
    store.create_session("alice", GameType::DetailSpotter).unwrap();
    store.fail_next_fetches.set(5);

    let records = fetch_history_with_retry(&store, "alice");

    // Exactly one retry, then an empty history instead of an error.
    assert!(records.is_empty());
    assert_eq!(store.fetch_attempts.get(), 2);

    let traits = normalizer::normalize(
        &normalizer::latest_by_type(&records),
        &NormalizerParams::default(),
    );
    assert_eq!(traits.visual, 50.0);
    assert_eq!(traits.focus, 75.0);
}

#[test]
fn memory_store_serves_seeded_baselines() {
    let mut store = MemoryStore::default();
    store.baselines.insert(
        GameType::DetailSpotter,
        BaselineStats {
            mean_latency_ms: 900.0,
            std_latency_ms: 100.0,
        },
    );

    let detail = store
        .fetch_baseline(GameType::DetailSpotter)
        .unwrap()
        .expect("seeded row");
    assert_eq!(detail.mean_latency_ms, 900.0);
    assert!(store.fetch_baseline(GameType::StroopChaos).unwrap().is_none());
}
