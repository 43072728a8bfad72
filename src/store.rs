use crate::error::{NeuroForgeError, NfResult};
use crate::games::GameType;
use crate::session::{SessionId, SessionOrigin, SessionPatch, SessionRecord};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Population latency statistics for one game type. Read-only input to the
/// z-score computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    pub mean_latency_ms: f64,
    pub std_latency_ms: f64,
}

/// Baseline table loaded from CSV (`game_type,mean_latency_ms,std_latency_ms`).
/// Unknown game-type rows are skipped with a warning rather than failing
/// the whole load.
#[derive(Debug, Clone, Default)]
pub struct BaselineTable {
    entries: HashMap<GameType, BaselineStats>,
}

impl BaselineTable {
    pub fn load_csv<P: AsRef<Path>>(path: P) -> NfResult<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut entries = HashMap::new();

        for result in reader.records() {
            let row = result?;
            let name = row.get(0).unwrap_or("");
            let game = match GameType::from_str(name) {
                Ok(g) => g,
                Err(_) => {
                    warn!("Skipping baseline row for unknown game type '{name}'");
                    continue;
                }
            };
            let mean: f64 = row
                .get(1)
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|_| NeuroForgeError::Validation(format!("Bad mean for {name}")))?;
            let std: f64 = row
                .get(2)
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|_| NeuroForgeError::Validation(format!("Bad stddev for {name}")))?;
            entries.insert(game, BaselineStats {
                mean_latency_ms: mean,
                std_latency_ms: std,
            });
        }

        info!("Loaded {} baseline rows", entries.len());
        Ok(Self { entries })
    }

    pub fn get(&self, game: GameType) -> Option<BaselineStats> {
        self.entries.get(&game).copied()
    }

    pub fn insert(&mut self, game: GameType, stats: BaselineStats) {
        self.entries.insert(game, stats);
    }
}

/// Persistence collaborator for session records. In-process contract only;
/// whatever transport an implementation uses underneath is its business.
pub trait SessionStore {
    fn create_session(&mut self, user_id: &str, game_type: GameType) -> NfResult<SessionId>;
    fn update_session(&mut self, id: &SessionId, patch: &SessionPatch) -> NfResult<()>;
    fn fetch_latest_sessions(&self, user_id: &str) -> NfResult<Vec<SessionRecord>>;
    fn fetch_baseline(&self, game_type: GameType) -> NfResult<Option<BaselineStats>>;
}

/// Read a user's session history, retrying once. A store that stays down
/// degrades to an empty history so callers can still render a profile
/// from the neutral priors instead of failing the whole render.
pub fn fetch_history_with_retry(store: &dyn SessionStore, user_id: &str) -> Vec<SessionRecord> {
    for attempt in 0..2 {
        match store.fetch_latest_sessions(user_id) {
            Ok(records) => return records,
            Err(e) if attempt == 0 => {
                warn!("Session fetch failed ({e}); retrying once");
            }
            Err(e) => {
                warn!("Session fetch failed again ({e}); rendering from partial data");
            }
        }
    }
    Vec::new()
}

fn skeleton_record(id: SessionId, user_id: &str, game_type: GameType) -> SessionRecord {
    SessionRecord {
        session_id: id,
        user_id: user_id.to_string(),
        game_type,
        origin: SessionOrigin::Persisted,
        started_at_ms: 0,
        completed_at_ms: None,
        final_score: 0,
        accuracy_percentage: 0.0,
        avg_reaction_time_ms: 0,
        difficulty_level_reached: 1,
        telemetry: Vec::new(),
        derived: None,
    }
}

/// Newest-first ordering: completed sessions by completion time, then
/// unfinished ones by start time.
fn sort_newest_first(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| {
        let ka = (a.completed_at_ms.is_none(), std::cmp::Reverse(a.completed_at_ms), std::cmp::Reverse(a.started_at_ms));
        let kb = (b.completed_at_ms.is_none(), std::cmp::Reverse(b.completed_at_ms), std::cmp::Reverse(b.started_at_ms));
        ka.cmp(&kb)
    });
}

/// File-backed store: one JSON document holding every session, plus an
/// optional CSV baseline table. Writes flush the whole document; the store
/// is only ever touched from one session loop at a time.
pub struct JsonFileStore {
    path: PathBuf,
    records: Vec<SessionRecord>,
    baselines: BaselineTable,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(root: P, baselines_csv: Option<&Path>) -> NfResult<Self> {
        fs::create_dir_all(root.as_ref())?;
        let path = root.as_ref().join("sessions.json");

        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        let baselines = match baselines_csv {
            Some(p) if p.exists() => BaselineTable::load_csv(p)?,
            Some(p) => {
                warn!("Baseline file {:?} not found; z-scores will be unavailable", p);
                BaselineTable::default()
            }
            None => BaselineTable::default(),
        };

        debug!("Opened session store at {:?} ({} records)", path, records.len());
        Ok(Self {
            path,
            records,
            baselines,
        })
    }

    fn flush(&self) -> NfResult<()> {
        let raw = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn create_session(&mut self, user_id: &str, game_type: GameType) -> NfResult<SessionId> {
        let id = SessionId(format!("{}-{:04}", game_type, self.records.len() + 1));
        self.records.push(skeleton_record(id.clone(), user_id, game_type));
        self.flush()?;
        Ok(id)
    }

    fn update_session(&mut self, id: &SessionId, patch: &SessionPatch) -> NfResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| &r.session_id == id)
            .ok_or_else(|| NeuroForgeError::Store(format!("Unknown session id {id}")))?;
        patch.apply_to(record);
        self.flush()
    }

    fn fetch_latest_sessions(&self, user_id: &str) -> NfResult<Vec<SessionRecord>> {
        let mut out: Vec<SessionRecord> = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    fn fetch_baseline(&self, game_type: GameType) -> NfResult<Option<BaselineStats>> {
        Ok(self.baselines.get(game_type))
    }
}

/// In-process store used by tests and the simulator. Failure injection
/// switches exercise the degraded and retry paths.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Vec<SessionRecord>,
    pub baselines: BaselineTable,
    /// When set, `create_session` rejects every call.
    pub fail_create: bool,
    /// Number of upcoming `update_session` calls to reject.
    pub fail_next_updates: u32,
    pub update_attempts: u32,
    /// Number of upcoming `fetch_latest_sessions` calls to reject.
    /// Cells because the fetch path takes `&self`.
    pub fail_next_fetches: Cell<u32>,
    pub fetch_attempts: Cell<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn create_session(&mut self, user_id: &str, game_type: GameType) -> NfResult<SessionId> {
        if self.fail_create {
            return Err(NeuroForgeError::Store("injected create failure".into()));
        }
        let id = SessionId(format!("{}-{:04}", game_type, self.records.len() + 1));
        self.records.push(skeleton_record(id.clone(), user_id, game_type));
        Ok(id)
    }

    fn update_session(&mut self, id: &SessionId, patch: &SessionPatch) -> NfResult<()> {
        self.update_attempts += 1;
        if self.fail_next_updates > 0 {
            self.fail_next_updates -= 1;
            return Err(NeuroForgeError::Store("injected update failure".into()));
        }
        let record = self
            .records
            .iter_mut()
            .find(|r| &r.session_id == id)
            .ok_or_else(|| NeuroForgeError::Store(format!("Unknown session id {id}")))?;
        patch.apply_to(record);
        Ok(())
    }

    fn fetch_latest_sessions(&self, user_id: &str) -> NfResult<Vec<SessionRecord>> {
        self.fetch_attempts.set(self.fetch_attempts.get() + 1);
        let remaining = self.fail_next_fetches.get();
        if remaining > 0 {
            self.fail_next_fetches.set(remaining - 1);
            return Err(NeuroForgeError::Store("injected fetch failure".into()));
        }
        let mut out: Vec<SessionRecord> = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    fn fetch_baseline(&self, game_type: GameType) -> NfResult<Option<BaselineStats>> {
        Ok(self.baselines.get(game_type))
    }
}
