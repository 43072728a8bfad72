pub mod aggregator;

pub use self::aggregator::{GameSession, Phase};

use crate::config::ScoringParams;
use crate::evaluator::RoundOutcome;
use crate::games::GameType;
use crate::generator::ResponseValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether the record lives in the Session Store or only in this process.
/// `LocalOnly` marks the degraded path taken when session creation failed;
/// it is type-visible so callers can tell real data from fallback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    Persisted,
    LocalOnly,
}

/// One game session. Mutated in place by the aggregator while
/// `completed_at_ms` is `None`, finalized exactly once, read-only after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub user_id: String,
    pub game_type: GameType,
    pub origin: SessionOrigin,
    pub started_at_ms: u64,
    pub completed_at_ms: Option<u64>,
    pub final_score: i64,
    pub accuracy_percentage: f32,
    pub avg_reaction_time_ms: u64,
    pub difficulty_level_reached: u32,
    pub telemetry: Vec<RoundOutcome>,
    pub derived: Option<DerivedMetrics>,
}

impl SessionRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at_ms.is_some()
    }

    pub fn correct_count(&self) -> u32 {
        self.telemetry.iter().filter(|o| o.is_correct).count() as u32
    }

    pub fn incorrect_count(&self) -> u32 {
        self.telemetry.iter().filter(|o| !o.is_correct).count() as u32
    }

    pub fn reaction_times(&self) -> Vec<u64> {
        self.telemetry.iter().map(|o| o.reaction_time_ms).collect()
    }

    /// Indices of incorrect rounds within the telemetry log.
    pub fn error_indices(&self) -> Vec<usize> {
        self.telemetry
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_correct)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Merge-style update for the Session Store. `None` fields are left
/// untouched; telemetry replaces wholesale so re-sending a checkpoint is
/// idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPatch {
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub final_score: Option<i64>,
    pub accuracy_percentage: Option<f32>,
    pub avg_reaction_time_ms: Option<u64>,
    pub difficulty_level_reached: Option<u32>,
    pub telemetry: Option<Vec<RoundOutcome>>,
    pub derived: Option<DerivedMetrics>,
    pub origin: Option<SessionOrigin>,
}

impl SessionPatch {
    pub fn apply_to(&self, record: &mut SessionRecord) {
        if let Some(v) = self.started_at_ms {
            record.started_at_ms = v;
        }
        if let Some(v) = self.completed_at_ms {
            record.completed_at_ms = Some(v);
        }
        if let Some(v) = self.final_score {
            record.final_score = v;
        }
        if let Some(v) = self.accuracy_percentage {
            record.accuracy_percentage = v;
        }
        if let Some(v) = self.avg_reaction_time_ms {
            record.avg_reaction_time_ms = v;
        }
        if let Some(v) = self.difficulty_level_reached {
            record.difficulty_level_reached = v;
        }
        if let Some(v) = &self.telemetry {
            record.telemetry = v.clone();
        }
        if let Some(v) = &self.derived {
            record.derived = Some(v.clone());
        }
        if let Some(v) = self.origin {
            record.origin = v;
        }
    }
}

/// Game-specific secondary statistics. Each game family has its own fixed
/// schema rather than an open-ended key-value bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum DerivedMetrics {
    DetailSpotter {
        /// Correct finds per minute of play.
        scan_efficiency: f32,
        /// Incorrect responses under the impulsivity latency threshold.
        impulsivity_count: u32,
    },
    SonicConservatory {
        max_span: u32,
        working_memory_score: u32,
        mistake_count: u32,
        /// Wrong notes that still moved in the right melodic direction.
        contour_matches: u32,
    },
    DispatcherConsole {
        max_span: u32,
        total_errors: u32,
        highest_level: u32,
    },
    MatrixAssessment {
        problems_seen: u32,
        rule_tally: [u32; 3],
    },
    StroopChaos {
        impulse_errors: u32,
        impulse_error_rate: f32,
    },
}

/// Incorrect responses faster than the threshold: answering before the
/// stimulus could plausibly have been processed.
pub fn impulsivity_count(telemetry: &[RoundOutcome], params: &ScoringParams) -> u32 {
    telemetry
        .iter()
        .filter(|o| !o.is_correct && o.reaction_time_ms < params.impulsivity_threshold_ms)
        .count() as u32
}

/// For wrong tokens in recall rounds, count those whose interval direction
/// (up/down/flat relative to the previous token) matched the expected one.
pub fn contour_matches(telemetry: &[RoundOutcome]) -> u32 {
    let mut matches = 0;
    for outcome in telemetry {
        let (expected, actual) = match (&outcome.target, &outcome.chosen) {
            (ResponseValue::TokenSequence(e), ResponseValue::TokenSequence(a)) => (e, a),
            _ => continue,
        };
        for i in 1..expected.len().min(actual.len()) {
            if expected[i] == actual[i] {
                continue;
            }
            let exp_dir = expected[i] as i32 - expected[i - 1] as i32;
            let act_dir = actual[i] as i32 - actual[i - 1] as i32;
            if exp_dir.signum() == act_dir.signum() {
                matches += 1;
            }
        }
    }
    matches
}

/// Longest correctly reproduced code across the session.
pub fn max_code_span(telemetry: &[RoundOutcome]) -> u32 {
    telemetry
        .iter()
        .filter(|o| o.is_correct)
        .filter_map(|o| match &o.target {
            ResponseValue::Code(c) => Some(c.chars().count() as u32),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}
