use crate::config::NormalizerParams;
use crate::games::GameType;
use crate::session::SessionRecord;
use crate::store::BaselineStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Normalized cognitive trait profile, each field clamped to the
/// configured range (30..=100 by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitVector {
    pub visual: f32,
    pub logic: f32,
    pub memory: f32,
    pub speed: f32,
    pub focus: f32,
}

impl TraitVector {
    pub fn as_array(&self) -> [(&'static str, f32); 5] {
        [
            ("visual", self.visual),
            ("logic", self.logic),
            ("memory", self.memory),
            ("speed", self.speed),
            ("focus", self.focus),
        ]
    }
}

/// Standing relative to a population baseline for one game type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreReport {
    pub z: f64,
    pub percentile: u8,
}

/// Most recent completed session per game type. Expects records ordered
/// newest first, as the store returns them.
pub fn latest_by_type(records: &[SessionRecord]) -> HashMap<GameType, &SessionRecord> {
    let mut latest = HashMap::new();
    for record in records.iter().filter(|r| r.is_completed()) {
        latest.entry(record.game_type).or_insert(record);
    }
    latest
}

fn mean_of(parts: &[Option<f32>], fallback: f32) -> f32 {
    let present: Vec<f32> = parts.iter().flatten().copied().collect();
    if present.is_empty() {
        fallback
    } else {
        present.iter().sum::<f32>() / present.len() as f32
    }
}

fn speed_from_latency(avg_rt_ms: u64, params: &NormalizerParams) -> f32 {
    (100.0 - avg_rt_ms as f32 / params.speed_divisor).clamp(0.0, 100.0)
}

/// Collapse the latest session per game into a trait vector. Missing games
/// drop out of each average; a fully absent trait takes its neutral prior.
pub fn normalize(
    latest: &HashMap<GameType, &SessionRecord>,
    params: &NormalizerParams,
) -> TraitVector {
    let detail = latest.get(&GameType::DetailSpotter);
    let sonic = latest.get(&GameType::SonicConservatory);
    let dispatch = latest.get(&GameType::DispatcherConsole);
    let matrix = latest.get(&GameType::MatrixAssessment);
    let stroop = latest.get(&GameType::StroopChaos);

    let visual = mean_of(
        &[
            detail.map(|r| r.final_score as f32 / 20.0),
            matrix.map(|r| r.final_score as f32 / 30.0),
        ],
        params.fallback_visual,
    );
    let logic = mean_of(
        &[
            matrix.map(|r| r.final_score as f32 / 25.0),
            stroop.map(|r| r.final_score as f32 / 30.0),
        ],
        params.fallback_logic,
    );
    let memory = mean_of(
        &[
            sonic.map(|r| r.accuracy_percentage),
            dispatch.map(|r| r.accuracy_percentage),
        ],
        params.fallback_memory,
    );
    let speed = mean_of(
        &[
            detail.map(|r| speed_from_latency(r.avg_reaction_time_ms, params)),
            dispatch.map(|r| speed_from_latency(r.avg_reaction_time_ms, params)),
        ],
        params.fallback_speed,
    );
    let focus = mean_of(
        &[
            detail.map(|r| r.accuracy_percentage),
            stroop.map(|r| r.accuracy_percentage),
            dispatch.map(|r| r.accuracy_percentage),
        ],
        params.fallback_focus,
    );

    let clamp = |v: f32| v.clamp(params.trait_clamp_min, params.trait_clamp_max);
    let traits = TraitVector {
        visual: clamp(visual),
        logic: clamp(logic),
        memory: clamp(memory),
        speed: clamp(speed),
        focus: clamp(focus),
    };
    debug!(?traits, "Normalized trait vector");
    traits
}

/// Standard score against the population baseline. `None` when the
/// baseline is degenerate (zero or negative spread) or the result is not
/// finite.
pub fn z_score(avg_rt_ms: u64, baseline: &BaselineStats) -> Option<ZScoreReport> {
    if baseline.std_latency_ms <= 0.0 {
        return None;
    }
    let z = (avg_rt_ms as f64 - baseline.mean_latency_ms) / baseline.std_latency_ms;
    if !z.is_finite() {
        return None;
    }
    Some(ZScoreReport {
        z,
        percentile: percentile_from_z(z),
    })
}

/// Abramowitz-Stegun style erf approximation of the normal CDF, mapped to
/// a whole-number percentile. Lower reaction time means a higher
/// percentile, so the sign flips for z > 0. The result is additionally
/// pinned to the correct side of 50 so rounding can never report a
/// slower-than-average run as above average.
pub fn percentile_from_z(z: f64) -> u8 {
    let sign = if z > 0.0 { -1.0 } else { 1.0 };
    let body = (1.0 - (-2.0 * z * z / std::f64::consts::PI).exp()).sqrt();
    let p = (100.0 * 0.5 * (1.0 + sign * body)).round() as i64;
    let p = p.clamp(0, 100);
    let pinned = if z > 0.0 {
        p.min(50)
    } else if z < 0.0 {
        p.max(50)
    } else {
        p
    };
    pinned as u8
}

/// Population standard deviation of reaction times, with distraction
/// outliers at or above the cutoff discarded first. 0 when fewer than one
/// sample survives.
pub fn consistency(reaction_times_ms: &[u64], params: &NormalizerParams) -> f64 {
    let kept: Vec<f64> = reaction_times_ms
        .iter()
        .filter(|&&rt| rt < params.outlier_cutoff_ms)
        .map(|&rt| rt as f64)
        .collect();
    if kept.is_empty() {
        return 0.0;
    }
    let mean = kept.iter().sum::<f64>() / kept.len() as f64;
    let var = kept.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / kept.len() as f64;
    var.sqrt()
}

/// Mean ratio of post-error reaction time to the overall mean. 1.0 means
/// errors do not slow the player down; values above 1.0 indicate
/// post-error hesitation. Defaults to 1.0 with no errors or no trial
/// following one.
pub fn resilience(record: &SessionRecord) -> f64 {
    let rts = record.reaction_times();
    if rts.is_empty() {
        return 1.0;
    }
    let mean = rts.iter().sum::<u64>() as f64 / rts.len() as f64;
    if mean <= 0.0 {
        return 1.0;
    }
    let ratios: Vec<f64> = record
        .error_indices()
        .into_iter()
        .filter_map(|i| rts.get(i + 1))
        .map(|&rt| rt as f64 / mean)
        .collect();
    if ratios.is_empty() {
        1.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}
