use crate::config::ScoringParams;
use crate::games::DifficultyTier;
use crate::generator::{ResponseValue, Stimulus};
use serde::{Deserialize, Serialize};

/// Immutable record of one completed round. Appended to the session
/// telemetry log regardless of correctness and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub level: u32,
    pub target: ResponseValue,
    pub chosen: ResponseValue,
    pub is_correct: bool,
    pub reaction_time_ms: u64,
}

/// Strict-equality check against the stimulus ground truth. A wrong answer
/// is a modeled outcome, not an error; an `Empty` response is simply wrong.
pub fn evaluate(stimulus: &Stimulus, response: &ResponseValue, round: u32, responded_at_ms: u64) -> RoundOutcome {
    let presented = stimulus.presented_at_ms.unwrap_or(responded_at_ms);
    let reaction_time_ms = responded_at_ms.saturating_sub(presented);

    RoundOutcome {
        round,
        level: stimulus.level,
        target: stimulus.answer.clone(),
        chosen: response.clone(),
        is_correct: *response == stimulus.answer,
        reaction_time_ms,
    }
}

/// Per-round score: a tier base plus a stepped speed bonus. Every full
/// `speed_step_ms` of margin under `speed_ceiling_ms` earns one bonus
/// unit; responses at or over the ceiling earn the base alone.
pub fn score(params: &ScoringParams, level: u32, reaction_time_ms: u64) -> u32 {
    let base = match DifficultyTier::from_level(level) {
        DifficultyTier::Oriented => params.base_oriented,
        DifficultyTier::Mirror => params.base_mirror,
        DifficultyTier::Conjunction => params.base_conjunction,
    };

    let bonus = if reaction_time_ms < params.speed_ceiling_ms {
        let steps = (params.speed_ceiling_ms - reaction_time_ms) / params.speed_step_ms;
        steps as u32 * params.speed_bonus_unit
    } else {
        0
    };

    base + bonus
}
