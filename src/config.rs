use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct Config {
    #[command(flatten)]
    pub scoring: ScoringParams,
    #[command(flatten)]
    pub session: SessionParams,
    #[command(flatten)]
    pub norms: NormalizerParams,
}

/// Per-round scoring constants. The speed bonus is a step function of the
/// reaction time: every full `speed_step_ms` under `speed_ceiling_ms` is
/// worth `speed_bonus_unit` points.
#[derive(Args, Debug, Clone)]
pub struct ScoringParams {
    #[arg(long, default_value_t = 100)]
    pub base_oriented: u32,
    #[arg(long, default_value_t = 150)]
    pub base_mirror: u32,
    #[arg(long, default_value_t = 200)]
    pub base_conjunction: u32,

    #[arg(long, default_value_t = 2000)]
    pub speed_ceiling_ms: u64,
    #[arg(long, default_value_t = 100)]
    pub speed_step_ms: u64,
    #[arg(long, default_value_t = 5)]
    pub speed_bonus_unit: u32,

    /// Incorrect responses faster than this count as impulsive.
    #[arg(long, default_value_t = 400)]
    pub impulsivity_threshold_ms: u64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_oriented: 100,
            base_mirror: 150,
            base_conjunction: 200,
            speed_ceiling_ms: 2000,
            speed_step_ms: 100,
            speed_bonus_unit: 5,
            impulsivity_threshold_ms: 400,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SessionParams {
    #[arg(long, default_value_t = 60)]
    pub game_duration_secs: u64,
    #[arg(long, default_value_t = 3)]
    pub countdown_secs: u64,
    #[arg(long, default_value_t = 3)]
    pub lives: u32,

    /// Countdown restored per correct answer, capped at the full duration.
    #[arg(long, default_value_t = 1000)]
    pub time_bonus_ms: u64,

    #[arg(long, default_value_t = 400)]
    pub feedback_correct_ms: u64,
    #[arg(long, default_value_t = 500)]
    pub feedback_wrong_ms: u64,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            game_duration_secs: 60,
            countdown_secs: 3,
            lives: 3,
            time_bonus_ms: 1000,
            feedback_correct_ms: 400,
            feedback_wrong_ms: 500,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct NormalizerParams {
    #[arg(long, default_value_t = 30.0)]
    pub trait_clamp_min: f32,
    #[arg(long, default_value_t = 100.0)]
    pub trait_clamp_max: f32,

    // Neutral priors substituted when a game type has no completed session.
    #[arg(long, default_value_t = 50.0)]
    pub fallback_visual: f32,
    #[arg(long, default_value_t = 50.0)]
    pub fallback_logic: f32,
    #[arg(long, default_value_t = 50.0)]
    pub fallback_memory: f32,
    #[arg(long, default_value_t = 50.0)]
    pub fallback_speed: f32,
    #[arg(long, default_value_t = 75.0)]
    pub fallback_focus: f32,

    /// speed_from_latency(rt) = clamp(100 - rt / divisor, 0, 100)
    #[arg(long, default_value_t = 20.0)]
    pub speed_divisor: f32,

    /// Reaction times at or above this are discarded from the consistency
    /// statistic as distraction outliers.
    #[arg(long, default_value_t = 3000)]
    pub outlier_cutoff_ms: u64,
}

impl Default for NormalizerParams {
    fn default() -> Self {
        Self {
            trait_clamp_min: 30.0,
            trait_clamp_max: 100.0,
            fallback_visual: 50.0,
            fallback_logic: 50.0,
            fallback_memory: 50.0,
            fallback_speed: 50.0,
            fallback_focus: 75.0,
            speed_divisor: 20.0,
            outlier_cutoff_ms: 3000,
        }
    }
}

impl SessionParams {
    pub fn game_duration_ms(&self) -> u64 {
        self.game_duration_secs * 1000
    }

    pub fn countdown_ms(&self) -> u64 {
        self.countdown_secs * 1000
    }
}
