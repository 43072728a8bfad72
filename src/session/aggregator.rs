use super::{
    contour_matches, impulsivity_count, max_code_span, DerivedMetrics, SessionId, SessionOrigin,
    SessionPatch, SessionRecord,
};
use crate::config::Config;
use crate::evaluator::{self, RoundOutcome};
use crate::games::{GameType, PuzzleKind};
use crate::generator::{self, BoolRule, ResponseValue, Stimulus, StimulusPayload};
use crate::store::SessionStore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Countdown,
    /// Timed, non-interactive display (e.g. the sequence to memorize).
    Presenting,
    /// Accepts exactly one committed answer for the current round.
    AwaitingResponse,
    /// Brief non-cancelable transition before the next round or the end.
    Feedback,
    Completed,
}

/// Drives one game session round by round.
///
/// All timing is explicit: callers pass `now_ms` into every operation and
/// pump `poll` to fire due deadlines. The session owns its pending
/// deadline, so tearing the session down (drop or `abandon`) cancels all
/// scheduled work; nothing can mutate a disposed session.
pub struct GameSession {
    config: Config,
    rng: fastrand::Rng,
    record: SessionRecord,
    phase: Phase,

    lives_left: u32,
    level: u32,
    next_level: u32,
    max_level_reached: u32,
    round: u32,
    score: i64,

    stimulus: Option<Stimulus>,
    phase_deadline_ms: Option<u64>,
    /// Global countdown expiry. Valid once gameplay has started.
    ends_at_ms: u64,
    finish_after_feedback: bool,

    rule_tally: [u32; 3],
    aborted: bool,
}

impl GameSession {
    /// Create the session record, falling back to a local-only id when the
    /// store rejects the write. Gameplay proceeds either way.
    pub fn create(
        store: &mut dyn SessionStore,
        user_id: &str,
        game_type: GameType,
        config: Config,
        seed: Option<u64>,
        now_ms: u64,
    ) -> Self {
        let (session_id, origin) = match store.create_session(user_id, game_type) {
            Ok(id) => (id, SessionOrigin::Persisted),
            Err(e) => {
                warn!("Session creation failed ({e}); continuing local-only");
                (SessionId(format!("local-{now_ms}")), SessionOrigin::LocalOnly)
            }
        };

        let rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };

        let record = SessionRecord {
            session_id,
            user_id: user_id.to_string(),
            game_type,
            origin,
            started_at_ms: now_ms,
            completed_at_ms: None,
            final_score: 0,
            accuracy_percentage: 0.0,
            avg_reaction_time_ms: 0,
            difficulty_level_reached: 1,
            telemetry: Vec::new(),
            derived: None,
        };

        Self {
            lives_left: config.session.lives,
            config,
            rng,
            record,
            phase: Phase::Intro,
            level: 1,
            next_level: 1,
            max_level_reached: 1,
            round: 0,
            score: 0,
            stimulus: None,
            phase_deadline_ms: None,
            ends_at_ms: 0,
            finish_after_feedback: false,
            rule_tally: [0; 3],
            aborted: false,
        }
    }

    /// Leave the intro screen: start the pre-game countdown.
    pub fn begin(&mut self, now_ms: u64) {
        if self.phase != Phase::Intro || self.aborted {
            return;
        }
        self.phase = Phase::Countdown;
        self.phase_deadline_ms = Some(now_ms + self.config.session.countdown_ms());
        debug!(
            game = %self.record.game_type,
            session = %self.record.session_id,
            "Countdown started"
        );
    }

    /// Fire every deadline that has come due, in order, including the
    /// global countdown. Returns the phase after settling.
    pub fn poll(&mut self, now_ms: u64) -> Phase {
        if self.aborted || self.phase == Phase::Completed {
            return Phase::Completed;
        }

        loop {
            let in_gameplay = matches!(
                self.phase,
                Phase::Presenting | Phase::AwaitingResponse | Phase::Feedback
            );

            // The global expiry wins over any later phase deadline.
            if in_gameplay
                && now_ms >= self.ends_at_ms
                && self.phase_deadline_ms.map_or(true, |dl| self.ends_at_ms <= dl)
            {
                self.complete(self.ends_at_ms);
                break;
            }

            match self.phase_deadline_ms {
                Some(dl) if now_ms >= dl => self.advance_at(dl),
                _ => break,
            }

            if self.phase == Phase::Completed {
                break;
            }
        }

        self.phase
    }

    fn advance_at(&mut self, deadline_ms: u64) {
        self.phase_deadline_ms = None;
        match self.phase {
            Phase::Countdown => {
                self.ends_at_ms = deadline_ms + self.config.session.game_duration_ms();
                self.enter_round(deadline_ms);
            }
            Phase::Presenting => {
                if let Some(stim) = self.stimulus.as_mut() {
                    stim.mark_presented(deadline_ms);
                }
                self.phase = Phase::AwaitingResponse;
            }
            Phase::Feedback => {
                if self.finish_after_feedback {
                    self.complete(deadline_ms);
                } else {
                    self.level = self.next_level;
                    self.enter_round(deadline_ms);
                }
            }
            // Intro/AwaitingResponse carry no deadline of their own.
            _ => {}
        }
    }

    fn enter_round(&mut self, now_ms: u64) {
        let kind = PuzzleKind::for_game(self.record.game_type, self.level);
        let mut stim = generator::generate(kind, self.level, &mut self.rng);
        self.max_level_reached = self.max_level_reached.max(self.level);

        if let StimulusPayload::Matrix(m) = &stim.payload {
            let slot = match m.rule {
                BoolRule::Xor => 0,
                BoolRule::And => 1,
                BoolRule::Union => 2,
            };
            self.rule_tally[slot] += 1;
        }

        let presenting = stim.presenting_ms();
        if presenting == 0 {
            stim.mark_presented(now_ms);
            self.phase = Phase::AwaitingResponse;
        } else {
            self.phase = Phase::Presenting;
            self.phase_deadline_ms = Some(now_ms + presenting);
        }
        self.stimulus = Some(stim);
    }

    /// Commit one answer for the current round. Ignored (returns `None`)
    /// outside `AwaitingResponse`; the wrongness of an answer is a normal
    /// outcome, never an error.
    pub fn submit(&mut self, response: &ResponseValue, now_ms: u64) -> Option<RoundOutcome> {
        if self.poll(now_ms) != Phase::AwaitingResponse {
            return None;
        }
        let stimulus = self.stimulus.as_ref()?;

        self.round += 1;
        let outcome = evaluator::evaluate(stimulus, response, self.round, now_ms);
        self.record.telemetry.push(outcome.clone());

        let feedback_ms = if outcome.is_correct {
            self.score += evaluator::score(
                &self.config.scoring,
                self.level,
                outcome.reaction_time_ms,
            ) as i64;
            self.next_level = self.level + 1;

            // Small countdown refill, capped at the full duration.
            let refilled = self.ends_at_ms + self.config.session.time_bonus_ms;
            self.ends_at_ms = refilled.min(now_ms + self.config.session.game_duration_ms());

            if let Some(cap) = stimulus.kind.max_level() {
                if self.level >= cap {
                    self.finish_after_feedback = true;
                }
            }
            self.config.session.feedback_correct_ms
        } else {
            self.lives_left = self.lives_left.saturating_sub(1);
            self.next_level = self.level;
            if self.lives_left == 0 {
                self.finish_after_feedback = true;
            }
            self.config.session.feedback_wrong_ms
        };

        self.phase = Phase::Feedback;
        self.phase_deadline_ms = Some(now_ms + feedback_ms);
        Some(outcome)
    }

    /// Tear the session down: cancel all pending deadlines. The record is
    /// left unfinalized and no later poll or submit can touch it.
    pub fn abandon(&mut self) {
        self.aborted = true;
        self.phase_deadline_ms = None;
        self.stimulus = None;
    }

    fn complete(&mut self, now_ms: u64) {
        self.phase = Phase::Completed;
        self.phase_deadline_ms = None;

        let correct = self.record.correct_count();
        let attempts = correct + self.record.incorrect_count();

        self.record.completed_at_ms = Some(now_ms);
        self.record.final_score = self.score;
        self.record.accuracy_percentage = if attempts > 0 {
            correct as f32 / attempts as f32 * 100.0
        } else {
            0.0
        };
        self.record.avg_reaction_time_ms = if self.record.telemetry.is_empty() {
            0
        } else {
            let sum: u64 = self.record.telemetry.iter().map(|o| o.reaction_time_ms).sum();
            sum / self.record.telemetry.len() as u64
        };
        self.record.difficulty_level_reached = self.max_level_reached;
        self.record.derived = Some(self.build_derived(now_ms));

        info!(
            session = %self.record.session_id,
            score = self.score,
            accuracy = self.record.accuracy_percentage,
            level = self.max_level_reached,
            "Session completed"
        );
    }

    fn build_derived(&self, completed_at_ms: u64) -> DerivedMetrics {
        let telemetry = &self.record.telemetry;
        let correct = self.record.correct_count();
        let incorrect = self.record.incorrect_count();
        let attempts = correct + incorrect;

        match self.record.game_type {
            GameType::DetailSpotter => {
                let elapsed = completed_at_ms.saturating_sub(self.record.started_at_ms).max(1);
                DerivedMetrics::DetailSpotter {
                    scan_efficiency: correct as f32 * 60_000.0 / elapsed as f32,
                    impulsivity_count: impulsivity_count(telemetry, &self.config.scoring),
                }
            }
            GameType::SonicConservatory => {
                let max_span = if self.max_level_reached > 1 {
                    2 + self.max_level_reached
                } else {
                    3
                };
                DerivedMetrics::SonicConservatory {
                    max_span,
                    working_memory_score: (self.record.accuracy_percentage * max_span as f32
                        / 10.0)
                        .round() as u32,
                    mistake_count: incorrect,
                    contour_matches: contour_matches(telemetry),
                }
            }
            GameType::DispatcherConsole => DerivedMetrics::DispatcherConsole {
                max_span: max_code_span(telemetry),
                total_errors: incorrect,
                highest_level: self.max_level_reached,
            },
            GameType::MatrixAssessment => DerivedMetrics::MatrixAssessment {
                problems_seen: telemetry.len() as u32,
                rule_tally: self.rule_tally,
            },
            GameType::StroopChaos => {
                let impulse_errors = impulsivity_count(telemetry, &self.config.scoring);
                DerivedMetrics::StroopChaos {
                    impulse_errors,
                    impulse_error_rate: if attempts > 0 {
                        impulse_errors as f32 / attempts as f32 * 100.0
                    } else {
                        0.0
                    },
                }
            }
        }
    }

    /// Write the finalized record to the store, retrying once. Losing a
    /// completed session is the costliest failure, but persistence failure
    /// is non-fatal: the in-memory record stays authoritative and the
    /// return value doubles as the "saved" indicator.
    pub fn persist(&self, store: &mut dyn SessionStore) -> bool {
        if self.record.origin == SessionOrigin::LocalOnly {
            info!(session = %self.record.session_id, "Local-only session; skipping store write");
            return false;
        }

        let patch = SessionPatch {
            started_at_ms: Some(self.record.started_at_ms),
            completed_at_ms: self.record.completed_at_ms,
            final_score: Some(self.record.final_score),
            accuracy_percentage: Some(self.record.accuracy_percentage),
            avg_reaction_time_ms: Some(self.record.avg_reaction_time_ms),
            difficulty_level_reached: Some(self.record.difficulty_level_reached),
            telemetry: Some(self.record.telemetry.clone()),
            derived: self.record.derived.clone(),
            origin: Some(self.record.origin),
        };

        for attempt in 0..2 {
            match store.update_session(&self.record.session_id, &patch) {
                Ok(()) => return true,
                Err(e) if attempt == 0 => {
                    warn!("Finalize write failed ({e}); retrying once");
                }
                Err(e) => {
                    warn!("Finalize write failed again ({e}); results remain in memory");
                }
            }
        }
        false
    }

    /// Mid-session telemetry checkpoint. Best-effort, single attempt.
    pub fn checkpoint(&self, store: &mut dyn SessionStore) {
        if self.record.origin == SessionOrigin::LocalOnly {
            return;
        }
        let patch = SessionPatch {
            started_at_ms: Some(self.record.started_at_ms),
            final_score: Some(self.score),
            telemetry: Some(self.record.telemetry.clone()),
            ..Default::default()
        };
        if let Err(e) = store.update_session(&self.record.session_id, &patch) {
            warn!("Telemetry checkpoint failed ({e})");
        }
    }

    pub fn phase(&self) -> Phase {
        if self.aborted {
            Phase::Completed
        } else {
            self.phase
        }
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        self.stimulus.as_ref()
    }

    pub fn lives_left(&self) -> u32 {
        self.lives_left
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn time_left_ms(&self, now_ms: u64) -> u64 {
        if self.ends_at_ms == 0 {
            self.config.session.game_duration_ms()
        } else {
            self.ends_at_ms.saturating_sub(now_ms)
        }
    }

    /// Next instant at which `poll` will do work, if any. Drivers use this
    /// to step virtual time without busy-waiting.
    pub fn next_deadline(&self) -> Option<u64> {
        if self.aborted || self.phase == Phase::Completed {
            return None;
        }
        let in_gameplay = matches!(
            self.phase,
            Phase::Presenting | Phase::AwaitingResponse | Phase::Feedback
        );
        match (self.phase_deadline_ms, in_gameplay) {
            (Some(dl), true) => Some(dl.min(self.ends_at_ms)),
            (Some(dl), false) => Some(dl),
            (None, true) => Some(self.ends_at_ms),
            (None, false) => None,
        }
    }
}
