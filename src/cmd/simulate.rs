use crate::reports;
use clap::Args;
use neuroforge::config::Config;
use neuroforge::games::GameType;
use neuroforge::generator::{ResponseValue, Stimulus, StimulusPayload};
use neuroforge::session::{GameSession, Phase};
use neuroforge::store::SessionStore;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Game to play (detail_spotter, sonic_conservatory, dispatcher_console,
    /// matrix_assessment, stroop_chaos).
    #[arg(short, long)]
    pub game: GameType,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Probability of answering correctly, 0.0..=1.0.
    #[arg(long, default_value_t = 0.85)]
    pub skill: f64,

    #[arg(short, long, default_value = "demo")]
    pub user: String,
}

/// Scripted player: answers correctly with probability `skill`, with a
/// reaction time drawn from a skill-dependent window.
struct Responder {
    rng: fastrand::Rng,
    skill: f64,
}

impl Responder {
    fn new(seed: Option<u64>, skill: f64) -> Self {
        let rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s ^ 0x5eed),
            None => fastrand::Rng::new(),
        };
        Self {
            rng,
            skill: skill.clamp(0.0, 1.0),
        }
    }

    fn reaction_time_ms(&mut self) -> u64 {
        // Skilled players answer in roughly 500..900 ms, unskilled ones
        // drift toward 1500..2200 ms.
        let base = 2200.0 - 1500.0 * self.skill;
        let jitter = self.rng.u64(0..500);
        base as u64 + jitter
    }

    fn respond(&mut self, stimulus: &Stimulus) -> ResponseValue {
        if self.rng.f64() < self.skill {
            return stimulus.answer.clone();
        }
        self.wrong_answer(stimulus)
    }

    /// Synthesize a plausible wrong answer in the same shape as the truth.
    fn wrong_answer(&mut self, stimulus: &Stimulus) -> ResponseValue {
        match &stimulus.answer {
            ResponseValue::CellIndex(correct) => {
                let cells = match &stimulus.payload {
                    StimulusPayload::Grid(g) => g.cells.len(),
                    _ => correct + 2,
                };
                let mut pick = self.rng.usize(0..cells.max(2));
                if pick == *correct {
                    pick = (pick + 1) % cells.max(2);
                }
                ResponseValue::CellIndex(pick)
            }
            ResponseValue::TokenSequence(tokens) => {
                let mut wrong = tokens.clone();
                if let Some(slot) = wrong.last_mut() {
                    *slot = slot.wrapping_add(1) % 24;
                }
                ResponseValue::TokenSequence(wrong)
            }
            ResponseValue::Code(code) => {
                let mut wrong: Vec<char> = code.chars().collect();
                if let Some(slot) = wrong.last_mut() {
                    *slot = if *slot == '0' { '1' } else { '0' };
                }
                ResponseValue::Code(wrong.into_iter().collect())
            }
            ResponseValue::OptionIndex(correct) => {
                let mut pick = self.rng.usize(0..6);
                if pick == *correct {
                    pick = (pick + 1) % 6;
                }
                ResponseValue::OptionIndex(pick)
            }
            ResponseValue::Empty => ResponseValue::Empty,
        }
    }
}

pub fn run(args: SimulateArgs, store: &mut dyn SessionStore) {
    println!(
        "🎮 Simulating {} for user '{}' (skill {:.2})",
        args.game, args.user, args.skill
    );

    let mut responder = Responder::new(args.seed, args.skill);
    let mut session = GameSession::create(
        store,
        &args.user,
        args.game,
        args.config.clone(),
        args.seed,
        0,
    );

    // Virtual clock: jump straight to each deadline instead of sleeping.
    let mut now_ms = 0u64;
    session.begin(now_ms);

    let mut rounds = 0u32;
    loop {
        match session.poll(now_ms) {
            Phase::Completed => break,
            Phase::AwaitingResponse => {
                let response = match session.current_stimulus() {
                    Some(stim) => responder.respond(stim),
                    None => ResponseValue::Empty,
                };
                now_ms += responder.reaction_time_ms();
                if session.submit(&response, now_ms).is_some() {
                    rounds += 1;
                    if rounds % 5 == 0 {
                        session.checkpoint(store);
                    }
                }
            }
            _ => match session.next_deadline() {
                Some(dl) => now_ms = now_ms.max(dl),
                None => break,
            },
        }
    }

    let saved = session.persist(store);
    if !saved {
        println!("⚠️  Results were not persisted; showing in-memory record.");
    }
    reports::print_session_report(session.record());
}
