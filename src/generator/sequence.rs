use super::{ResponseValue, Stimulus, StimulusPayload};
use crate::games::PuzzleKind;
use serde::{Deserialize, Serialize};

/// Two chromatic octaves (C3..B4).
pub const PITCH_COUNT: u8 = 24;

/// A pitch sequence to reproduce in order. Tokens are pitch indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceStimulus {
    pub tokens: Vec<u8>,
    /// Playback cadence during the presenting phase.
    pub step_ms: u64,
}

/// An authorization code to retype after a timed flash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeStimulus {
    pub code: String,
    pub display_ms: u64,
}

// I and O are excluded from the code alphabet to avoid 1/0 confusion.
const DIGITS: &str = "0123456789";
const LETTERS: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ";
const SYMBOLS: &str = "#@&";

/// Code length, alphabet reach, and flash duration per level. Levels past
/// the table clamp to the last row.
const CODE_LEVELS: [(usize, u8, u64); 4] = [
    (3, 0, 2000), // numeric
    (5, 1, 2500), // alphanumeric
    (7, 2, 3000), // mixed
    (9, 2, 2200), // mixed, shorter flash
];

/// Span grows with the round (span = round + 2). Generation is a random
/// walk over the pitch range: each jump magnitude is bounded by a
/// per-round range, direction is a coin flip, and the result is clamped
/// into [0, PITCH_COUNT).
pub fn generate_sequence(round: u32, rng: &mut fastrand::Rng) -> Stimulus {
    let span = (round + 2) as usize;
    let jump_range = match round {
        0 | 1 => 5,
        2 => 7,
        _ => 12,
    };

    let mut tokens = Vec::with_capacity(span);
    let mut current = rng.u8(0..PITCH_COUNT) as i32;
    tokens.push(current as u8);

    for _ in 1..span {
        let jump = rng.i32(0..jump_range) * if rng.bool() { 1 } else { -1 };
        current = (current + jump).clamp(0, PITCH_COUNT as i32 - 1);
        tokens.push(current as u8);
    }

    Stimulus {
        kind: PuzzleKind::SequenceRecall,
        level: round,
        payload: StimulusPayload::Sequence(SequenceStimulus {
            tokens: tokens.clone(),
            step_ms: 800,
        }),
        answer: ResponseValue::TokenSequence(tokens),
        presented_at_ms: None,
    }
}

/// Draw each character uniformly from the level's alphabet, re-drawing
/// when it would repeat the previous character (no immediate repetition).
pub fn generate_code(level: u32, rng: &mut fastrand::Rng) -> Stimulus {
    let idx = (level.max(1) as usize - 1).min(CODE_LEVELS.len() - 1);
    let (length, reach, display_ms) = CODE_LEVELS[idx];

    let mut alphabet = String::from(DIGITS);
    if reach >= 1 {
        alphabet.push_str(LETTERS);
    }
    if reach >= 2 {
        alphabet.push_str(SYMBOLS);
    }
    let chars: Vec<char> = alphabet.chars().collect();

    let mut code = String::with_capacity(length);
    let mut prev: Option<char> = None;
    for _ in 0..length {
        let c = loop {
            let candidate = chars[rng.usize(0..chars.len())];
            if Some(candidate) != prev {
                break candidate;
            }
        };
        code.push(c);
        prev = Some(c);
    }

    Stimulus {
        kind: PuzzleKind::CodeRecall,
        level,
        payload: StimulusPayload::Code(CodeStimulus {
            code: code.clone(),
            display_ms,
        }),
        answer: ResponseValue::Code(code),
        presented_at_ms: None,
    }
}
