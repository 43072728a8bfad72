pub mod grid;
pub mod matrix;
pub mod sequence;

pub use self::grid::{CellColor, GridCell, GridStimulus, Glyph};
pub use self::matrix::{BoolRule, LayerMask, MatrixStimulus, LAYER_COUNT};
pub use self::sequence::{CodeStimulus, SequenceStimulus, PITCH_COUNT};

use crate::games::PuzzleKind;
use serde::{Deserialize, Serialize};

/// A committed answer, or the ground truth it is checked against.
/// Variants mirror the puzzle families: grid/matrix puzzles answer by
/// index, recall puzzles by the full ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseValue {
    CellIndex(usize),
    TokenSequence(Vec<u8>),
    Code(String),
    OptionIndex(usize),
    /// Empty/malformed submission. Never equal to any ground truth.
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StimulusPayload {
    Grid(GridStimulus),
    Sequence(SequenceStimulus),
    Code(CodeStimulus),
    Matrix(MatrixStimulus),
}

/// One generated puzzle instance for a single round.
///
/// Invariant: exactly one answer satisfies `answer`, computable before any
/// interaction; generation can never fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stimulus {
    pub kind: PuzzleKind,
    pub level: u32,
    pub payload: StimulusPayload,
    pub answer: ResponseValue,
    /// Set by the session when the stimulus becomes interactive.
    pub presented_at_ms: Option<u64>,
}

impl Stimulus {
    /// Duration of the non-interactive display phase. Grid and matrix
    /// puzzles are interactive immediately; recall puzzles first play or
    /// flash the material to memorize.
    pub fn presenting_ms(&self) -> u64 {
        match &self.payload {
            StimulusPayload::Grid(_) | StimulusPayload::Matrix(_) => 0,
            StimulusPayload::Sequence(s) => 1000 + s.step_ms * s.tokens.len() as u64,
            StimulusPayload::Code(c) => c.display_ms,
        }
    }

    pub fn mark_presented(&mut self, now_ms: u64) {
        self.presented_at_ms = Some(now_ms);
    }
}

/// Produce a structurally valid stimulus for the requested family and
/// level. Level 0 is treated as 1. This never fails: every family handles
/// the full level range.
pub fn generate(kind: PuzzleKind, level: u32, rng: &mut fastrand::Rng) -> Stimulus {
    let level = level.max(1);
    match kind {
        PuzzleKind::OrientedRotation | PuzzleKind::MirrorFlip | PuzzleKind::ConjunctionSearch => {
            grid::generate(kind, level, rng)
        }
        PuzzleKind::SequenceRecall => sequence::generate_sequence(level, rng),
        PuzzleKind::CodeRecall => sequence::generate_code(level, rng),
        PuzzleKind::MatrixAnalogy => matrix::generate(level, rng),
    }
}
