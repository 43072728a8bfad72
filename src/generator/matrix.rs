use super::{ResponseValue, Stimulus, StimulusPayload};
use crate::games::PuzzleKind;
use serde::{Deserialize, Serialize};

/// 5 shapes x 3 positions. Every cell is a 15-bit layer vector; bit i set
/// means layer i is visible.
pub const LAYER_COUNT: usize = 15;

const LAYER_BITS: u16 = (1 << LAYER_COUNT) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolRule {
    Xor,
    And,
    Union,
}

impl BoolRule {
    pub fn apply(&self, a: LayerMask, b: LayerMask) -> LayerMask {
        let bits = match self {
            Self::Xor => a.0 ^ b.0,
            Self::And => a.0 & b.0,
            Self::Union => a.0 | b.0,
        };
        LayerMask(bits & LAYER_BITS)
    }
}

const RULES: [BoolRule; 3] = [BoolRule::Xor, BoolRule::And, BoolRule::Union];

/// A 3x3 logic matrix. Rows 1 and 2 are complete; row 3 shows its first
/// two cells and the third must be chosen from `options`. One rule holds
/// for the whole problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixStimulus {
    pub rows: [[LayerMask; 3]; 2],
    pub stem: [LayerMask; 2],
    pub options: Vec<LayerMask>,
    pub rule: BoolRule,
}

fn random_cell(complexity: u32, rng: &mut fastrand::Rng) -> LayerMask {
    // Flip 1+c .. 2+c bits on. Repeated indices are tolerated, same as the
    // reference generator; the cell just ends up sparser.
    let active = rng.u32(1 + complexity..3 + complexity);
    let mut bits: u16 = 0;
    for _ in 0..active {
        bits |= 1 << rng.usize(0..LAYER_COUNT);
    }
    LayerMask(bits)
}

/// A distractor differs from the correct mask in exactly 1 or 2 distinct
/// bit positions, so it can never collide with the answer.
fn distract(correct: LayerMask, rng: &mut fastrand::Rng) -> LayerMask {
    let first = rng.usize(0..LAYER_COUNT);
    let mut bits = correct.0 ^ (1 << first);
    if rng.bool() {
        let second = loop {
            let b = rng.usize(0..LAYER_COUNT);
            if b != first {
                break b;
            }
        };
        bits ^= 1 << second;
    }
    LayerMask(bits & LAYER_BITS)
}

pub fn generate(level: u32, rng: &mut fastrand::Rng) -> Stimulus {
    let complexity = if level <= 1 { 1 } else { 2 };
    let rule = RULES[rng.usize(0..RULES.len())];

    let mut rows = [[LayerMask(0); 3]; 2];
    for row in rows.iter_mut() {
        let a = random_cell(complexity, rng);
        let b = random_cell(complexity, rng);
        *row = [a, b, rule.apply(a, b)];
    }

    let stem = [random_cell(complexity, rng), random_cell(complexity, rng)];
    let correct = rule.apply(stem[0], stem[1]);

    let correct_index = rng.usize(0..6);
    let mut options = Vec::with_capacity(6);
    for i in 0..6 {
        if i == correct_index {
            options.push(correct);
        } else {
            // Re-draw until the distractor differs from everything chosen so
            // far. `distract` flips one or two of 15 bits, so 120 candidate
            // masks compete for at most five slots and the loop terminates.
            let mut candidate = distract(correct, rng);
            while options.contains(&candidate) {
                candidate = distract(correct, rng);
            }
            options.push(candidate);
        }
    }

    Stimulus {
        kind: PuzzleKind::MatrixAnalogy,
        level,
        payload: StimulusPayload::Matrix(MatrixStimulus {
            rows,
            stem,
            options,
            rule,
        }),
        answer: ResponseValue::OptionIndex(correct_index),
        presented_at_ms: None,
    }
}
