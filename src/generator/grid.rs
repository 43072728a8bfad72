use super::{ResponseValue, Stimulus, StimulusPayload};
use crate::games::{grid_side, oriented_target_rotation, PuzzleKind};
use serde::{Deserialize, Serialize};

/// Display glyphs for the grid-search families. The oriented pool carries
/// clear directionality, the mirror pool is asymmetric (flippable), the
/// conjunction pool is plain shapes distinguished by color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    Chevron,
    Arrow,
    CornerArrow,
    Hand,
    Footprints,
    ThumbsUp,
    Pointer,
    Square,
    Circle,
    Triangle,
}

const ORIENTED_POOL: [Glyph; 3] = [Glyph::Chevron, Glyph::Arrow, Glyph::CornerArrow];
const MIRROR_POOL: [Glyph; 4] = [Glyph::Hand, Glyph::Footprints, Glyph::ThumbsUp, Glyph::Pointer];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellColor {
    Violet,
    Red,
    Blue,
    Green,
}

/// Distractor shape+color combinations for conjunction search. The target
/// (red circle) shares its shape with one combo and its color with another,
/// so neither attribute alone identifies it.
const CONJUNCTION_DISTRACTORS: [(Glyph, CellColor); 3] = [
    (Glyph::Square, CellColor::Red),
    (Glyph::Circle, CellColor::Blue),
    (Glyph::Triangle, CellColor::Green),
];
const CONJUNCTION_TARGET: (Glyph, CellColor) = (Glyph::Circle, CellColor::Red);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub glyph: Glyph,
    pub color: CellColor,
    pub rotation_deg: i16,
    pub mirrored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridStimulus {
    pub side: usize,
    pub cells: Vec<GridCell>,
    pub target_index: usize,
}

/// Generate a search grid with exactly one outlier cell. All distractors
/// are identical; the target differs along the single dimension that
/// defines the family (rotation, mirroring, or the shape+color pair).
pub fn generate(kind: PuzzleKind, level: u32, rng: &mut fastrand::Rng) -> Stimulus {
    let side = grid_side(level);
    let total = side * side;
    let target_index = rng.usize(0..total);

    let cells = match kind {
        PuzzleKind::OrientedRotation => {
            let glyph = ORIENTED_POOL[rng.usize(0..ORIENTED_POOL.len())];
            let target_rot = oriented_target_rotation(level);
            (0..total)
                .map(|i| GridCell {
                    glyph,
                    color: CellColor::Violet,
                    rotation_deg: if i == target_index { target_rot } else { 0 },
                    mirrored: false,
                })
                .collect()
        }
        PuzzleKind::MirrorFlip => {
            let glyph = MIRROR_POOL[rng.usize(0..MIRROR_POOL.len())];
            (0..total)
                .map(|i| GridCell {
                    glyph,
                    color: CellColor::Violet,
                    rotation_deg: 0,
                    mirrored: i == target_index,
                })
                .collect()
        }
        // ConjunctionSearch, plus any kind routed here by mistake: the
        // conjunction rules are safe at every level.
        _ => (0..total)
            .map(|i| {
                let (glyph, color) = if i == target_index {
                    CONJUNCTION_TARGET
                } else {
                    CONJUNCTION_DISTRACTORS[rng.usize(0..CONJUNCTION_DISTRACTORS.len())]
                };
                GridCell {
                    glyph,
                    color,
                    rotation_deg: 0,
                    mirrored: false,
                }
            })
            .collect(),
    };

    Stimulus {
        kind,
        level,
        payload: StimulusPayload::Grid(GridStimulus {
            side,
            cells,
            target_index,
        }),
        answer: ResponseValue::CellIndex(target_index),
        presented_at_ms: None,
    }
}
