use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The mini-games whose sessions feed the trait profile.
#[derive(
    Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    DetailSpotter,
    SonicConservatory,
    DispatcherConsole,
    MatrixAssessment,
    StroopChaos,
}

#[derive(
    Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PuzzleKind {
    OrientedRotation,
    MirrorFlip,
    ConjunctionSearch,
    SequenceRecall,
    CodeRecall,
    MatrixAnalogy,
}

impl PuzzleKind {
    /// The puzzle family a game presents at a given level.
    ///
    /// Detail-spotter escalates through the three grid-search families.
    /// Games without a generation family of their own (stroop) fall back to
    /// the default family so the round loop never dies on an unknown kind.
    pub fn for_game(game: GameType, level: u32) -> Self {
        match game {
            GameType::DetailSpotter => DifficultyTier::from_level(level).grid_kind(),
            GameType::SonicConservatory => Self::SequenceRecall,
            GameType::DispatcherConsole => Self::CodeRecall,
            GameType::MatrixAssessment => Self::MatrixAnalogy,
            GameType::StroopChaos => Self::default_family(),
        }
    }

    /// Fallback family for requests outside any game's own mapping.
    pub fn default_family() -> Self {
        Self::OrientedRotation
    }

    /// Success-exhaustion cap: `None` means the session is only bounded by
    /// the countdown and lives.
    pub fn max_level(&self) -> Option<u32> {
        match self {
            Self::SequenceRecall => Some(5),
            Self::CodeRecall => Some(4),
            _ => None,
        }
    }
}

/// Coarse difficulty band for the grid-search families. Governs which
/// generation rule-set applies and the base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyTier {
    Oriented,
    Mirror,
    Conjunction,
}

impl DifficultyTier {
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=3 => Self::Oriented,
            4..=7 => Self::Mirror,
            _ => Self::Conjunction,
        }
    }

    pub fn grid_kind(&self) -> PuzzleKind {
        match self {
            Self::Oriented => PuzzleKind::OrientedRotation,
            Self::Mirror => PuzzleKind::MirrorFlip,
            Self::Conjunction => PuzzleKind::ConjunctionSearch,
        }
    }
}

/// Grid side length by level: 3x3 at level 1 up to a hard cap of 8x8.
pub fn grid_side(level: u32) -> usize {
    match level {
        0..=2 => 3,
        3..=4 => 4,
        5..=6 => 5,
        7..=8 => 6,
        9..=10 => 7,
        _ => 8,
    }
}

/// Target rotation for the oriented-search family. Distractors stay at 0°;
/// the offset shrinks as levels climb, making the target harder to spot.
pub fn oriented_target_rotation(level: u32) -> i16 {
    match level {
        0 | 1 => 90,
        2 => 45,
        _ => 15,
    }
}
