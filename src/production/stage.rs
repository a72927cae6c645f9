use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed production pipeline every job card moves through.
///
/// Each card flows: PENDING → CUTTING → POLISHING → GRINDING → TOUGHENING →
/// QUALITY_CHECK → PACKING → DISPATCHED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Cutting,
    Polishing,
    Grinding,
    Toughening,
    QualityCheck,
    Packing,
    Dispatched,
}

/// Pipeline order. `next_stage` and the stage summaries walk this list.
pub const STAGE_SEQUENCE: [Stage; 8] = [
    Stage::Pending,
    Stage::Cutting,
    Stage::Polishing,
    Stage::Grinding,
    Stage::Toughening,
    Stage::QualityCheck,
    Stage::Packing,
    Stage::Dispatched,
];

impl Stage {
    /// Wire name, as the backend spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Cutting => "cutting",
            Stage::Polishing => "polishing",
            Stage::Grinding => "grinding",
            Stage::Toughening => "toughening",
            Stage::QualityCheck => "quality_check",
            Stage::Packing => "packing",
            Stage::Dispatched => "dispatched",
        }
    }

    /// Human label for printed tags.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Pending => "Pending",
            Stage::Cutting => "Cutting",
            Stage::Polishing => "Polishing",
            Stage::Grinding => "Grinding",
            Stage::Toughening => "Toughening",
            Stage::QualityCheck => "Quality Check",
            Stage::Packing => "Packing",
            Stage::Dispatched => "Dispatched",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == Stage::Dispatched
    }

    /// Position in [`STAGE_SEQUENCE`].
    pub fn position(&self) -> usize {
        STAGE_SEQUENCE
            .iter()
            .position(|s| s == self)
            .unwrap_or(STAGE_SEQUENCE.len() - 1)
    }
}

/// Returns the stage immediately after `current`, or `None` once the card
/// has been dispatched.
pub fn next_stage(current: Stage) -> Option<Stage> {
    STAGE_SEQUENCE.get(current.position() + 1).copied()
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown production stage: {0:?}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        STAGE_SEQUENCE
            .iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
