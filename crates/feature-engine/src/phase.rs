//! Growth Phase Assignment

use serde::{Deserialize, Serialize};

/// First growth day of the middle phase
pub const PHASE_ONE_START_DAY: u32 = 15;
/// First growth day of the late phase
pub const PHASE_TWO_START_DAY: u32 = 30;

/// Coarse growth stage derived from elapsed days.
///
/// The thresholds are fixed to what the deployed model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Phase {
    /// Growth days 0..15
    Early,
    /// Growth days 15..30
    Middle,
    /// Growth days 30 and later
    Late,
}

impl Phase {
    pub fn from_growth_days(days: u32) -> Self {
        if days < PHASE_ONE_START_DAY {
            Phase::Early
        } else if days < PHASE_TWO_START_DAY {
            Phase::Middle
        } else {
            Phase::Late
        }
    }

    /// Integer code used as a model feature
    pub fn index(&self) -> u8 {
        match self {
            Phase::Early => 0,
            Phase::Middle => 1,
            Phase::Late => 2,
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.index()
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Phase::Early),
            1 => Ok(Phase::Middle),
            2 => Ok(Phase::Late),
            other => Err(format!("unknown phase code {other}")),
        }
    }
}

/// Maps growth days to phases
pub struct PhaseAssigner;

impl PhaseAssigner {
    pub fn assign(growth_days: &[u32]) -> Vec<Phase> {
        growth_days.iter().map(|&d| Phase::from_growth_days(d)).collect()
    }
}
