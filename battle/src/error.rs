//! Error types for the battle core

use skirmish_protocol::{EscapeRefusal, RejectCode, Side};
use thiserror::Error;

use crate::capture::CaptureRefusal;

/// A request the battle core refused. State is never mutated when one of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("Unknown skill id: {0}")]
    UnknownSkill(u32),

    #[error("Skill {skill_id} is not in the active combatant's loadout")]
    SkillNotInLoadout { skill_id: u32 },

    #[error("Skill {skill_id} has no PP left")]
    NoPpLeft { skill_id: u32 },

    #[error("No party member in slot {slot}")]
    SwitchTargetMissing { slot: usize },

    #[error("Party member in slot {slot} has fainted")]
    SwitchTargetFainted { slot: usize },

    #[error("Party member in slot {slot} is already active")]
    SwitchTargetActive { slot: usize },

    #[error("The {side} side must switch in a healthy combatant first")]
    MustSwitch { side: Side },

    #[error("The {side} side has an empty party")]
    EmptyParty { side: Side },

    #[error("Battle is already over")]
    BattleOver,

    #[error("Capture refused: {0}")]
    CaptureRefused(CaptureRefusal),

    #[error("Escape refused: {0:?}")]
    EscapeRefused(EscapeRefusal),
}

impl BattleError {
    /// Numeric reason code reported to the client
    pub fn code(&self) -> RejectCode {
        match self {
            BattleError::UnknownSkill(_) => RejectCode::UnknownSkill,
            BattleError::SkillNotInLoadout { .. } => RejectCode::SkillNotInLoadout,
            BattleError::NoPpLeft { .. } => RejectCode::NoPpLeft,
            BattleError::SwitchTargetMissing { .. } | BattleError::EmptyParty { .. } => {
                RejectCode::SwitchTargetMissing
            }
            BattleError::SwitchTargetFainted { .. } => RejectCode::SwitchTargetFainted,
            BattleError::SwitchTargetActive { .. } => RejectCode::SwitchTargetActive,
            BattleError::MustSwitch { .. } => RejectCode::MustSwitch,
            BattleError::BattleOver => RejectCode::BattleOver,
            BattleError::CaptureRefused(_) => RejectCode::CaptureRefused,
            BattleError::EscapeRefused(_) => RejectCode::EscapeRefused,
        }
    }
}

/// Configuration that failed to load. Raised once at startup, never mid-battle.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Skill {skill_id} references unknown side effect {effect_id}")]
    UnknownEffect { skill_id: u32, effect_id: u32 },

    #[error("Bad arguments for side effect {effect_id} ({name}): {reason}")]
    BadArguments {
        effect_id: u32,
        name: &'static str,
        reason: String,
    },

    #[error("Skill {skill_id}: side effect {effect_id} only fires outside attacks, bind it as a trait")]
    TraitOnlyEffect { skill_id: u32, effect_id: u32 },

    #[error("Side effect id {0} registered twice")]
    DuplicateEffect(u32),

    #[error("Skill id {0} defined twice")]
    DuplicateSkill(u32),

    #[error("Boss {boss_id}: {reason}")]
    InvalidBossRule { boss_id: u32, reason: String },
}
