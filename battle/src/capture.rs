//! Capture model

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use skirmish_protocol::CaptureResult;
use tracing::warn;

use crate::error::BattleError;
use crate::types::Combatant;

/// Targets above this HP ratio cannot be captured
pub const MAX_CAPTURE_HP_RATIO: f64 = 0.9;
pub const CRITICAL_CAPTURE_CHANCE: f64 = 0.05;
pub const SHAKE_TRIALS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallType {
    Normal,
    Great,
    Ultra,
    Quick,
    Master,
}

impl BallType {
    /// Item id to ball; unknown ids fall back to a normal ball
    pub fn from_id(id: u32) -> BallType {
        match id {
            1 => BallType::Normal,
            2 => BallType::Great,
            3 => BallType::Ultra,
            4 => BallType::Quick,
            5 => BallType::Master,
            other => {
                warn!(ball_id = other, "unknown ball id, treating as normal ball");
                BallType::Normal
            }
        }
    }

    /// Multiplier from the fixed per-ball table
    pub fn modifier(self) -> f64 {
        match self {
            BallType::Normal => 1.0,
            BallType::Great => 1.5,
            BallType::Ultra => 2.0,
            BallType::Quick => 2.5,
            BallType::Master => 255.0,
        }
    }

    pub fn guarantees_capture(self) -> bool {
        self == BallType::Master
    }
}

/// Why a capture was refused before any roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRefusal {
    Boss,
    Fainted,
    HpTooHigh,
    PvpBattle,
}

impl fmt::Display for CaptureRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureRefusal::Boss => write!(f, "bosses cannot be captured"),
            CaptureRefusal::Fainted => write!(f, "target has fainted"),
            CaptureRefusal::HpTooHigh => write!(f, "target HP is too high"),
            CaptureRefusal::PvpBattle => write!(f, "cannot capture in a PVP battle"),
        }
    }
}

/// `base × hp × status × ball × level`, clamped to [1, 100].
///
/// Any active status duration counts for the status bonus, protective ones included.
pub fn compute_capture_rate(target: &Combatant, ball: BallType, base_catch_rate: u32) -> f64 {
    let hp_modifier = (1.0 - target.hp_ratio()) * 0.5 + 0.5;
    let status_modifier = if target.status.any_active() { 1.5 } else { 1.0 };
    let level_modifier = (1.0 - (target.level.max(1) as f64 - 1.0) / 200.0).max(0.5);

    let rate = base_catch_rate as f64 * hp_modifier * status_modifier * ball.modifier() * level_modifier;
    rate.clamp(1.0, 100.0)
}

/// Roll a capture attempt.
///
/// Refusals are checked first (boss, then the master ball shortcut, then
/// fainted and high-HP targets), so refused attempts never consume randomness.
pub fn attempt_capture<R: Rng + ?Sized>(
    target: &Combatant,
    is_boss: bool,
    ball: BallType,
    base_catch_rate: u32,
    rng: &mut R,
) -> Result<CaptureResult, BattleError> {
    if is_boss {
        return Err(BattleError::CaptureRefused(CaptureRefusal::Boss));
    }

    if ball.guarantees_capture() {
        return Ok(CaptureResult {
            success: true,
            shake_count: SHAKE_TRIALS,
            critical: false,
            rate: 100.0,
        });
    }

    if target.is_fainted() {
        return Err(BattleError::CaptureRefused(CaptureRefusal::Fainted));
    }
    if target.hp_ratio() > MAX_CAPTURE_HP_RATIO {
        return Err(BattleError::CaptureRefused(CaptureRefusal::HpTooHigh));
    }

    let rate = compute_capture_rate(target, ball, base_catch_rate);

    if rng.gen_bool(CRITICAL_CAPTURE_CHANCE) {
        return Ok(CaptureResult {
            success: true,
            shake_count: 1,
            critical: true,
            rate,
        });
    }

    let shake_chance = (rate / 100.0).sqrt().clamp(0.0, 1.0);
    let mut shake_count = 0;
    while shake_count < SHAKE_TRIALS && rng.gen_bool(shake_chance) {
        shake_count += 1;
    }

    Ok(CaptureResult {
        success: shake_count == SHAKE_TRIALS,
        shake_count,
        critical: false,
        rate,
    })
}
