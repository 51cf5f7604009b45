//! Hit, crit and move-order checks

use std::cmp::Ordering;

use rand::Rng;
use skirmish_protocol::Side;

use crate::skill::SpecialCrit;
use crate::types::StatStages;

/// Accuracy at or above this always hits
pub const SURE_HIT_ACCURACY: u32 = 100;

/// Crit rates are expressed in sixteenths
pub const CRIT_DENOMINATOR: f64 = 16.0;

/// Roll a skill's accuracy against the attacker's accuracy stage
pub fn check_hit<R: Rng + ?Sized>(accuracy: u32, accuracy_stage: i8, rng: &mut R) -> bool {
    if accuracy >= SURE_HIT_ACCURACY {
        return true;
    }
    let chance = accuracy as f64 * StatStages::multiplier(accuracy_stage) / 100.0;
    rng.gen_bool(chance.clamp(0.0, 1.0))
}

/// Crit inputs for one attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CritInput {
    pub base_rate: u32,
    pub speed_stage: i8,
    pub special: SpecialCrit,
    pub moved_first: bool,
    pub self_hp_ratio: f64,
    pub foe_hp_ratio: f64,
}

/// Special always-crit predicates first, then the regular roll
pub fn check_crit<R: Rng + ?Sized>(input: &CritInput, rng: &mut R) -> bool {
    let special = input.special;
    if special.first_strike && input.moved_first {
        return true;
    }
    if special.second_strike && !input.moved_first {
        return true;
    }
    if special.self_below_half && input.self_hp_ratio < 0.5 {
        return true;
    }
    if special.foe_below_half && input.foe_hp_ratio < 0.5 {
        return true;
    }

    let rate = (input.base_rate + input.speed_stage.max(0) as u32) as f64 / CRIT_DENOMINATOR;
    rng.gen_bool(rate.clamp(0.0, 1.0))
}

/// One side's claim on acting first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
    pub priority: i8,

    /// Effective speed (stages applied, paralysis halved)
    pub speed: u32,
}

/// Priority first, then speed. `Equal` means an exact tie.
pub fn compare_speed(a: &Contender, b: &Contender) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.speed.cmp(&b.speed))
}

/// Which side attacks first; exact ties are a coin flip
pub fn determine_first_move<R: Rng + ?Sized>(
    player: &Contender,
    enemy: &Contender,
    rng: &mut R,
) -> Side {
    match compare_speed(player, enemy) {
        Ordering::Greater => Side::Player,
        Ordering::Less => Side::Enemy,
        Ordering::Equal => {
            if rng.gen_bool(0.5) {
                Side::Player
            } else {
                Side::Enemy
            }
        }
    }
}
