//! Status and stage tracking between attacks

use std::fmt;

use rand::Rng;
use tracing::trace;

use crate::types::{Combatant, StatStages, StatusKind};

/// Probability that each status stops an action
pub const PARALYSIS_BLOCK_CHANCE: f64 = 0.25;
pub const FEAR_BLOCK_CHANCE: f64 = 0.5;
pub const CONFUSION_BLOCK_CHANCE: f64 = 0.33;

/// Bind deals max HP over this each turn
pub const BIND_DAMAGE_DIVISOR: u32 = 16;

/// Why a combatant lost its action this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Fatigue,
    Status(StatusKind),
    Flinch,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Fatigue => write!(f, "must recharge"),
            BlockReason::Status(kind) => write!(f, "is held back by {kind}"),
            BlockReason::Flinch => write!(f, "flinched"),
        }
    }
}

/// Decide whether a combatant can act, consuming the counters it checks.
///
/// Checks run in a fixed order and the first block wins.
pub fn action_gate<R: Rng + ?Sized>(combatant: &mut Combatant, rng: &mut R) -> Option<BlockReason> {
    if combatant.flags.fatigue_turns > 0 {
        combatant.flags.fatigue_turns -= 1;
        return Some(BlockReason::Fatigue);
    }

    if combatant.status.decrement(StatusKind::Sleep) {
        return Some(BlockReason::Status(StatusKind::Sleep));
    }

    let petrified = combatant.status.decrement(StatusKind::Petrify);
    let sealed = combatant.status.decrement(StatusKind::IceSeal);
    if petrified {
        return Some(BlockReason::Status(StatusKind::Petrify));
    }
    if sealed {
        return Some(BlockReason::Status(StatusKind::IceSeal));
    }

    if combatant.status.is_active(StatusKind::Paralysis) && rng.gen_bool(PARALYSIS_BLOCK_CHANCE) {
        return Some(BlockReason::Status(StatusKind::Paralysis));
    }

    if combatant.status.decrement(StatusKind::Fear) && rng.gen_bool(FEAR_BLOCK_CHANCE) {
        return Some(BlockReason::Status(StatusKind::Fear));
    }

    if combatant.status.decrement(StatusKind::Confusion) && rng.gen_bool(CONFUSION_BLOCK_CHANCE) {
        return Some(BlockReason::Status(StatusKind::Confusion));
    }

    check_flinch(combatant)
}

/// Consume a pending flinch
pub fn check_flinch(combatant: &mut Combatant) -> Option<BlockReason> {
    if combatant.flags.flinched {
        combatant.flags.flinched = false;
        return Some(BlockReason::Flinch);
    }
    None
}

/// Apply start-of-turn damage from statuses and bind; returns HP lost
pub fn start_of_turn_damage(combatant: &mut Combatant) -> u32 {
    let max_hp = combatant.max_hp();
    let mut total = 0;

    for kind in StatusKind::ALL {
        let Some(divisor) = kind.tick_damage_divisor() else {
            continue;
        };
        if combatant.status.decrement(kind) {
            let lost = combatant.take_damage(max_hp / divisor);
            trace!(pet_id = combatant.pet_id, status = %kind, lost, "status damage");
            total += lost;
        }
    }

    if combatant.flags.bound_turns > 0 {
        combatant.flags.bound_turns -= 1;
        total += combatant.take_damage(max_hp / BIND_DAMAGE_DIVISOR);
    }

    total
}

/// Turn-end bookkeeping: decay statuses nothing else decrements, age encore
/// and timed passives, drop an unconsumed flinch
pub fn end_of_turn(combatant: &mut Combatant) {
    for kind in StatusKind::ALL {
        if kind.decays_at_turn_end() {
            combatant.status.decrement(kind);
        }
    }
    combatant.flags.encore_turns = combatant.flags.encore_turns.saturating_sub(1);
    combatant.flags.flinched = false;
    combatant.tick_passives();
}

/// Floor of a stat after a clamped stage
pub fn apply_stage_modifier(base: u32, stage: i8) -> u32 {
    StatStages::apply(base, stage)
}
