//! Central application of effect results

use tracing::debug;

use super::{EffectResult, EffectType, Role};
use crate::types::{Combatant, StatusKind};

/// What committed results did to one attack, for the attack record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackTally {
    /// HP the attacker regained
    pub gain_hp: u32,

    /// HP removed outside the damage formula, per role
    pub attacker_hp_lost: u32,
    pub defender_hp_lost: u32,
    pub statuses_applied: u32,
    pub messages: Vec<String>,
}

/// Commit results one at a time, attacker and defender as seen by the hook
pub fn apply_results(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    results: Vec<EffectResult>,
    tally: &mut AttackTally,
) {
    for result in results {
        if !result.message.is_empty() {
            tally.messages.push(result.message.clone());
        }
        if !result.success {
            continue;
        }
        let target = match result.target {
            Role::Attacker => &mut *attacker,
            Role::Defender => &mut *defender,
        };
        apply_one(target, result.target, &result, tally);
    }
}

fn apply_one(target: &mut Combatant, role: Role, result: &EffectResult, tally: &mut AttackTally) {
    let value = result.value.max(0) as u32;
    match &result.kind {
        EffectType::HpLoss => {
            let lost = target.take_damage(value);
            match role {
                Role::Attacker => tally.attacker_hp_lost += lost,
                Role::Defender => tally.defender_hp_lost += lost,
            }
        }
        EffectType::Heal => {
            let gained = target.heal(value);
            if role == Role::Attacker {
                tally.gain_hp += gained;
            }
        }
        EffectType::StatChange(stat) => {
            let delta = result.value.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
            if delta < 0 && target.status.is_active(StatusKind::StageGuard) {
                debug!(pet_id = target.pet_id, "stage drop blocked by stage guard");
                return;
            }
            target.stages.boost(*stat, delta);
        }
        EffectType::InflictStatus(kind) => {
            if target.status.is_active(StatusKind::StatusImmune) {
                debug!(pet_id = target.pet_id, status = %kind, "status blocked by immunity");
                return;
            }
            let turns = value.min(u8::MAX as u32) as u8;
            let current = target.status.turns(*kind);
            target.status.set(*kind, current.max(turns));
            tally.statuses_applied += 1;
        }
        EffectType::CureStatus => {
            target.status.clear_ailments();
            target.stages.clear_negative();
        }
        EffectType::ResetStages { only_positive } => {
            if *only_positive {
                target.stages.clear_positive();
            } else {
                target.stages.clear();
            }
        }
        EffectType::Flinch => target.flags.flinched = true,
        EffectType::Bind => {
            let turns = value.min(u8::MAX as u32) as u8;
            target.flags.bound_turns = target.flags.bound_turns.max(turns);
        }
        EffectType::Fatigue => {
            target.flags.fatigue_turns = value.min(u8::MAX as u32) as u8;
        }
        EffectType::Encore => {
            if target.flags.last_skill.is_some() {
                target.flags.encore_turns = value.min(u8::MAX as u32) as u8;
            }
        }
        EffectType::DrainPp => {
            if let Some(skill_id) = target.flags.last_skill {
                if let Some(slot) = target.slot_mut(skill_id) {
                    slot.pp = slot.pp.saturating_sub(value.min(u8::MAX as u32) as u8);
                }
            }
        }
        EffectType::GrantPassive(effect) => {
            let turns = value.min(u8::MAX as u32) as u8;
            target.add_passive(effect.clone(), Some(turns.max(1)));
        }
        EffectType::DamageModified
        | EffectType::FixedDamage
        | EffectType::MultiHit
        | EffectType::ForceCrit => {}
    }
}
