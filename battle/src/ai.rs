//! Skill selection for computer-controlled combatants

use crate::skill::{BASIC_ATTACK_ID, SkillLookup};
use crate::types::Combatant;

/// Score a skill must beat to be picked over the fallback
pub const SENTINEL_SCORE: f64 = 0.0;

/// Flat score for non-damaging skills
pub const STATUS_BASELINE_SCORE: f64 = 10.0;

/// Score of a self-heal when the user is below half HP
pub const URGENT_HEAL_SCORE: f64 = 500.0;

/// Damage bonus when the foe is nearly down
pub const FINISHER_BONUS: f64 = 1.5;

/// Pick the skill id with the highest score; ties go to the earlier slot.
///
/// Falls back to the first slot with PP when nothing beats the sentinel, and
/// to the basic attack when the loadout is exhausted.
pub fn select_skill(me: &Combatant, foe: &Combatant, skills: &dyn SkillLookup) -> u32 {
    let mut best: Option<(u32, f64)> = None;

    for slot in me.usable_skills() {
        let Some(skill) = skills.skill(slot.skill_id) else {
            continue;
        };
        let score = if skill.is_damaging() && skill.power > 0 {
            let mut score = skill.power as f64
                * skill.element.effectiveness(foe.element)
                * (skill.accuracy.min(100) as f64 / 100.0);
            if foe.hp_ratio() < 0.3 {
                score *= FINISHER_BONUS;
            }
            score
        } else if me.hp_ratio() < 0.5 && skill.is_self_heal() {
            URGENT_HEAL_SCORE
        } else {
            STATUS_BASELINE_SCORE
        };

        if score > best.map_or(SENTINEL_SCORE, |(_, s)| s) {
            best = Some((slot.skill_id, score));
        }
    }

    match best {
        Some((skill_id, _)) => skill_id,
        None => me
            .usable_skills()
            .next()
            .map_or(BASIC_ATTACK_ID, |slot| slot.skill_id),
    }
}
