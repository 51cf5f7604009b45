//! Side-effect registry and the built-in catalogue

use std::collections::HashMap;
use std::sync::Arc;

use skirmish_protocol::Stat;

use super::atomic::{AtomicEffect, DamageOp, FixedDamage, HpAmount, Target};
use super::condition::Condition;
use super::params::EffectArgs;
use super::{BoundEffect, Hook, Trigger};
use crate::error::ConfigError;

/// Builds the hook bindings for one side effect from its arguments
pub type EffectBuilder = fn(&EffectArgs) -> Result<Vec<Trigger>, String>;

/// Registry entry: identifier, name and constructor
#[derive(Clone, Copy)]
pub struct EffectDescriptor {
    pub id: u32,
    pub name: &'static str,
    pub self_heal: bool,
    pub build: EffectBuilder,
}

impl std::fmt::Debug for EffectDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("self_heal", &self.self_heal)
            .finish()
    }
}

/// Side-effect ids of the built-in catalogue
pub mod effect_ids {
    pub const STAT_BOOST_SELF: u32 = 1;
    pub const STAT_DROP_FOE: u32 = 2;
    pub const INFLICT_STATUS: u32 = 3;
    pub const DRAIN: u32 = 4;
    pub const RECOIL: u32 = 5;
    pub const SELF_HEAL: u32 = 6;
    pub const FIXED_DAMAGE: u32 = 7;
    pub const PERCENT_DAMAGE: u32 = 8;
    pub const INSTANT_KILL: u32 = 9;
    pub const HP_DIFFERENCE: u32 = 10;
    pub const MULTI_HIT: u32 = 11;
    pub const FLINCH: u32 = 12;
    pub const BIND: u32 = 13;
    pub const RECHARGE: u32 = 14;
    pub const DOUBLE_VS_STATUS: u32 = 15;
    pub const FIRST_STRIKE_BONUS: u32 = 16;
    pub const DESPERATION: u32 = 17;
    pub const CLEANSE_SELF: u32 = 18;
    pub const RESET_FOE_STAGES: u32 = 19;
    pub const BARRIER: u32 = 20;
    pub const REFLECT: u32 = 21;
    pub const ENCORE: u32 = 22;
    pub const FORCE_CRIT: u32 = 23;
    pub const PP_DRAIN: u32 = 24;
    pub const BOOST_ON_KO: u32 = 25;
    pub const REGENERATE: u32 = 26;
}

use effect_ids as ids;

/// Every built-in side effect, in id order
pub fn builtin_effects() -> Vec<EffectDescriptor> {
    vec![
        descriptor(ids::STAT_BOOST_SELF, "stat_boost_self", false, stat_boost_self),
        descriptor(ids::STAT_DROP_FOE, "stat_drop_foe", false, stat_drop_foe),
        descriptor(ids::INFLICT_STATUS, "inflict_status", false, inflict_status),
        descriptor(ids::DRAIN, "drain", true, drain),
        descriptor(ids::RECOIL, "recoil", false, recoil),
        descriptor(ids::SELF_HEAL, "self_heal", true, self_heal),
        descriptor(ids::FIXED_DAMAGE, "fixed_damage", false, fixed_damage),
        descriptor(ids::PERCENT_DAMAGE, "percent_damage", false, percent_damage),
        descriptor(ids::INSTANT_KILL, "instant_kill", false, instant_kill),
        descriptor(ids::HP_DIFFERENCE, "hp_difference", false, hp_difference),
        descriptor(ids::MULTI_HIT, "multi_hit", false, multi_hit),
        descriptor(ids::FLINCH, "flinch", false, flinch),
        descriptor(ids::BIND, "bind", false, bind),
        descriptor(ids::RECHARGE, "recharge", false, recharge),
        descriptor(ids::DOUBLE_VS_STATUS, "double_vs_status", false, double_vs_status),
        descriptor(ids::FIRST_STRIKE_BONUS, "first_strike_bonus", false, first_strike_bonus),
        descriptor(ids::DESPERATION, "desperation", false, desperation),
        descriptor(ids::CLEANSE_SELF, "cleanse_self", false, cleanse_self),
        descriptor(ids::RESET_FOE_STAGES, "reset_foe_stages", false, reset_foe_stages),
        descriptor(ids::BARRIER, "barrier", false, barrier),
        descriptor(ids::REFLECT, "reflect", false, reflect),
        descriptor(ids::ENCORE, "encore", false, encore),
        descriptor(ids::FORCE_CRIT, "force_crit", false, force_crit),
        descriptor(ids::PP_DRAIN, "pp_drain", false, pp_drain),
        descriptor(ids::BOOST_ON_KO, "boost_on_ko", false, boost_on_ko),
        descriptor(ids::REGENERATE, "regenerate", true, regenerate),
    ]
}

fn descriptor(
    id: u32,
    name: &'static str,
    self_heal: bool,
    build: EffectBuilder,
) -> EffectDescriptor {
    EffectDescriptor {
        id,
        name,
        self_heal,
        build,
    }
}

/// Effect id to constructor map, validated at startup
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    descriptors: HashMap<u32, EffectDescriptor>,
}

impl EffectRegistry {
    /// Build from an explicit list, failing on duplicate ids
    pub fn new(descriptors: impl IntoIterator<Item = EffectDescriptor>) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for descriptor in descriptors {
            if map.insert(descriptor.id, descriptor).is_some() {
                return Err(ConfigError::DuplicateEffect(descriptor.id));
            }
        }
        Ok(Self { descriptors: map })
    }

    /// The built-in catalogue
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_effects())
    }

    pub fn contains(&self, effect_id: u32) -> bool {
        self.descriptors.contains_key(&effect_id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptor(&self, effect_id: u32) -> Option<&EffectDescriptor> {
        self.descriptors.get(&effect_id)
    }

    /// Resolve an effect id and its raw argument string into typed triggers.
    ///
    /// Every trigger is checked against the hooks its primitive may fire at.
    pub fn bind(&self, effect_id: u32, raw_args: &str) -> Result<BoundEffect, ConfigError> {
        let descriptor = self
            .descriptors
            .get(&effect_id)
            .ok_or(ConfigError::UnknownEffect {
                skill_id: 0,
                effect_id,
            })?;
        let bad = |reason: String| ConfigError::BadArguments {
            effect_id,
            name: descriptor.name,
            reason,
        };

        let args = EffectArgs::parse(raw_args).map_err(bad)?;
        let triggers = (descriptor.build)(&args).map_err(bad)?;
        if let Some(trigger) = triggers.iter().find(|t| !t.effect.allows(t.hook)) {
            return Err(bad(format!(
                "{} cannot fire at {}",
                trigger.effect.name(),
                trigger.hook
            )));
        }

        Ok(BoundEffect {
            effect_id,
            name: descriptor.name,
            triggers,
            self_heal: descriptor.self_heal,
        })
    }
}

fn after_skill(effect: AtomicEffect) -> Vec<Trigger> {
    vec![Trigger::new(Hook::AfterSkill, effect)]
}

fn when(condition: Condition, then: AtomicEffect) -> AtomicEffect {
    AtomicEffect::Conditional {
        condition,
        then: vec![then],
        otherwise: Vec::new(),
    }
}

fn multiplier(percent: i64, name: &str) -> Result<f64, String> {
    if !(0..=1000).contains(&percent) {
        return Err(format!("{name} = {percent} is outside 0..=1000"));
    }
    Ok(percent as f64 / 100.0)
}

// args: stat, delta, [chance=100]
fn stat_boost_self(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::StatModifier {
        target: Target::Owner,
        stat: args.stat(0)?,
        delta: args.stage_delta(1, "delta")?.abs(),
        chance: args.percent_or(2, 100, "chance")?,
    }))
}

// args: stat, amount, [chance=100]
fn stat_drop_foe(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::StatModifier {
        target: Target::Foe,
        stat: args.stat(0)?,
        delta: -args.stage_delta(1, "amount")?.abs(),
        chance: args.percent_or(2, 100, "chance")?,
    }))
}

// args: status, chance, [turns=3]
fn inflict_status(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::StatusInflictor {
        target: Target::Foe,
        status: args.status(0)?,
        chance: args.percent(1, "chance")?,
        turns: args.turns_or(2, 3, "turns")?,
    }))
}

// args: percent of damage dealt
fn drain(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::AfterDamageApply,
        AtomicEffect::Heal {
            target: Target::Owner,
            amount: HpAmount::PercentOfDamage(args.percent_or(0, 50, "percent")?),
        },
    )])
}

// args: percent of damage dealt
fn recoil(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::AfterDamageApply,
        AtomicEffect::HpLoss {
            target: Target::Owner,
            amount: HpAmount::PercentOfDamage(args.percent_or(0, 25, "percent")?),
        },
    )])
}

// args: percent of max HP
fn self_heal(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::Heal {
        target: Target::Owner,
        amount: HpAmount::PercentOfMax(args.percent_or(0, 50, "percent")?),
    }))
}

// args: damage
fn fixed_damage(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::BeforeDamageCalc,
        AtomicEffect::FixedDamage(FixedDamage::Flat(args.amount(0, 9999, "damage")?)),
    )])
}

// args: percent of the foe's max HP
fn percent_damage(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::BeforeDamageCalc,
        AtomicEffect::FixedDamage(FixedDamage::PercentOfMax(args.percent(0, "percent")?)),
    )])
}

// args: [chance=30]
fn instant_kill(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::BeforeDamageCalc,
        when(
            Condition::Chance(args.percent_or(0, 30, "chance")?),
            AtomicEffect::FixedDamage(FixedDamage::InstantKill),
        ),
    )])
}

fn hp_difference(_args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::BeforeDamageCalc,
        AtomicEffect::FixedDamage(FixedDamage::HpDifference),
    )])
}

// args: [min=2], [max=5]
fn multi_hit(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let min = args.turns_or(0, 2, "min")?;
    let max = args.turns_or(1, 5, "max")?;
    if min > max || max > 10 {
        return Err(format!("bad hit range {min}..={max}"));
    }
    Ok(vec![Trigger::new(
        Hook::BeforeDamageCalc,
        AtomicEffect::MultiHit { min, max },
    )])
}

// args: chance
fn flinch(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::Flinch {
        chance: args.percent(0, "chance")?,
    }))
}

// args: [turns=4], [chance=100]
fn bind(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::Bind {
        turns: args.turns_or(0, 4, "turns")?,
        chance: args.percent_or(1, 100, "chance")?,
    }))
}

// args: [turns=1]
fn recharge(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::Fatigue {
        turns: args.turns_or(0, 1, "turns")?,
    }))
}

// args: [multiplier percent=200]
fn double_vs_status(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let factor = multiplier(args.int_or(0, 200), "multiplier")?;
    Ok(vec![Trigger::new(
        Hook::AfterDamageCalc,
        when(
            Condition::FoeHasAnyStatus,
            AtomicEffect::DamageModifier(DamageOp::Multiply(factor)),
        ),
    )])
}

// args: [multiplier percent=150]
fn first_strike_bonus(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let factor = multiplier(args.int_or(0, 150), "multiplier")?;
    Ok(vec![Trigger::new(
        Hook::AfterDamageCalc,
        when(
            Condition::MovedFirst,
            AtomicEffect::DamageModifier(DamageOp::Multiply(factor)),
        ),
    )])
}

// args: [hp threshold percent=25], [multiplier percent=200]
fn desperation(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let threshold = args.percent_or(0, 25, "threshold")?;
    let factor = multiplier(args.int_or(1, 200), "multiplier")?;
    Ok(vec![Trigger::new(
        Hook::AfterDamageCalc,
        when(
            Condition::OwnerHpBelow(threshold),
            AtomicEffect::DamageModifier(DamageOp::Multiply(factor)),
        ),
    )])
}

fn cleanse_self(_args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::Cleanse {
        target: Target::Owner,
    }))
}

fn reset_foe_stages(_args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::ResetStages {
        target: Target::Foe,
        only_positive: true,
    }))
}

// args: reduction percent, [turns=3]
fn barrier(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let reduction = args.percent(0, "reduction")?;
    let turns = args.turns_or(1, 3, "turns")?;
    let shield = BoundEffect {
        effect_id: ids::BARRIER,
        name: "barrier",
        triggers: vec![Trigger::new(
            Hook::BeforeDamageApply,
            when(
                Condition::OwnerIsDefender,
                AtomicEffect::DamageModifier(DamageOp::Multiply(
                    (100 - reduction) as f64 / 100.0,
                )),
            ),
        )],
        self_heal: false,
    };
    Ok(after_skill(AtomicEffect::GrantPassive {
        target: Target::Owner,
        effect: Arc::new(shield),
        turns,
    }))
}

// args: reflected percent, [turns=3]
fn reflect(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let percent = args.percent(0, "percent")?;
    let turns = args.turns_or(1, 3, "turns")?;
    let mirror = BoundEffect {
        effect_id: ids::REFLECT,
        name: "reflect",
        triggers: vec![Trigger::new(
            Hook::AfterDamageApply,
            when(
                Condition::OwnerIsDefender,
                AtomicEffect::HpLoss {
                    target: Target::Foe,
                    amount: HpAmount::PercentOfDamage(percent),
                },
            ),
        )],
        self_heal: false,
    };
    Ok(after_skill(AtomicEffect::GrantPassive {
        target: Target::Owner,
        effect: Arc::new(mirror),
        turns,
    }))
}

// args: [turns=3]
fn encore(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::Encore {
        turns: args.turns_or(0, 3, "turns")?,
    }))
}

fn force_crit(_args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(Hook::BeforeCritCheck, AtomicEffect::ForceCrit)])
}

// args: [amount=4]
fn pp_drain(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(after_skill(AtomicEffect::DrainPp {
        amount: args.turns_or(0, 4, "amount")?,
    }))
}

// args: [stat=0], [delta=1]
fn boost_on_ko(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    let stat = if args.is_empty() { Stat::Atk } else { args.stat(0)? };
    let delta = if args.len() > 1 {
        args.stage_delta(1, "delta")?
    } else {
        1
    };
    Ok(vec![Trigger::new(
        Hook::OnKo,
        when(
            Condition::OwnerIsAttacker,
            AtomicEffect::StatModifier {
                target: Target::Owner,
                stat,
                delta,
                chance: 100,
            },
        ),
    )])
}

// Trait: heals a percent of max HP at turn end. args: [percent=6]
fn regenerate(args: &EffectArgs) -> Result<Vec<Trigger>, String> {
    Ok(vec![Trigger::new(
        Hook::TurnEnd,
        AtomicEffect::Heal {
            target: Target::Owner,
            amount: HpAmount::PercentOfMax(args.percent_or(0, 6, "percent")?),
        },
    )])
}
