//! Atomic effect primitives

use std::sync::Arc;

use rand::Rng;
use skirmish_protocol::Stat;

use super::condition::{Condition, roll};
use super::{BoundEffect, EffectContext, EffectError, EffectResult, EffectType, Hook, Role};
use crate::types::StatusKind;

/// Owner-relative target of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Owner,
    Foe,
}

/// Arithmetic on the in-flight damage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOp {
    Multiply(f64),
    Add(i32),
    Set(u32),
}

/// Damage that replaces the formula result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedDamage {
    /// The defender's current HP
    InstantKill,
    Flat(u32),

    /// Percent of the defender's max HP
    PercentOfMax(u8),

    /// Defender HP minus attacker HP, zero when the attacker is ahead
    HpDifference,
}

/// An HP amount for heals and direct HP loss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpAmount {
    Flat(u32),

    /// Percent of the target's max HP
    PercentOfMax(u8),

    /// Percent of the damage this attack dealt
    PercentOfDamage(u8),
}

/// A single composable effect step with typed parameters
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicEffect {
    Conditional {
        condition: Condition,
        then: Vec<AtomicEffect>,
        otherwise: Vec<AtomicEffect>,
    },
    DamageModifier(DamageOp),
    FixedDamage(FixedDamage),
    MultiHit {
        min: u8,
        max: u8,
    },
    ForceCrit,
    StatModifier {
        target: Target,
        stat: Stat,
        delta: i8,
        chance: u8,
    },
    StatusInflictor {
        target: Target,
        status: StatusKind,
        chance: u8,
        turns: u8,
    },
    Heal {
        target: Target,
        amount: HpAmount,
    },
    HpLoss {
        target: Target,
        amount: HpAmount,
    },
    Flinch {
        chance: u8,
    },
    Bind {
        turns: u8,
        chance: u8,
    },
    Fatigue {
        turns: u8,
    },
    Encore {
        turns: u8,
    },
    Cleanse {
        target: Target,
    },
    ResetStages {
        target: Target,
        only_positive: bool,
    },
    DrainPp {
        amount: u8,
    },
    GrantPassive {
        target: Target,
        effect: Arc<BoundEffect>,
        turns: u8,
    },
}

impl AtomicEffect {
    pub fn name(&self) -> &'static str {
        match self {
            AtomicEffect::Conditional { .. } => "conditional",
            AtomicEffect::DamageModifier(_) => "damage_modifier",
            AtomicEffect::FixedDamage(_) => "fixed_damage",
            AtomicEffect::MultiHit { .. } => "multi_hit",
            AtomicEffect::ForceCrit => "force_crit",
            AtomicEffect::StatModifier { .. } => "stat_modifier",
            AtomicEffect::StatusInflictor { .. } => "status_inflictor",
            AtomicEffect::Heal { .. } => "heal",
            AtomicEffect::HpLoss { .. } => "hp_loss",
            AtomicEffect::Flinch { .. } => "flinch",
            AtomicEffect::Bind { .. } => "bind",
            AtomicEffect::Fatigue { .. } => "fatigue",
            AtomicEffect::Encore { .. } => "encore",
            AtomicEffect::Cleanse { .. } => "cleanse",
            AtomicEffect::ResetStages { .. } => "reset_stages",
            AtomicEffect::DrainPp { .. } => "drain_pp",
            AtomicEffect::GrantPassive { .. } => "grant_passive",
        }
    }

    /// Whether this primitive may fire at `hook`
    pub fn allows(&self, hook: Hook) -> bool {
        match self {
            AtomicEffect::Conditional {
                then, otherwise, ..
            } => then.iter().chain(otherwise).all(|e| e.allows(hook)),
            AtomicEffect::DamageModifier(_) => hook.is_damage_stage(),
            AtomicEffect::FixedDamage(_) | AtomicEffect::MultiHit { .. } => {
                hook == Hook::BeforeDamageCalc
            }
            AtomicEffect::ForceCrit => hook == Hook::BeforeCritCheck,
            // Damage-scaled amounts only exist once damage has landed
            AtomicEffect::Heal {
                amount: HpAmount::PercentOfDamage(_),
                ..
            }
            | AtomicEffect::HpLoss {
                amount: HpAmount::PercentOfDamage(_),
                ..
            } => matches!(
                hook,
                Hook::AfterDamageApply | Hook::OnReceiveDamage | Hook::OnHpChange
            ),
            _ => !hook.is_damage_stage() && !matches!(hook, Hook::BeforeCritCheck),
        }
    }

    /// Evaluate against the context, returning proposed mutations
    pub fn execute<R: Rng + ?Sized>(
        &self,
        ctx: &mut EffectContext<'_>,
        rng: &mut R,
    ) -> Result<Vec<EffectResult>, EffectError> {
        if !self.allows(ctx.hook) {
            return Err(EffectError::WrongHook {
                effect: self.name(),
                hook: ctx.hook,
            });
        }

        match self {
            AtomicEffect::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let branch = if condition.evaluate(ctx, rng) {
                    then
                } else {
                    otherwise
                };
                let mut results = Vec::new();
                for child in branch {
                    results.append(&mut child.execute(ctx, rng)?);
                }
                Ok(results)
            }

            AtomicEffect::DamageModifier(op) => {
                let before = ctx.damage;
                let after = match *op {
                    DamageOp::Multiply(factor) => {
                        let scaled = ctx.damage as f64 * factor;
                        if !scaled.is_finite() || scaled < 0.0 {
                            return Err(EffectError::InvalidDamage(scaled));
                        }
                        scaled.floor() as u32
                    }
                    DamageOp::Add(delta) => (ctx.damage as i64 + delta as i64).max(0) as u32,
                    DamageOp::Set(value) => value,
                };
                ctx.damage = after;
                Ok(vec![EffectResult::applied(
                    Role::Defender,
                    EffectType::DamageModified,
                    after as i32 - before as i32,
                    format!("Damage {before} -> {after}"),
                )])
            }

            AtomicEffect::FixedDamage(kind) => {
                let defender = ctx.defender;
                let amount = match *kind {
                    FixedDamage::InstantKill => defender.hp(),
                    FixedDamage::Flat(value) => value,
                    FixedDamage::PercentOfMax(pct) => percent_of(defender.max_hp(), pct),
                    FixedDamage::HpDifference => defender.hp().saturating_sub(ctx.attacker.hp()),
                };
                ctx.fixed_damage = Some(amount);
                Ok(vec![EffectResult::applied(
                    Role::Defender,
                    EffectType::FixedDamage,
                    amount as i32,
                    format!("Fixed damage {amount}"),
                )])
            }

            AtomicEffect::MultiHit { min, max } => {
                let low = (*min).max(1);
                let high = (*max).max(low);
                let hits = rng.gen_range(low..=high);
                ctx.hits = hits;
                Ok(vec![EffectResult::applied(
                    Role::Defender,
                    EffectType::MultiHit,
                    hits as i32,
                    format!("Hit {hits} times"),
                )])
            }

            AtomicEffect::ForceCrit => {
                ctx.force_crit = true;
                Ok(vec![EffectResult::applied(
                    Role::Defender,
                    EffectType::ForceCrit,
                    1,
                    "A guaranteed critical hit",
                )])
            }

            AtomicEffect::StatModifier {
                target,
                stat,
                delta,
                chance,
            } => {
                let role = ctx.resolve(*target);
                let name = &ctx.combatant(role).name;
                if !roll(*chance, rng) {
                    return Ok(vec![EffectResult::failed(
                        role,
                        EffectType::StatChange(*stat),
                        format!("{name}'s {} did not change", stat.as_str()),
                    )]);
                }
                let verb = if *delta >= 0 { "rose" } else { "fell" };
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::StatChange(*stat),
                    *delta as i32,
                    format!("{name}'s {} {verb}", stat.as_str()),
                )])
            }

            AtomicEffect::StatusInflictor {
                target,
                status,
                chance,
                turns,
            } => {
                let role = ctx.resolve(*target);
                let name = &ctx.combatant(role).name;
                if !roll(*chance, rng) {
                    return Ok(vec![EffectResult::failed(
                        role,
                        EffectType::InflictStatus(*status),
                        format!("{name} resisted {status}"),
                    )]);
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::InflictStatus(*status),
                    *turns as i32,
                    format!("{name} is afflicted by {status}"),
                )])
            }

            AtomicEffect::Heal { target, amount } => {
                let role = ctx.resolve(*target);
                let value = resolve_amount(ctx, role, *amount);
                if value == 0 {
                    return Ok(Vec::new());
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::Heal,
                    value as i32,
                    format!("{} restored {value} HP", ctx.combatant(role).name),
                )])
            }

            AtomicEffect::HpLoss { target, amount } => {
                let role = ctx.resolve(*target);
                let value = resolve_amount(ctx, role, *amount);
                if value == 0 {
                    return Ok(Vec::new());
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::HpLoss,
                    value as i32,
                    format!("{} lost {value} HP", ctx.combatant(role).name),
                )])
            }

            AtomicEffect::Flinch { chance } => {
                let role = ctx.resolve(Target::Foe);
                if !roll(*chance, rng) {
                    return Ok(Vec::new());
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::Flinch,
                    1,
                    format!("{} flinched", ctx.combatant(role).name),
                )])
            }

            AtomicEffect::Bind { turns, chance } => {
                let role = ctx.resolve(Target::Foe);
                if !roll(*chance, rng) {
                    return Ok(Vec::new());
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::Bind,
                    *turns as i32,
                    format!("{} is bound", ctx.combatant(role).name),
                )])
            }

            AtomicEffect::Fatigue { turns } => {
                let role = ctx.resolve(Target::Owner);
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::Fatigue,
                    *turns as i32,
                    format!("{} must recharge", ctx.combatant(role).name),
                )])
            }

            AtomicEffect::Encore { turns } => {
                let role = ctx.resolve(Target::Foe);
                let foe = ctx.combatant(role);
                if foe.flags.last_skill.is_none() {
                    return Ok(vec![EffectResult::failed(
                        role,
                        EffectType::Encore,
                        "But it failed",
                    )]);
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::Encore,
                    *turns as i32,
                    format!("{} received an encore", foe.name),
                )])
            }

            AtomicEffect::Cleanse { target } => {
                let role = ctx.resolve(*target);
                let combatant = ctx.combatant(role);
                if !combatant.status.any_ailment() && !combatant.stages.has_drops() {
                    return Ok(Vec::new());
                }
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::CureStatus,
                    0,
                    format!("{} was cured", combatant.name),
                )])
            }

            AtomicEffect::ResetStages {
                target,
                only_positive,
            } => {
                let role = ctx.resolve(*target);
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::ResetStages {
                        only_positive: *only_positive,
                    },
                    0,
                    format!("{}'s stat changes were reset", ctx.combatant(role).name),
                )])
            }

            AtomicEffect::DrainPp { amount } => {
                let role = ctx.resolve(Target::Foe);
                let foe = ctx.combatant(role);
                match foe.flags.last_skill {
                    Some(_) => Ok(vec![EffectResult::applied(
                        role,
                        EffectType::DrainPp,
                        *amount as i32,
                        format!("{}'s PP was reduced", foe.name),
                    )]),
                    None => Ok(Vec::new()),
                }
            }

            AtomicEffect::GrantPassive {
                target,
                effect,
                turns,
            } => {
                let role = ctx.resolve(*target);
                Ok(vec![EffectResult::applied(
                    role,
                    EffectType::GrantPassive(Arc::clone(effect)),
                    *turns as i32,
                    format!("{} is protected by {}", ctx.combatant(role).name, effect.name),
                )])
            }
        }
    }
}

fn percent_of(value: u32, pct: u8) -> u32 {
    (value as u64 * pct as u64 / 100) as u32
}

fn resolve_amount(ctx: &EffectContext<'_>, role: Role, amount: HpAmount) -> u32 {
    match amount {
        HpAmount::Flat(value) => value,
        HpAmount::PercentOfMax(pct) => percent_of(ctx.combatant(role).max_hp(), pct).max(1),
        HpAmount::PercentOfDamage(pct) => percent_of(ctx.damage_dealt, pct),
    }
}
