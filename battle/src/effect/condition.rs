//! Conditions evaluated by the conditional primitive

use rand::Rng;

use super::{EffectContext, Role};
use crate::types::StatusKind;

/// A predicate over the current invocation, seen from the effect owner
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always,
    Never,

    /// Percent chance, 0..=100
    Chance(u8),
    MovedFirst,
    MovedSecond,
    OwnerIsAttacker,
    OwnerIsDefender,

    /// HP percent thresholds (strict comparisons)
    OwnerHpBelow(u8),
    OwnerHpAbove(u8),
    FoeHpBelow(u8),
    FoeHpAbove(u8),
    FoeHpHigherThanOwner,
    FoeHasStatus(StatusKind),
    FoeHasAnyStatus,
    OwnerHasStatus(StatusKind),
    IsCrit,
    DamageAtLeast(u32),

    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn evaluate<R: Rng + ?Sized>(&self, ctx: &EffectContext<'_>, rng: &mut R) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Chance(percent) => roll(*percent, rng),
            Condition::MovedFirst => ctx.moved_first == (ctx.owner == Role::Attacker),
            Condition::MovedSecond => ctx.moved_first != (ctx.owner == Role::Attacker),
            Condition::OwnerIsAttacker => ctx.owner == Role::Attacker,
            Condition::OwnerIsDefender => ctx.owner == Role::Defender,
            Condition::OwnerHpBelow(pct) => ctx.owner().hp_ratio() * 100.0 < *pct as f64,
            Condition::OwnerHpAbove(pct) => ctx.owner().hp_ratio() * 100.0 > *pct as f64,
            Condition::FoeHpBelow(pct) => ctx.foe().hp_ratio() * 100.0 < *pct as f64,
            Condition::FoeHpAbove(pct) => ctx.foe().hp_ratio() * 100.0 > *pct as f64,
            Condition::FoeHpHigherThanOwner => ctx.foe().hp() > ctx.owner().hp(),
            Condition::FoeHasStatus(kind) => ctx.foe().status.is_active(*kind),
            Condition::FoeHasAnyStatus => ctx.foe().status.any_ailment(),
            Condition::OwnerHasStatus(kind) => ctx.owner().status.is_active(*kind),
            Condition::IsCrit => ctx.is_crit,
            Condition::DamageAtLeast(amount) => ctx.damage >= *amount,
            Condition::All(all) => all.iter().all(|c| c.evaluate(ctx, rng)),
            Condition::Any(any) => any.iter().any(|c| c.evaluate(ctx, rng)),
            Condition::Not(inner) => !inner.evaluate(ctx, rng),
        }
    }
}

/// Percent roll; 0 never passes, 100 always passes
pub(crate) fn roll<R: Rng + ?Sized>(percent: u8, rng: &mut R) -> bool {
    match percent {
        0 => false,
        p if p >= 100 => true,
        p => rng.gen_range(0..100u8) < p,
    }
}
