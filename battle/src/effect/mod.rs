//! Effect pipeline.
//!
//! Skill side effects and passives are compositions of [`AtomicEffect`]
//! primitives bound to timing [`Hook`]s. Effects never touch combatants:
//! they read an [`EffectContext`] and return [`EffectResult`]s, which
//! [`apply_results`] commits one at a time.

mod apply;
mod atomic;
mod condition;
mod params;
mod registry;

use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use crate::skill::SkillDefinition;
use crate::types::{Combatant, StatusKind};

pub use apply::{AttackTally, apply_results};
pub use atomic::{AtomicEffect, DamageOp, FixedDamage, HpAmount, Target};
pub use condition::Condition;
pub use params::EffectArgs;
pub use registry::{EffectDescriptor, EffectRegistry, builtin_effects, effect_ids};

/// Timing points in a turn where effects may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BattleStart,
    BattleEnd,
    TurnStart,
    TurnEnd,
    BeforeSkill,
    AfterSkill,
    BeforeSpeedCheck,
    AfterSpeedCheck,
    BeforeHitCheck,
    AfterHitCheck,
    BeforeCritCheck,
    AfterCritCheck,
    BeforeDamageCalc,
    AfterDamageCalc,
    BeforeDamageApply,
    AfterDamageApply,
    OnHit,
    OnMiss,
    OnAttack,
    OnAttacked,
    OnHpChange,
    OnKo,
    OnReceiveDamage,
    OnEvade,
    OnCrit,
    OnStatusApplied,
    OnSwitchIn,
    OnSwitchOut,
    OnHeal,
}

impl Hook {
    pub const ALL: [Hook; 29] = [
        Hook::BattleStart,
        Hook::BattleEnd,
        Hook::TurnStart,
        Hook::TurnEnd,
        Hook::BeforeSkill,
        Hook::AfterSkill,
        Hook::BeforeSpeedCheck,
        Hook::AfterSpeedCheck,
        Hook::BeforeHitCheck,
        Hook::AfterHitCheck,
        Hook::BeforeCritCheck,
        Hook::AfterCritCheck,
        Hook::BeforeDamageCalc,
        Hook::AfterDamageCalc,
        Hook::BeforeDamageApply,
        Hook::AfterDamageApply,
        Hook::OnHit,
        Hook::OnMiss,
        Hook::OnAttack,
        Hook::OnAttacked,
        Hook::OnHpChange,
        Hook::OnKo,
        Hook::OnReceiveDamage,
        Hook::OnEvade,
        Hook::OnCrit,
        Hook::OnStatusApplied,
        Hook::OnSwitchIn,
        Hook::OnSwitchOut,
        Hook::OnHeal,
    ];

    /// Hooks where the in-flight damage value is still open to change
    pub fn is_damage_stage(self) -> bool {
        matches!(
            self,
            Hook::BeforeDamageCalc | Hook::AfterDamageCalc | Hook::BeforeDamageApply
        )
    }

    /// Hooks fired by the turn loop for passives, outside any single attack
    pub fn is_turn_level(self) -> bool {
        matches!(
            self,
            Hook::BattleStart
                | Hook::BattleEnd
                | Hook::TurnStart
                | Hook::TurnEnd
                | Hook::BeforeSpeedCheck
                | Hook::AfterSpeedCheck
                | Hook::OnSwitchIn
                | Hook::OnSwitchOut
        )
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A combatant's role in the current invocation.
///
/// For turn-level hooks the owner of the effect is the "attacker".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Attacker,
    Defender,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Attacker => Role::Defender,
            Role::Defender => Role::Attacker,
        }
    }
}

/// What an [`EffectResult`] asks the executor to do
#[derive(Debug, Clone, PartialEq)]
pub enum EffectType {
    /// Direct HP loss outside the damage formula (recoil, reflect)
    HpLoss,
    Heal,
    StatChange(skirmish_protocol::Stat),
    InflictStatus(StatusKind),
    CureStatus,
    ResetStages { only_positive: bool },
    Flinch,
    Bind,
    Fatigue,
    Encore,
    DrainPp,
    GrantPassive(std::sync::Arc<BoundEffect>),

    /// The in-flight damage changed; informational
    DamageModified,
    FixedDamage,
    MultiHit,
    ForceCrit,
}

/// One proposed mutation (or a failed roll), committed by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct EffectResult {
    pub success: bool,
    pub target: Role,
    pub kind: EffectType,
    pub value: i32,
    pub message: String,
}

impl EffectResult {
    pub fn applied(target: Role, kind: EffectType, value: i32, message: impl Into<String>) -> Self {
        Self {
            success: true,
            target,
            kind,
            value,
            message: message.into(),
        }
    }

    pub fn failed(target: Role, kind: EffectType, message: impl Into<String>) -> Self {
        Self {
            success: false,
            target,
            kind,
            value: 0,
            message: message.into(),
        }
    }
}

/// A failure inside one effect invocation; logged and skipped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("{effect} cannot fire at {hook}")]
    WrongHook { effect: &'static str, hook: Hook },

    #[error("{0} needs an active skill")]
    NoSkill(&'static str),

    #[error("Invalid in-flight damage: {0}")]
    InvalidDamage(f64),
}

/// Per-invocation view of the battle handed to effects
#[derive(Debug)]
pub struct EffectContext<'a> {
    pub hook: Hook,
    pub attacker: &'a Combatant,
    pub defender: &'a Combatant,
    pub skill: Option<&'a SkillDefinition>,

    /// Whose effect is running
    pub owner: Role,
    pub moved_first: bool,

    // === In-flight attack state ===
    pub damage: u32,
    pub fixed_damage: Option<u32>,
    pub hits: u8,
    pub force_crit: bool,
    pub is_crit: bool,

    /// HP actually removed from the defender by this attack
    pub damage_dealt: u32,
}

impl<'a> EffectContext<'a> {
    pub fn new(hook: Hook, attacker: &'a Combatant, defender: &'a Combatant) -> Self {
        Self {
            hook,
            attacker,
            defender,
            skill: None,
            owner: Role::Attacker,
            moved_first: false,
            damage: 0,
            fixed_damage: None,
            hits: 1,
            force_crit: false,
            is_crit: false,
            damage_dealt: 0,
        }
    }

    pub fn with_skill(mut self, skill: &'a SkillDefinition) -> Self {
        self.skill = Some(skill);
        self
    }

    pub fn combatant(&self, role: Role) -> &'a Combatant {
        match role {
            Role::Attacker => self.attacker,
            Role::Defender => self.defender,
        }
    }

    pub fn owner(&self) -> &'a Combatant {
        self.combatant(self.owner)
    }

    pub fn foe(&self) -> &'a Combatant {
        self.combatant(self.owner.other())
    }

    /// Resolve an owner-relative target to a role
    pub fn resolve(&self, target: Target) -> Role {
        match target {
            Target::Owner => self.owner,
            Target::Foe => self.owner.other(),
        }
    }
}

/// One hook binding inside a bound effect
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub hook: Hook,
    pub effect: AtomicEffect,
}

impl Trigger {
    pub fn new(hook: Hook, effect: AtomicEffect) -> Self {
        Self { hook, effect }
    }
}

/// A side effect with its arguments resolved into typed primitives
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEffect {
    pub effect_id: u32,
    pub name: &'static str,
    pub triggers: Vec<Trigger>,

    /// Heals its owner; the AI prefers these when low
    pub self_heal: bool,
}

impl BoundEffect {
    pub fn fires_at(&self, hook: Hook) -> bool {
        self.triggers.iter().any(|t| t.hook == hook)
    }

    /// Whether any trigger can run as part of an attack. Effects that only
    /// fire at turn-level hooks work as passives, never as skill side effects.
    pub fn fires_in_attack(&self) -> bool {
        self.triggers.iter().any(|t| !t.hook.is_turn_level())
    }

    /// Run every trigger bound to `ctx.hook`.
    ///
    /// A failing primitive is logged and contributes nothing; the rest still run.
    pub fn fire<R: Rng + ?Sized>(
        &self,
        ctx: &mut EffectContext<'_>,
        rng: &mut R,
    ) -> Vec<EffectResult> {
        let hook = ctx.hook;
        let mut results = Vec::new();
        for trigger in self.triggers.iter().filter(|t| t.hook == hook) {
            match trigger.effect.execute(ctx, rng) {
                Ok(mut produced) => results.append(&mut produced),
                Err(err) => warn!(
                    effect_id = self.effect_id,
                    effect = self.name,
                    %hook,
                    error = %err,
                    "effect failed, skipping"
                ),
            }
        }
        results
    }
}
