//! Combatant state during battle

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skirmish_protocol::Stat;

use super::element::Element;
use super::stats::StatStages;
use super::status::{StatusKind, StatusVector};
use crate::effect::{BoundEffect, EffectRegistry};
use crate::error::ConfigError;
use crate::formula::{BaseStats, CoreStats, EffortValues, compute_stats};

/// Maximum number of skills a combatant carries into battle
pub const MAX_SKILLS: usize = 4;

/// One loadout entry with its own PP counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSlot {
    pub skill_id: u32,
    pub pp: u8,
    pub max_pp: u8,
}

impl SkillSlot {
    pub fn new(skill_id: u32, max_pp: u8) -> Self {
        Self {
            skill_id,
            pp: max_pp,
            max_pp,
        }
    }

    pub fn has_pp(&self) -> bool {
        self.pp > 0
    }
}

/// Short-lived combat flags (cleared on switch-out)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientFlags {
    /// Loses its next action; cleared when consumed
    pub flinched: bool,
    pub bound_turns: u8,
    pub fatigue_turns: u8,
    pub encore_turns: u8,
    pub last_skill: Option<u32>,
}

/// A bound effect riding on a combatant, fired at the hooks it declares
#[derive(Debug, Clone)]
pub struct Passive {
    pub effect: Arc<BoundEffect>,

    /// Remaining turns, `None` for permanent traits
    pub turns_left: Option<u8>,
}

/// A permanent passive a pet carries into every battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitSpec {
    pub effect_id: u32,
    #[serde(default)]
    pub args: String,
}

/// Persisted pet data used to build a combatant at battle entry or switch-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSource {
    pub pet_id: u64,
    pub owner_id: u64,
    pub species_id: u32,
    #[serde(default)]
    pub name: String,
    pub element: Element,
    pub level: u8,
    pub base: BaseStats,
    #[serde(default)]
    pub individual_value: Option<u8>,
    #[serde(default)]
    pub effort: EffortValues,
    #[serde(default = "default_nature")]
    pub nature_id: u8,
    pub skills: Vec<SkillSlot>,

    /// HP persisted from an earlier battle; `None` means full
    #[serde(default)]
    pub hp: Option<u32>,

    #[serde(default = "default_catch_rate")]
    pub catch_rate: u8,

    #[serde(default)]
    pub traits: Vec<TraitSpec>,
}

fn default_nature() -> u8 {
    crate::types::NEUTRAL_NATURE
}

fn default_catch_rate() -> u8 {
    45
}

/// Combatant state during battle
#[derive(Debug, Clone)]
pub struct Combatant {
    pub pet_id: u64,
    pub owner_id: u64,
    pub species_id: u32,
    pub name: String,
    pub level: u8,
    pub element: Element,

    // === HP ===
    /// Current HP, always within 0..=max_hp
    hp: u32,
    pub stats: CoreStats,

    // === Loadout ===
    pub skills: Vec<SkillSlot>,

    // === Combat state ===
    pub status: StatusVector,
    pub stages: StatStages,
    pub flags: TransientFlags,
    pub passives: Vec<Passive>,

    /// Base catch rate used by the capture model
    pub catch_rate: u8,
}

impl Combatant {
    /// Build from persisted pet data, binding its traits as permanent passives
    pub fn from_source(source: &PetSource, effects: &EffectRegistry) -> Result<Self, ConfigError> {
        let stats = compute_stats(
            &source.base,
            source.level,
            source.individual_value,
            &source.effort,
            source.nature_id,
        );
        let mut combatant = Self::new(source.pet_id, source.level, source.element, stats);
        combatant.owner_id = source.owner_id;
        combatant.species_id = source.species_id;
        combatant.name = source.name.clone();
        combatant.skills = source.skills.iter().take(MAX_SKILLS).copied().collect();
        combatant.catch_rate = source.catch_rate;
        if let Some(hp) = source.hp {
            combatant.set_hp(hp);
        }
        for spec in &source.traits {
            let effect = effects.bind(spec.effect_id, &spec.args)?;
            combatant.add_passive(Arc::new(effect), None);
        }
        Ok(combatant)
    }

    /// Create a combatant at full HP with no skills
    pub fn new(pet_id: u64, level: u8, element: Element, stats: CoreStats) -> Self {
        Self {
            pet_id,
            owner_id: 0,
            species_id: 0,
            name: String::new(),
            level,
            element,
            hp: stats.max_hp,
            stats,
            skills: Vec::new(),
            status: StatusVector::new(),
            stages: StatStages::new(),
            flags: TransientFlags::default(),
            passives: Vec::new(),
            catch_rate: default_catch_rate(),
        }
    }

    /// Builder-style loadout setter (extra skills past four are dropped)
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillSlot>) -> Self {
        self.skills = skills.into_iter().take(MAX_SKILLS).collect();
        self
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.max_hp
    }

    /// Set HP, clamped to 0..=max_hp
    pub fn set_hp(&mut self, hp: u32) {
        self.hp = hp.min(self.stats.max_hp);
    }

    /// Remove HP, returns the amount actually lost
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restore HP, returns the amount actually gained. A fainted combatant gains nothing.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_fainted() {
            return 0;
        }
        let gained = amount.min(self.stats.max_hp - self.hp);
        self.hp += gained;
        gained
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.stats.max_hp == 0 {
            return 0.0;
        }
        self.hp as f64 / self.stats.max_hp as f64
    }

    /// Raw stat for a stage axis (accuracy has no raw value and reports 100)
    pub fn raw_stat(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Atk => self.stats.atk,
            Stat::Def => self.stats.def,
            Stat::SpAtk => self.stats.sp_atk,
            Stat::SpDef => self.stats.sp_def,
            Stat::Speed => self.stats.speed,
            Stat::Accuracy => 100,
        }
    }

    /// Stat after stage modifiers
    pub fn staged_stat(&self, stat: Stat) -> u32 {
        StatStages::apply(self.raw_stat(stat), self.stages.get(stat))
    }

    /// Speed after stages, halved while paralyzed
    pub fn effective_speed(&self) -> u32 {
        let speed = self.staged_stat(Stat::Speed);
        if self.status.is_active(StatusKind::Paralysis) {
            speed / 2
        } else {
            speed
        }
    }

    pub fn slot(&self, skill_id: u32) -> Option<&SkillSlot> {
        self.skills.iter().find(|s| s.skill_id == skill_id)
    }

    pub fn slot_mut(&mut self, skill_id: u32) -> Option<&mut SkillSlot> {
        self.skills.iter_mut().find(|s| s.skill_id == skill_id)
    }

    /// Skills that still have PP, in slot order
    pub fn usable_skills(&self) -> impl Iterator<Item = &SkillSlot> {
        self.skills.iter().filter(|s| s.has_pp())
    }

    /// Spend one PP of a skill; returns false if the skill is missing or empty
    pub fn spend_pp(&mut self, skill_id: u32) -> bool {
        match self.slot_mut(skill_id) {
            Some(slot) if slot.pp > 0 => {
                slot.pp -= 1;
                true
            }
            _ => false,
        }
    }

    /// Drop stages, transient flags and timed passives when leaving the field.
    /// The status-duration vector and permanent traits persist.
    pub fn on_switch_out(&mut self) {
        self.stages.clear();
        self.flags = TransientFlags::default();
        self.passives.retain(|p| p.turns_left.is_none());
    }

    /// Attach a passive, replacing any existing one from the same effect id
    pub fn add_passive(&mut self, effect: Arc<BoundEffect>, turns_left: Option<u8>) {
        self.passives.retain(|p| p.effect.effect_id != effect.effect_id);
        self.passives.push(Passive { effect, turns_left });
    }

    /// Age timed passives by one turn and drop the expired ones
    pub fn tick_passives(&mut self) {
        for passive in self.passives.iter_mut() {
            if let Some(turns) = passive.turns_left.as_mut() {
                *turns = turns.saturating_sub(1);
            }
        }
        self.passives.retain(|p| p.turns_left != Some(0));
    }
}
