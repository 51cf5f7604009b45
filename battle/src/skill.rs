//! Skill definitions and the skill table

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::effect::{BoundEffect, EffectRegistry};
use crate::error::ConfigError;
use crate::types::Element;

/// Id of the built-in fallback attack
pub const BASIC_ATTACK_ID: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Physical,
    Special,
    Status,
}

/// Always-crit predicates, checked in field order before the crit roll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialCrit {
    pub first_strike: bool,
    pub second_strike: bool,
    pub self_below_half: bool,
    pub foe_below_half: bool,
}

/// A skill as stored in the skill table (before its side effect is bound)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub category: SkillCategory,
    pub element: Element,
    #[serde(default)]
    pub power: u32,
    #[serde(default = "default_accuracy")]
    pub accuracy: u32,
    #[serde(default)]
    pub priority: i8,
    pub max_pp: u8,
    #[serde(default = "default_crit_rate")]
    pub crit_rate: u32,
    #[serde(default)]
    pub side_effect: Option<u32>,
    #[serde(default)]
    pub side_effect_arg: String,
    #[serde(default)]
    pub special_crit: SpecialCrit,
}

fn default_accuracy() -> u32 {
    100
}

fn default_crit_rate() -> u32 {
    1
}

/// A fully resolved skill: static stats plus its bound side effect
#[derive(Debug, Clone)]
pub struct SkillDefinition {
    pub id: u32,
    pub name: String,
    pub category: SkillCategory,
    pub element: Element,
    pub power: u32,
    pub accuracy: u32,
    pub priority: i8,
    pub max_pp: u8,

    /// Base crit rate in sixteenths
    pub crit_rate: u32,
    pub special_crit: SpecialCrit,
    pub side_effect: Option<u32>,
    pub side_effect_arg: String,
    pub effect: Option<Arc<BoundEffect>>,
}

static BASIC_ATTACK: LazyLock<SkillDefinition> = LazyLock::new(|| SkillDefinition {
    id: BASIC_ATTACK_ID,
    name: "Basic Attack".to_string(),
    category: SkillCategory::Physical,
    element: Element::Normal,
    power: 40,
    accuracy: 100,
    priority: 0,
    max_pp: u8::MAX,
    crit_rate: 1,
    special_crit: SpecialCrit::default(),
    side_effect: None,
    side_effect_arg: String::new(),
    effect: None,
});

impl SkillDefinition {
    /// The generic attack substituted for missing skill configuration
    pub fn basic_attack() -> &'static SkillDefinition {
        &BASIC_ATTACK
    }

    /// Bind a record's side effect through the registry
    pub fn from_record(record: SkillRecord, registry: &EffectRegistry) -> Result<Self, ConfigError> {
        let effect = match record.side_effect {
            Some(effect_id) if effect_id != 0 => {
                if !registry.contains(effect_id) {
                    return Err(ConfigError::UnknownEffect {
                        skill_id: record.id,
                        effect_id,
                    });
                }
                let bound = registry.bind(effect_id, &record.side_effect_arg)?;
                if !bound.fires_in_attack() {
                    return Err(ConfigError::TraitOnlyEffect {
                        skill_id: record.id,
                        effect_id,
                    });
                }
                Some(Arc::new(bound))
            }
            _ => None,
        };

        Ok(Self {
            id: record.id,
            name: record.name,
            category: record.category,
            element: record.element,
            power: record.power,
            accuracy: record.accuracy,
            priority: record.priority,
            max_pp: record.max_pp,
            crit_rate: record.crit_rate,
            special_crit: record.special_crit,
            side_effect: record.side_effect,
            side_effect_arg: record.side_effect_arg,
            effect,
        })
    }

    pub fn is_damaging(&self) -> bool {
        self.category != SkillCategory::Status
    }

    /// Heals its user (self heal or lifesteal), used by the AI when low on HP
    pub fn is_self_heal(&self) -> bool {
        self.effect.as_ref().is_some_and(|e| e.self_heal)
    }
}

/// Read-only skill lookup the battle core consumes
pub trait SkillLookup {
    fn skill(&self, id: u32) -> Option<&SkillDefinition>;

    /// Look a skill up, substituting the basic attack when configuration is missing
    fn skill_or_basic(&self, id: u32) -> &SkillDefinition {
        match self.skill(id) {
            Some(skill) => skill,
            None => {
                if id != BASIC_ATTACK_ID {
                    warn!(skill_id = id, "skill missing from skill table, using basic attack");
                }
                SkillDefinition::basic_attack()
            }
        }
    }
}

/// In-memory skill table keyed by id
#[derive(Debug, Clone, Default)]
pub struct SkillBook {
    skills: HashMap<u32, SkillDefinition>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every record; fails on the first bad side effect or duplicate id
    pub fn from_records(
        records: impl IntoIterator<Item = SkillRecord>,
        registry: &EffectRegistry,
    ) -> Result<Self, ConfigError> {
        let mut book = Self::new();
        for record in records {
            let id = record.id;
            let skill = SkillDefinition::from_record(record, registry)?;
            if book.skills.insert(id, skill).is_some() {
                return Err(ConfigError::DuplicateSkill(id));
            }
        }
        Ok(book)
    }

    /// Load a JSON array of skill records
    pub fn from_json(json: &str, registry: &EffectRegistry) -> Result<Self, ConfigError> {
        let records: Vec<SkillRecord> = serde_json::from_str(json)?;
        Self::from_records(records, registry)
    }

    pub fn insert(&mut self, skill: SkillDefinition) {
        self.skills.insert(skill.id, skill);
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Every skill id, ascending
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.skills.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl SkillLookup for SkillBook {
    fn skill(&self, id: u32) -> Option<&SkillDefinition> {
        self.skills.get(&id)
    }
}
