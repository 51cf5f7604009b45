//! Per-boss rule definitions loaded from configuration

use std::collections::HashMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Element;

/// Break-then-finish kill requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillCondition {
    /// Skill that brings the boss to 1 HP and breaks it
    pub break_skill: u32,
    pub finish_skill: u32,

    /// Species that must land the finishing blow
    pub finish_species: u32,
}

/// Challenge requirement checked at battle end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "rounds")]
pub enum ChallengeCondition {
    /// The final blow was a critical hit
    CritKill,
    WithinRounds(u32),
    AfterRounds(u32),
}

/// Calendar gate for reward issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdaySchedule {
    /// Days counted from Monday = 0
    pub weekdays: Vec<u8>,
    pub map_id: u32,
    pub condition: ChallengeCondition,
}

impl WeekdaySchedule {
    pub fn is_open_on(&self, weekday: Weekday) -> bool {
        self.weekdays
            .iter()
            .any(|d| *d as u32 == weekday.num_days_from_monday())
    }
}

/// Rules opted into by one boss; each kind is independent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossRule {
    pub boss_id: u32,

    /// Required elements, in rotation order
    #[serde(default)]
    pub type_sequence: Vec<Element>,

    #[serde(default)]
    pub kill_condition: Option<KillCondition>,

    #[serde(default)]
    pub schedule: Option<WeekdaySchedule>,
}

impl BossRule {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBossRule {
            boss_id: self.boss_id,
            reason: reason.to_string(),
        };
        if let Some(kill) = &self.kill_condition {
            if kill.break_skill == kill.finish_skill {
                return Err(invalid("break and finish skills must differ"));
            }
        }
        if let Some(schedule) = &self.schedule {
            if schedule.weekdays.is_empty() {
                return Err(invalid("schedule has no weekdays"));
            }
            if schedule.weekdays.iter().any(|d| *d > 6) {
                return Err(invalid("weekday out of range 0..=6"));
            }
        }
        Ok(())
    }
}

/// Every boss rule keyed by boss id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BossRuleBook {
    rules: HashMap<u32, BossRule>,
}

impl BossRuleBook {
    pub fn new(rules: impl IntoIterator<Item = BossRule>) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for rule in rules {
            rule.validate()?;
            let boss_id = rule.boss_id;
            if map.insert(boss_id, rule).is_some() {
                return Err(ConfigError::InvalidBossRule {
                    boss_id,
                    reason: "defined twice".to_string(),
                });
            }
        }
        Ok(Self { rules: map })
    }

    /// Load a JSON array of boss rules
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: Vec<BossRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    pub fn get(&self, boss_id: u32) -> Option<&BossRule> {
        self.rules.get(&boss_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
