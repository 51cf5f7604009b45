//! Boss rule engine: per-boss phase state and damage gating

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Weekday;
use tracing::debug;

use super::rules::{BossRuleBook, ChallengeCondition};
use crate::types::Element;

/// Mutable phase of one boss fight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BossPhase {
    /// Index into the type rotation
    pub type_index: usize,

    /// The break skill has landed
    pub broken: bool,
}

/// One fight against a boss. Concurrent fights against the same boss keep
/// separate phase state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BossFight {
    pub boss_id: u32,

    /// Start timestamp of the owning session
    pub started_at: i64,
}

impl BossFight {
    pub fn new(boss_id: u32, started_at: i64) -> Self {
        Self {
            boss_id,
            started_at,
        }
    }
}

/// A hit about to land on a boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossHit {
    pub skill_id: u32,
    pub skill_element: Element,
    pub attacker_species: u32,
    pub damage: u32,
    pub boss_hp: u32,
}

/// Damage after the boss rules, with a note when a rule intervened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossVerdict {
    pub damage: u32,
    pub note: Option<String>,
}

/// How a boss battle ended, for the schedule check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossOutcome {
    pub weekday: Weekday,
    pub map_id: u32,
    pub rounds: u32,
    pub final_blow_crit: bool,
}

/// Applies boss rules. Owned by the session layer and passed into turns.
#[derive(Debug, Default)]
pub struct BossRuleEngine {
    book: Arc<BossRuleBook>,
    phases: HashMap<BossFight, BossPhase>,
}

impl BossRuleEngine {
    pub fn new(book: Arc<BossRuleBook>) -> Self {
        Self {
            book,
            phases: HashMap::new(),
        }
    }

    pub fn book(&self) -> &BossRuleBook {
        &self.book
    }

    /// Fresh phase state at battle start
    pub fn reset(&mut self, fight: BossFight) {
        self.phases.insert(fight, BossPhase::default());
    }

    /// Drop phase state once the battle ends
    pub fn clear(&mut self, fight: BossFight) {
        self.phases.remove(&fight);
    }

    pub fn phase(&self, fight: BossFight) -> Option<BossPhase> {
        self.phases.get(&fight).copied()
    }

    pub fn tracked(&self) -> usize {
        self.phases.len()
    }

    /// The element the rotation currently demands, if the boss has one
    pub fn required_element(&self, fight: BossFight) -> Option<Element> {
        let rule = self.book.get(fight.boss_id)?;
        if rule.type_sequence.is_empty() {
            return None;
        }
        let index = self.phases.get(&fight).map_or(0, |p| p.type_index);
        Some(rule.type_sequence[index % rule.type_sequence.len()])
    }

    /// Gate a hit on the boss through its type rotation and kill condition
    pub fn filter_damage(&mut self, fight: BossFight, hit: &BossHit) -> BossVerdict {
        let Some(rule) = self.book.get(fight.boss_id) else {
            return BossVerdict {
                damage: hit.damage,
                note: None,
            };
        };
        let phase = self.phases.entry(fight).or_default();
        let mut damage = hit.damage;
        let mut note = None;

        if !rule.type_sequence.is_empty() && damage > 0 {
            let required = rule.type_sequence[phase.type_index % rule.type_sequence.len()];
            if hit.skill_element == required {
                phase.type_index = (phase.type_index + 1) % rule.type_sequence.len();
            } else {
                debug!(boss_id = fight.boss_id, %required, used = %hit.skill_element, "type break rejected hit");
                damage = 0;
                note = Some(format!("Only {required} attacks can hurt it now"));
            }
        }

        if let Some(kill) = rule.kill_condition {
            let lethal = damage >= hit.boss_hp;
            let finishing =
                hit.skill_id == kill.finish_skill && hit.attacker_species == kill.finish_species;

            if !phase.broken {
                if hit.skill_id == kill.break_skill {
                    phase.broken = true;
                    if lethal {
                        damage = hit.boss_hp.saturating_sub(1);
                    }
                    note = Some("The boss is broken".to_string());
                } else if lethal {
                    damage = hit.boss_hp.saturating_sub(1);
                    note = Some("The boss endures the hit".to_string());
                }
            } else if hit.boss_hp <= 1 {
                if !finishing {
                    damage = 0;
                    note = Some("Only the chosen finisher can end this".to_string());
                }
            } else if lethal && !finishing {
                damage = hit.boss_hp - 1;
            }
        }

        BossVerdict { damage, note }
    }

    /// Whether a finished boss battle satisfied its weekday schedule.
    /// Bosses without a schedule always pass.
    pub fn validate_schedule(&self, boss_id: u32, outcome: &BossOutcome) -> bool {
        let Some(schedule) = self.book.get(boss_id).and_then(|r| r.schedule.as_ref()) else {
            return true;
        };
        if !schedule.is_open_on(outcome.weekday) || schedule.map_id != outcome.map_id {
            return false;
        }
        match schedule.condition {
            ChallengeCondition::CritKill => outcome.final_blow_crit,
            ChallengeCondition::WithinRounds(rounds) => outcome.rounds <= rounds,
            ChallengeCondition::AfterRounds(rounds) => outcome.rounds > rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::rules::{BossRule, KillCondition, WeekdaySchedule};

    fn engine() -> BossRuleEngine {
        let book = BossRuleBook::new([
            BossRule {
                boss_id: 1,
                type_sequence: vec![Element::Fire, Element::Water],
                kill_condition: None,
                schedule: None,
            },
            BossRule {
                boss_id: 2,
                type_sequence: Vec::new(),
                kill_condition: Some(KillCondition {
                    break_skill: 10,
                    finish_skill: 11,
                    finish_species: 300,
                }),
                schedule: None,
            },
            BossRule {
                boss_id: 3,
                type_sequence: Vec::new(),
                kill_condition: None,
                schedule: Some(WeekdaySchedule {
                    weekdays: vec![5, 6],
                    map_id: 40,
                    condition: ChallengeCondition::WithinRounds(5),
                }),
            },
        ])
        .unwrap();
        BossRuleEngine::new(Arc::new(book))
    }

    fn fight(boss_id: u32) -> BossFight {
        BossFight::new(boss_id, 1_000)
    }

    fn hit(skill_id: u32, element: Element, species: u32, damage: u32, hp: u32) -> BossHit {
        BossHit {
            skill_id,
            skill_element: element,
            attacker_species: species,
            damage,
            boss_hp: hp,
        }
    }

    #[test]
    fn test_type_rotation() {
        let mut engine = engine();
        engine.reset(fight(1));
        assert_eq!(engine.required_element(fight(1)), Some(Element::Fire));

        let wrong = engine.filter_damage(fight(1), &hit(1, Element::Water, 1, 50, 500));
        assert_eq!(wrong.damage, 0);
        assert!(wrong.note.is_some());
        assert_eq!(engine.required_element(fight(1)), Some(Element::Fire));

        let right = engine.filter_damage(fight(1), &hit(1, Element::Fire, 1, 50, 500));
        assert_eq!(right.damage, 50);
        assert_eq!(engine.required_element(fight(1)), Some(Element::Water));

        engine.filter_damage(fight(1), &hit(1, Element::Water, 1, 50, 450));
        assert_eq!(engine.required_element(fight(1)), Some(Element::Fire));
    }

    #[test]
    fn test_break_then_finish() {
        let mut engine = engine();
        engine.reset(fight(2));

        // Lethal damage before the break leaves the boss at 1 HP, unbroken
        let early = engine.filter_damage(fight(2), &hit(5, Element::Fire, 1, 999, 80));
        assert_eq!(early.damage, 79);
        assert!(!engine.phase(fight(2)).unwrap().broken);

        let breaking = engine.filter_damage(fight(2), &hit(10, Element::Fire, 1, 999, 1));
        assert_eq!(breaking.damage, 0);
        assert!(engine.phase(fight(2)).unwrap().broken);

        let wrong_pet = engine.filter_damage(fight(2), &hit(11, Element::Fire, 299, 50, 1));
        assert_eq!(wrong_pet.damage, 0);

        let finisher = engine.filter_damage(fight(2), &hit(11, Element::Fire, 300, 50, 1));
        assert_eq!(finisher.damage, 50);
    }

    #[test]
    fn test_reset_and_clear() {
        let mut engine = engine();
        engine.reset(fight(2));
        engine.filter_damage(fight(2), &hit(10, Element::Fire, 1, 999, 50));
        assert!(engine.phase(fight(2)).unwrap().broken);
        engine.reset(fight(2));
        assert!(!engine.phase(fight(2)).unwrap().broken);
        engine.clear(fight(2));
        assert_eq!(engine.tracked(), 0);
    }

    #[test]
    fn test_concurrent_fights_keep_separate_phases() {
        let mut engine = engine();
        let (first, second) = (BossFight::new(1, 1_000), BossFight::new(1, 2_000));
        engine.reset(first);
        engine.reset(second);

        engine.filter_damage(first, &hit(1, Element::Fire, 1, 50, 500));
        assert_eq!(engine.required_element(first), Some(Element::Water));
        assert_eq!(engine.required_element(second), Some(Element::Fire));

        engine.clear(first);
        assert_eq!(engine.phase(first), None);
        assert_eq!(engine.phase(second), Some(BossPhase::default()));
        assert_eq!(engine.tracked(), 1);
    }

    #[test]
    fn test_unknown_boss_passes_through() {
        let mut engine = engine();
        let verdict = engine.filter_damage(fight(99), &hit(1, Element::Ice, 1, 42, 10));
        assert_eq!(verdict.damage, 42);
        assert_eq!(engine.tracked(), 0);
    }

    #[test]
    fn test_schedule() {
        let engine = engine();
        let outcome = BossOutcome {
            weekday: Weekday::Sat,
            map_id: 40,
            rounds: 4,
            final_blow_crit: false,
        };
        assert!(engine.validate_schedule(3, &outcome));
        assert!(!engine.validate_schedule(
            3,
            &BossOutcome {
                weekday: Weekday::Tue,
                ..outcome
            }
        ));
        assert!(!engine.validate_schedule(3, &BossOutcome { map_id: 1, ..outcome }));
        assert!(!engine.validate_schedule(3, &BossOutcome { rounds: 6, ..outcome }));
        assert!(engine.validate_schedule(1, &outcome));
    }
}
