//! Damage formula

use rand::Rng;
use skirmish_protocol::Stat;

use super::stats::CoreStats;
use crate::skill::SkillCategory;
use crate::types::{Element, StatStages};

/// Same-type attack bonus
pub const STAB_MULTIPLIER: f64 = 1.5;
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const RANDOM_FACTOR_MIN: f64 = 0.85;
pub const RANDOM_FACTOR_MAX: f64 = 1.0;

/// Everything the formula reads from both combatants and the skill
#[derive(Debug, Clone, Copy)]
pub struct DamageInput<'a> {
    pub attacker: &'a CoreStats,
    pub defender: &'a CoreStats,
    pub attacker_element: Element,
    pub defender_element: Element,
    pub level: u8,
    pub power: u32,
    pub skill_element: Element,
    pub category: SkillCategory,
    pub attacker_stages: &'a StatStages,
    pub defender_stages: &'a StatStages,
}

/// Optional modifiers on top of the base formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOptions {
    pub is_crit: bool,

    /// Fixed random factor; rolled in [0.85, 1.0] when `None`
    pub random_factor: Option<f64>,
    pub seal_multiplier: f64,
    pub team_multiplier: f64,
    pub other_multiplier: f64,
}

impl Default for DamageOptions {
    fn default() -> Self {
        Self {
            is_crit: false,
            random_factor: None,
            seal_multiplier: 1.0,
            team_multiplier: 1.0,
            other_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u32,
    pub effectiveness: f64,
    pub is_crit: bool,
}

/// Compute the damage of one hit.
///
/// Status skills deal 0. Any other hit with positive power against a
/// non-immune defender deals at least 1.
pub fn compute_damage<R: Rng + ?Sized>(
    input: &DamageInput<'_>,
    opts: &DamageOptions,
    rng: &mut R,
) -> DamageOutcome {
    let effectiveness = input.skill_element.effectiveness(input.defender_element);

    if input.category == SkillCategory::Status || input.power == 0 {
        return DamageOutcome {
            damage: 0,
            effectiveness,
            is_crit: false,
        };
    }

    let (atk_stat, def_stat) = match input.category {
        SkillCategory::Special => (Stat::SpAtk, Stat::SpDef),
        _ => (Stat::Atk, Stat::Def),
    };
    let atk = StatStages::apply(
        raw_stat(input.attacker, atk_stat),
        input.attacker_stages.get(atk_stat),
    );
    let def = StatStages::apply(
        raw_stat(input.defender, def_stat),
        input.defender_stages.get(def_stat),
    )
    .max(1);

    let level = input.level as f64;
    let base = (level * 0.4 + 2.0) * input.power as f64 * atk as f64 / def as f64 / 50.0 + 2.0;

    let stab = if input.skill_element == input.attacker_element {
        STAB_MULTIPLIER
    } else {
        1.0
    };
    let crit = if opts.is_crit { CRIT_MULTIPLIER } else { 1.0 };
    let random = match opts.random_factor {
        Some(factor) => factor,
        None => rng.gen_range(RANDOM_FACTOR_MIN..=RANDOM_FACTOR_MAX),
    };

    let total = base
        * effectiveness
        * stab
        * crit
        * random
        * opts.seal_multiplier
        * opts.team_multiplier
        * opts.other_multiplier;

    let damage = if effectiveness == 0.0 {
        0
    } else {
        (total.floor() as u32).max(1)
    };

    DamageOutcome {
        damage,
        effectiveness,
        is_crit: opts.is_crit,
    }
}

fn raw_stat(stats: &CoreStats, stat: Stat) -> u32 {
    match stat {
        Stat::Atk => stats.atk,
        Stat::Def => stats.def,
        Stat::SpAtk => stats.sp_atk,
        Stat::SpDef => stats.sp_def,
        Stat::Speed => stats.speed,
        Stat::Accuracy => 100,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn stats(atk: u32, def: u32) -> CoreStats {
        CoreStats {
            max_hp: 150,
            atk,
            def,
            sp_atk: atk,
            sp_def: def,
            speed: 80,
        }
    }

    fn input<'a>(
        attacker: &'a CoreStats,
        defender: &'a CoreStats,
        stages: &'a StatStages,
        skill_element: Element,
        defender_element: Element,
        category: SkillCategory,
        power: u32,
    ) -> DamageInput<'a> {
        DamageInput {
            attacker,
            defender,
            attacker_element: Element::Fire,
            defender_element,
            level: 50,
            power,
            skill_element,
            category,
            attacker_stages: stages,
            defender_stages: stages,
        }
    }

    fn fixed() -> DamageOptions {
        DamageOptions {
            random_factor: Some(1.0),
            ..DamageOptions::default()
        }
    }

    #[test]
    fn test_golden_same_type_hit() {
        // (50*0.4+2) * 40 * 120/100 / 50 + 2 = 23.12, x1.5 same-type = 34.68
        let attacker = stats(120, 100);
        let defender = stats(100, 100);
        let stages = StatStages::new();
        let input = input(
            &attacker,
            &defender,
            &stages,
            Element::Fire,
            Element::Normal,
            SkillCategory::Physical,
            40,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = compute_damage(&input, &fixed(), &mut rng);
        assert_eq!(outcome.damage, 34);
        assert_eq!(outcome.effectiveness, 1.0);
        assert!(!outcome.is_crit);
    }

    #[test]
    fn test_crit_and_effectiveness() {
        let attacker = stats(120, 100);
        let defender = stats(100, 100);
        let stages = StatStages::new();
        let input = input(
            &attacker,
            &defender,
            &stages,
            Element::Fire,
            Element::Grass,
            SkillCategory::Physical,
            40,
        );
        let opts = DamageOptions {
            is_crit: true,
            ..fixed()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = compute_damage(&input, &opts, &mut rng);
        // 23.12 * 2.0 * 1.5 * 1.5 = 104.04
        assert_eq!(outcome.damage, 104);
        assert_eq!(outcome.effectiveness, 2.0);
        assert!(outcome.is_crit);
    }

    #[test]
    fn test_status_skill_deals_nothing() {
        let attacker = stats(120, 100);
        let defender = stats(100, 100);
        let stages = StatStages::new();
        let input = input(
            &attacker,
            &defender,
            &stages,
            Element::Fire,
            Element::Normal,
            SkillCategory::Status,
            90,
        );
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(compute_damage(&input, &fixed(), &mut rng).damage, 0);
    }

    #[test]
    fn test_immune_deals_zero() {
        let attacker = stats(120, 100);
        let defender = stats(100, 100);
        let stages = StatStages::new();
        let input = input(
            &attacker,
            &defender,
            &stages,
            Element::Electric,
            Element::Ground,
            SkillCategory::Special,
            90,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = compute_damage(&input, &fixed(), &mut rng);
        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.effectiveness, 0.0);
    }

    #[test]
    fn test_minimum_one_damage() {
        let mut rng = StdRng::seed_from_u64(7);
        let stages = StatStages::new();
        for level in [1u8, 50, 100] {
            for (atk, def) in [(1, 999), (5, 400), (300, 1)] {
                let attacker = stats(atk, def);
                let defender = stats(atk, def);
                let input = DamageInput {
                    level,
                    ..input(
                        &attacker,
                        &defender,
                        &stages,
                        Element::Water,
                        Element::Water,
                        SkillCategory::Special,
                        1,
                    )
                };
                let outcome = compute_damage(&input, &DamageOptions::default(), &mut rng);
                assert!(outcome.damage >= 1, "level {level} atk {atk} def {def}");
            }
        }
    }

    #[test]
    fn test_stages_shift_damage() {
        let attacker = stats(120, 100);
        let defender = stats(100, 100);
        let neutral = StatStages::new();
        let mut boosted = StatStages::new();
        boosted.set(Stat::Atk, 2);

        let mut rng = StdRng::seed_from_u64(1);
        let base = input(
            &attacker,
            &defender,
            &neutral,
            Element::Normal,
            Element::Normal,
            SkillCategory::Physical,
            80,
        );
        let plain = compute_damage(&base, &fixed(), &mut rng).damage;
        let raised = DamageInput {
            attacker_stages: &boosted,
            ..base
        };
        assert!(compute_damage(&raised, &fixed(), &mut rng).damage > plain);
    }

    #[test]
    fn test_random_factor_range() {
        let attacker = stats(120, 100);
        let defender = stats(100, 100);
        let stages = StatStages::new();
        let input = input(
            &attacker,
            &defender,
            &stages,
            Element::Normal,
            Element::Normal,
            SkillCategory::Physical,
            100,
        );
        let mut rng = StdRng::seed_from_u64(99);
        let max = compute_damage(&input, &fixed(), &mut rng).damage;
        for _ in 0..200 {
            let rolled = compute_damage(&input, &DamageOptions::default(), &mut rng).damage;
            assert!(rolled <= max);
            assert!(rolled as f64 >= (max as f64 * 0.85).floor() - 1.0);
        }
    }
}
