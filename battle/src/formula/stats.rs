//! Derived stats from base stats, level, individual and effort values

use serde::{Deserialize, Serialize};

use crate::types::{NatureStat, nature_multiplier};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;
pub const DEFAULT_IV: u8 = 31;
pub const MAX_IV: u8 = 31;
pub const MAX_EV: u16 = 255;

/// Species base stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub sp_atk: u32,
    pub sp_def: u32,
    pub speed: u32,
}

/// Per-stat effort values (each capped at 255)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffortValues {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub sp_atk: u16,
    pub sp_def: u16,
    pub speed: u16,
}

/// Final battle stats of a combatant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreStats {
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub sp_atk: u32,
    pub sp_def: u32,
    pub speed: u32,
}

fn growth(base: u32, iv: u32, ev: u16, level: u32) -> u32 {
    let ev = ev.min(MAX_EV) as u32;
    (2 * base + iv + ev / 4) * level / 100
}

fn other_stat(base: u32, iv: u32, ev: u16, level: u32, nature_id: u8, stat: NatureStat) -> u32 {
    let raw = growth(base, iv, ev, level) + 5;
    // natures are whole tenths, so scale in integers to keep the floor exact
    let tenths = (nature_multiplier(nature_id, stat) * 10.0).round() as u32;
    raw * tenths / 10
}

/// Compute final stats.
///
/// Level is clamped to 1..=100 and the individual value to 0..=31 (default 31).
pub fn compute_stats(
    base: &BaseStats,
    level: u8,
    individual_value: Option<u8>,
    effort: &EffortValues,
    nature_id: u8,
) -> CoreStats {
    let level = level.clamp(MIN_LEVEL, MAX_LEVEL) as u32;
    let iv = individual_value.unwrap_or(DEFAULT_IV).min(MAX_IV) as u32;

    CoreStats {
        max_hp: growth(base.hp, iv, effort.hp, level) + level + 10,
        atk: other_stat(base.atk, iv, effort.atk, level, nature_id, NatureStat::Atk),
        def: other_stat(base.def, iv, effort.def, level, nature_id, NatureStat::Def),
        sp_atk: other_stat(base.sp_atk, iv, effort.sp_atk, level, nature_id, NatureStat::SpAtk),
        sp_def: other_stat(base.sp_def, iv, effort.sp_def, level, nature_id, NatureStat::SpDef),
        speed: other_stat(base.speed, iv, effort.speed, level, nature_id, NatureStat::Speed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NEUTRAL_NATURE;

    fn sample_base() -> BaseStats {
        BaseStats {
            hp: 80,
            atk: 82,
            def: 83,
            sp_atk: 100,
            sp_def: 100,
            speed: 80,
        }
    }

    #[test]
    fn test_known_values_level_50() {
        let stats = compute_stats(
            &sample_base(),
            50,
            None,
            &EffortValues::default(),
            NEUTRAL_NATURE,
        );
        // (160 + 31) * 50 / 100 = 95
        assert_eq!(stats.max_hp, 95 + 50 + 10);
        // (164 + 31) * 50 / 100 = 97, + 5
        assert_eq!(stats.atk, 102);
        assert_eq!(stats.sp_atk, (231 * 50 / 100) + 5);
    }

    #[test]
    fn test_nature_applies_after_scaling() {
        let neutral = compute_stats(&sample_base(), 100, Some(31), &EffortValues::default(), 21);
        let adamant = compute_stats(&sample_base(), 100, Some(31), &EffortValues::default(), 3);
        assert_eq!(adamant.atk, neutral.atk * 11 / 10);
        assert_eq!(adamant.sp_atk, neutral.sp_atk * 9 / 10);
        assert_eq!(adamant.max_hp, neutral.max_hp);
    }

    #[test]
    fn test_level_is_clamped() {
        let zero = compute_stats(&sample_base(), 0, None, &EffortValues::default(), 21);
        let one = compute_stats(&sample_base(), 1, None, &EffortValues::default(), 21);
        assert_eq!(zero, one);

        let over = compute_stats(&sample_base(), 200, None, &EffortValues::default(), 21);
        let max = compute_stats(&sample_base(), 100, None, &EffortValues::default(), 21);
        assert_eq!(over, max);
    }

    #[test]
    fn test_hp_monotonic_in_level() {
        for base_hp in [1, 45, 100, 255] {
            let base = BaseStats {
                hp: base_hp,
                ..sample_base()
            };
            let mut previous = 0;
            for level in 1..=100 {
                let hp = compute_stats(&base, level, None, &EffortValues::default(), 21).max_hp;
                assert!(hp >= previous, "base {} level {}", base_hp, level);
                previous = hp;
            }
        }
    }

    #[test]
    fn test_hp_monotonic_in_effort() {
        let mut previous = 0;
        for ev in 0..=300u16 {
            let effort = EffortValues {
                hp: ev,
                ..Default::default()
            };
            let hp = compute_stats(&sample_base(), 70, None, &effort, 21).max_hp;
            assert!(hp >= previous);
            previous = hp;
        }
    }
}
