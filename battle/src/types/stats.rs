//! Stat stages and the stage multiplier table

use skirmish_protocol::{STAGE_AXES, Stat};

/// Lowest and highest legal stage
pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// (numerator, denominator) for stages -6..=+6
const STAGE_RATIOS: [(u32, u32); 13] = [
    (2, 8),
    (2, 7),
    (2, 6),
    (2, 5),
    (2, 4),
    (2, 3),
    (2, 2),
    (3, 2),
    (4, 2),
    (5, 2),
    (6, 2),
    (7, 2),
    (8, 2),
];

/// Stage modifiers for the six stat axes (-6 to +6)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatStages([i8; STAGE_AXES]);

impl StatStages {
    /// Create new stat stages (all at 0)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array(stages: [i8; STAGE_AXES]) -> Self {
        let mut out = Self::default();
        for (stat, value) in Stat::ALL.into_iter().zip(stages) {
            out.set(stat, value);
        }
        out
    }

    /// Get stage for a stat
    pub fn get(&self, stat: Stat) -> i8 {
        self.0[stat.index()]
    }

    /// Set stage for a stat (clamped to -6..+6)
    pub fn set(&mut self, stat: Stat, value: i8) {
        self.0[stat.index()] = value.clamp(MIN_STAGE, MAX_STAGE);
    }

    /// Add a signed delta to a stat, returns the change actually applied
    pub fn boost(&mut self, stat: Stat, delta: i8) -> i8 {
        let current = self.get(stat);
        let new_value = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        self.set(stat, new_value);
        new_value - current
    }

    /// Reset all stages to 0
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Reset only positive stages to 0
    pub fn clear_positive(&mut self) {
        for value in self.0.iter_mut().filter(|v| **v > 0) {
            *value = 0;
        }
    }

    /// Reset only negative stages to 0
    pub fn clear_negative(&mut self) {
        for value in self.0.iter_mut().filter(|v| **v < 0) {
            *value = 0;
        }
    }

    pub fn has_drops(&self) -> bool {
        self.0.iter().any(|v| *v < 0)
    }

    /// Check if all stats are at 0
    pub fn is_clear(&self) -> bool {
        self.0.iter().all(|v| *v == 0)
    }

    pub fn as_array(&self) -> [i8; STAGE_AXES] {
        self.0
    }

    /// Stat ratio for a stage: +k = (2+k)/2, -k = 2/(2+k)
    pub fn multiplier(stage: i8) -> f64 {
        let (num, den) = STAGE_RATIOS[(stage.clamp(MIN_STAGE, MAX_STAGE) + 6) as usize];
        num as f64 / den as f64
    }

    /// Apply a stage to a raw stat value, rounding down
    pub fn apply(base: u32, stage: i8) -> u32 {
        let (num, den) = STAGE_RATIOS[(stage.clamp(MIN_STAGE, MAX_STAGE) + 6) as usize];
        (base as u64 * num as u64 / den as u64) as u32
    }
}
