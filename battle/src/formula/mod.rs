//! Stat and damage engine: pure functions over plain numbers

mod checks;
mod damage;
mod stats;

pub use checks::{
    CRIT_DENOMINATOR, Contender, CritInput, SURE_HIT_ACCURACY, check_crit, check_hit,
    compare_speed, determine_first_move,
};
pub use damage::{
    CRIT_MULTIPLIER, DamageInput, DamageOptions, DamageOutcome, RANDOM_FACTOR_MAX,
    RANDOM_FACTOR_MIN, STAB_MULTIPLIER, compute_damage,
};
pub use stats::{
    BaseStats, CoreStats, DEFAULT_IV, EffortValues, MAX_EV, MAX_IV, MAX_LEVEL, MIN_LEVEL,
    compute_stats,
};
