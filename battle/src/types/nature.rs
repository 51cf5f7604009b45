//! Nature table: per-stat multipliers applied after level scaling

/// Nature id that leaves every stat unchanged
pub const NEUTRAL_NATURE: u8 = 21;

/// Multipliers for (atk, def, sp-atk, sp-def, speed), indexed by nature id - 1
#[rustfmt::skip]
static NATURE_TABLE: [[f64; 5]; 25] = [
    //  1 Lonely
    [1.1, 0.9, 1.0, 1.0, 1.0],
    //  2 Brave
    [1.1, 1.0, 1.0, 1.0, 0.9],
    //  3 Adamant
    [1.1, 1.0, 0.9, 1.0, 1.0],
    //  4 Naughty
    [1.1, 1.0, 1.0, 0.9, 1.0],
    //  5 Bold
    [0.9, 1.1, 1.0, 1.0, 1.0],
    //  6 Relaxed
    [1.0, 1.1, 1.0, 1.0, 0.9],
    //  7 Impish
    [1.0, 1.1, 0.9, 1.0, 1.0],
    //  8 Lax
    [1.0, 1.1, 1.0, 0.9, 1.0],
    //  9 Modest
    [0.9, 1.0, 1.1, 1.0, 1.0],
    // 10 Mild
    [1.0, 0.9, 1.1, 1.0, 1.0],
    // 11 Quiet
    [1.0, 1.0, 1.1, 1.0, 0.9],
    // 12 Rash
    [1.0, 1.0, 1.1, 0.9, 1.0],
    // 13 Calm
    [0.9, 1.0, 1.0, 1.1, 1.0],
    // 14 Gentle
    [1.0, 0.9, 1.0, 1.1, 1.0],
    // 15 Sassy
    [1.0, 1.0, 1.0, 1.1, 0.9],
    // 16 Careful
    [1.0, 1.0, 0.9, 1.1, 1.0],
    // 17 Timid
    [0.9, 1.0, 1.0, 1.0, 1.1],
    // 18 Hasty
    [1.0, 0.9, 1.0, 1.0, 1.1],
    // 19 Jolly
    [1.0, 1.0, 0.9, 1.0, 1.1],
    // 20 Naive
    [1.0, 1.0, 1.0, 0.9, 1.1],
    // 21 Hardy
    [1.0, 1.0, 1.0, 1.0, 1.0],
    // 22 Docile
    [1.0, 1.0, 1.0, 1.0, 1.0],
    // 23 Serious
    [1.0, 1.0, 1.0, 1.0, 1.0],
    // 24 Bashful
    [1.0, 1.0, 1.0, 1.0, 1.0],
    // 25 Quirky
    [1.0, 1.0, 1.0, 1.0, 1.0],
];

static NATURE_NAMES: [&str; 25] = [
    "Lonely",
    "Brave",
    "Adamant",
    "Naughty",
    "Bold",
    "Relaxed",
    "Impish",
    "Lax",
    "Modest",
    "Mild",
    "Quiet",
    "Rash",
    "Calm",
    "Gentle",
    "Sassy",
    "Careful",
    "Timid",
    "Hasty",
    "Jolly",
    "Naive",
    "Hardy",
    "Docile",
    "Serious",
    "Bashful",
    "Quirky",
];

/// Stat axes a nature can scale (HP is never scaled)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatureStat {
    Atk = 0,
    Def = 1,
    SpAtk = 2,
    SpDef = 3,
    Speed = 4,
}

/// Multiplier for a stat under a nature; unknown ids behave as neutral
pub fn nature_multiplier(nature_id: u8, stat: NatureStat) -> f64 {
    match nature_id {
        1..=25 => NATURE_TABLE[nature_id as usize - 1][stat as usize],
        _ => 1.0,
    }
}

pub fn nature_name(nature_id: u8) -> Option<&'static str> {
    match nature_id {
        1..=25 => Some(NATURE_NAMES[nature_id as usize - 1]),
        _ => None,
    }
}
