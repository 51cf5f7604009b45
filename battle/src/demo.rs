//! A small built-in skill table for the simulator and tests

use crate::effect::EffectRegistry;
use crate::error::ConfigError;
use crate::skill::SkillBook;

/// Skill records in the same JSON shape a deployment would load
pub const DEMO_SKILLS_JSON: &str = r#"[
    {"id": 1,  "name": "Tackle",        "category": "physical", "element": "normal",   "power": 40, "maxPp": 35},
    {"id": 2,  "name": "Ember",         "category": "special",  "element": "fire",     "power": 40, "maxPp": 25,
     "sideEffect": 3, "sideEffectArg": "2 10 3"},
    {"id": 3,  "name": "Water Gun",     "category": "special",  "element": "water",    "power": 40, "maxPp": 25},
    {"id": 4,  "name": "Vine Whip",     "category": "physical", "element": "grass",    "power": 45, "maxPp": 25},
    {"id": 5,  "name": "Thunder Shock", "category": "special",  "element": "electric", "power": 40, "maxPp": 30,
     "sideEffect": 3, "sideEffectArg": "0 10 3"},
    {"id": 6,  "name": "Quick Strike",  "category": "physical", "element": "normal",   "power": 40, "maxPp": 30,
     "priority": 1},
    {"id": 7,  "name": "Leech Seed",    "category": "special",  "element": "grass",    "power": 40, "maxPp": 15,
     "sideEffect": 4, "sideEffectArg": "50"},
    {"id": 8,  "name": "Recover",       "category": "status",   "element": "normal",   "maxPp": 10,
     "sideEffect": 6, "sideEffectArg": "50"},
    {"id": 9,  "name": "Growl",         "category": "status",   "element": "normal",   "maxPp": 40,
     "sideEffect": 2, "sideEffectArg": "0 1"},
    {"id": 10, "name": "Sword Dance",   "category": "status",   "element": "normal",   "maxPp": 20,
     "sideEffect": 1, "sideEffectArg": "0 2"},
    {"id": 11, "name": "Double Slap",   "category": "physical", "element": "normal",   "power": 15, "accuracy": 85,
     "maxPp": 10, "sideEffect": 11, "sideEffectArg": "2 5"},
    {"id": 12, "name": "Bite",          "category": "physical", "element": "shadow",   "power": 60, "maxPp": 25,
     "sideEffect": 12, "sideEffectArg": "30"},
    {"id": 13, "name": "Wrap",          "category": "physical", "element": "normal",   "power": 15, "accuracy": 90,
     "maxPp": 20, "sideEffect": 13, "sideEffectArg": "4"},
    {"id": 14, "name": "Hyper Beam",    "category": "special",  "element": "normal",   "power": 150, "accuracy": 90,
     "maxPp": 5, "sideEffect": 14, "sideEffectArg": "1"},
    {"id": 15, "name": "Dragon Rage",   "category": "special",  "element": "dragon",   "maxPp": 10,
     "sideEffect": 7, "sideEffectArg": "40"},
    {"id": 16, "name": "Super Fang",    "category": "physical", "element": "normal",   "accuracy": 90, "maxPp": 10,
     "sideEffect": 8, "sideEffectArg": "50"},
    {"id": 17, "name": "Endeavor",      "category": "physical", "element": "normal",   "maxPp": 5,
     "sideEffect": 10},
    {"id": 18, "name": "Fissure",       "category": "physical", "element": "ground",   "accuracy": 30, "maxPp": 5,
     "sideEffect": 9, "sideEffectArg": "100"},
    {"id": 19, "name": "Hex",           "category": "special",  "element": "shadow",   "power": 65, "maxPp": 10,
     "sideEffect": 15, "sideEffectArg": "200"},
    {"id": 20, "name": "Swift Strike",  "category": "physical", "element": "flying",   "power": 50, "maxPp": 15,
     "sideEffect": 16, "sideEffectArg": "150"},
    {"id": 21, "name": "Reversal",      "category": "physical", "element": "fighting", "power": 40, "maxPp": 15,
     "sideEffect": 17, "sideEffectArg": "25 200"},
    {"id": 22, "name": "Refresh",       "category": "status",   "element": "normal",   "maxPp": 20,
     "sideEffect": 18},
    {"id": 23, "name": "Haze",          "category": "status",   "element": "ice",      "maxPp": 30,
     "sideEffect": 19},
    {"id": 24, "name": "Barrier",       "category": "status",   "element": "psychic",  "maxPp": 20,
     "sideEffect": 20, "sideEffectArg": "50 3"},
    {"id": 25, "name": "Mirror Coat",   "category": "status",   "element": "psychic",  "maxPp": 20,
     "sideEffect": 21, "sideEffectArg": "50 3"},
    {"id": 26, "name": "Encore",        "category": "status",   "element": "normal",   "maxPp": 5,
     "sideEffect": 22, "sideEffectArg": "3"},
    {"id": 27, "name": "Frost Breath",  "category": "special",  "element": "ice",      "power": 60, "accuracy": 90,
     "maxPp": 10, "sideEffect": 23},
    {"id": 28, "name": "Spite",         "category": "status",   "element": "shadow",   "maxPp": 10,
     "sideEffect": 24, "sideEffectArg": "4"},
    {"id": 29, "name": "Venom Mist",    "category": "status",   "element": "mystic",   "accuracy": 90, "maxPp": 10,
     "sideEffect": 3, "sideEffectArg": "1 100 4"},
    {"id": 30, "name": "Hypnosis",      "category": "status",   "element": "psychic",  "accuracy": 60, "maxPp": 20,
     "sideEffect": 3, "sideEffectArg": "8 100 3"},
    {"id": 31, "name": "Night Slash",   "category": "physical", "element": "shadow",   "power": 70, "maxPp": 15,
     "specialCrit": {"selfBelowHalf": true}},
    {"id": 32, "name": "Fell Stinger",  "category": "physical", "element": "fighting", "power": 50, "maxPp": 25,
     "sideEffect": 25, "sideEffectArg": "0 3"}
]"#;

/// Boss rules matching the demo skill table
pub const DEMO_BOSSES_JSON: &str = r#"[
    {"bossId": 900, "typeSequence": ["fire", "water", "grass"]},
    {"bossId": 901, "killCondition": {"breakSkill": 16, "finishSkill": 32, "finishSpecies": 7}},
    {"bossId": 902, "schedule": {"weekdays": [5, 6], "mapId": 12,
                                 "condition": {"kind": "withinRounds", "rounds": 10}}}
]"#;

/// Bind the demo table against a registry
pub fn demo_skill_book(registry: &EffectRegistry) -> Result<SkillBook, ConfigError> {
    SkillBook::from_json(DEMO_SKILLS_JSON, registry)
}
