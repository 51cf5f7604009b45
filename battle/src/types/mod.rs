//! Domain types for combatants and their battle state

mod combatant;
mod element;
mod nature;
mod party;
mod stats;
mod status;

pub use combatant::{
    Combatant, MAX_SKILLS, Passive, PetSource, SkillSlot, TraitSpec, TransientFlags,
};
pub use element::{ELEMENT_CHART, Element};
pub use nature::{NEUTRAL_NATURE, NatureStat, nature_multiplier, nature_name};
pub use party::Party;
pub use stats::{MAX_STAGE, MIN_STAGE, StatStages};
pub use status::{StatusKind, StatusVector};
