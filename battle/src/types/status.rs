//! Status conditions and the per-combatant status-duration vector

use serde::{Deserialize, Serialize};
use skirmish_protocol::STATUS_SLOTS;

/// Status kinds, one per slot of the duration vector.
///
/// The discriminant is the slot index and the id used by skill configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum StatusKind {
    Paralysis = 0,
    Poison = 1,
    Burn = 2,
    Parasite = 3,
    Silence = 4,
    Freeze = 5,
    Fear = 6,
    Drowsy = 7,
    Sleep = 8,
    Petrify = 9,
    Confusion = 10,
    Weaken = 11,
    Guard = 12,
    Flammable = 13,
    Berserk = 14,
    IceSeal = 15,
    Bleed = 16,
    /// Negative stage changes are ignored while active
    StageGuard = 17,
    /// New statuses cannot be inflicted while active
    StatusImmune = 18,
    Blind = 19,
}

impl StatusKind {
    pub const ALL: [StatusKind; STATUS_SLOTS] = [
        StatusKind::Paralysis,
        StatusKind::Poison,
        StatusKind::Burn,
        StatusKind::Parasite,
        StatusKind::Silence,
        StatusKind::Freeze,
        StatusKind::Fear,
        StatusKind::Drowsy,
        StatusKind::Sleep,
        StatusKind::Petrify,
        StatusKind::Confusion,
        StatusKind::Weaken,
        StatusKind::Guard,
        StatusKind::Flammable,
        StatusKind::Berserk,
        StatusKind::IceSeal,
        StatusKind::Bleed,
        StatusKind::StageGuard,
        StatusKind::StatusImmune,
        StatusKind::Blind,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Max-HP divisor for start-of-turn damage, if this status deals any
    pub fn tick_damage_divisor(self) -> Option<u32> {
        match self {
            StatusKind::Poison | StatusKind::Bleed => Some(8),
            StatusKind::Burn | StatusKind::Freeze => Some(16),
            _ => None,
        }
    }

    /// Whether the action gate decrements this status
    pub fn gates_action(self) -> bool {
        matches!(
            self,
            StatusKind::Sleep
                | StatusKind::Petrify
                | StatusKind::IceSeal
                | StatusKind::Fear
                | StatusKind::Confusion
        )
    }

    /// Statuses whose counter nothing else decrements lose one turn at turn end
    pub fn decays_at_turn_end(self) -> bool {
        self.tick_damage_divisor().is_none() && !self.gates_action()
    }

    /// Protective statuses are not "ailments" for cleanse and status conditions
    pub fn is_ailment(self) -> bool {
        !matches!(
            self,
            StatusKind::Guard | StatusKind::StageGuard | StatusKind::StatusImmune
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Paralysis => "Paralysis",
            StatusKind::Poison => "Poison",
            StatusKind::Burn => "Burn",
            StatusKind::Parasite => "Parasite",
            StatusKind::Silence => "Silence",
            StatusKind::Freeze => "Freeze",
            StatusKind::Fear => "Fear",
            StatusKind::Drowsy => "Drowsy",
            StatusKind::Sleep => "Sleep",
            StatusKind::Petrify => "Petrify",
            StatusKind::Confusion => "Confusion",
            StatusKind::Weaken => "Weaken",
            StatusKind::Guard => "Guard",
            StatusKind::Flammable => "Flammable",
            StatusKind::Berserk => "Berserk",
            StatusKind::IceSeal => "Ice Seal",
            StatusKind::Bleed => "Bleed",
            StatusKind::StageGuard => "Stage Guard",
            StatusKind::StatusImmune => "Status Immune",
            StatusKind::Blind => "Blind",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remaining turns per status kind; 0 means inactive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusVector([u8; STATUS_SLOTS]);

impl StatusVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array(turns: [u8; STATUS_SLOTS]) -> Self {
        Self(turns)
    }

    pub fn turns(&self, kind: StatusKind) -> u8 {
        self.0[kind.index()]
    }

    pub fn is_active(&self, kind: StatusKind) -> bool {
        self.turns(kind) > 0
    }

    /// Set the duration outright (0 clears)
    pub fn set(&mut self, kind: StatusKind, turns: u8) {
        self.0[kind.index()] = turns;
    }

    /// Lower a counter by one, returns whether it was active before the call
    pub fn decrement(&mut self, kind: StatusKind) -> bool {
        let slot = &mut self.0[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn clear(&mut self, kind: StatusKind) {
        self.set(kind, 0);
    }

    /// Remove every ailment, keeping protective statuses
    pub fn clear_ailments(&mut self) {
        for kind in StatusKind::ALL.into_iter().filter(|k| k.is_ailment()) {
            self.clear(kind);
        }
    }

    pub fn any_active(&self) -> bool {
        self.0.iter().any(|t| *t > 0)
    }

    pub fn any_ailment(&self) -> bool {
        self.active().any(|k| k.is_ailment())
    }

    /// Iterate over active kinds in slot order
    pub fn active(&self) -> impl Iterator<Item = StatusKind> + '_ {
        StatusKind::ALL.into_iter().filter(|k| self.is_active(*k))
    }

    pub fn as_array(&self) -> [u8; STATUS_SLOTS] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ids_are_slots() {
        for (i, kind) in StatusKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(StatusKind::from_id(i as u8), Some(*kind));
        }
        assert_eq!(StatusKind::from_id(20), None);
    }

    #[test]
    fn test_tick_damage_divisors() {
        assert_eq!(StatusKind::Poison.tick_damage_divisor(), Some(8));
        assert_eq!(StatusKind::Bleed.tick_damage_divisor(), Some(8));
        assert_eq!(StatusKind::Burn.tick_damage_divisor(), Some(16));
        assert_eq!(StatusKind::Freeze.tick_damage_divisor(), Some(16));
        assert_eq!(StatusKind::Sleep.tick_damage_divisor(), None);
    }

    #[test]
    fn test_decay_classification() {
        assert!(StatusKind::Paralysis.decays_at_turn_end());
        assert!(StatusKind::Weaken.decays_at_turn_end());
        assert!(!StatusKind::Sleep.decays_at_turn_end());
        assert!(!StatusKind::Poison.decays_at_turn_end());
    }

    #[test]
    fn test_vector_decrement() {
        let mut status = StatusVector::new();
        assert!(!status.decrement(StatusKind::Sleep));

        status.set(StatusKind::Sleep, 2);
        assert!(status.decrement(StatusKind::Sleep));
        assert_eq!(status.turns(StatusKind::Sleep), 1);
        assert!(status.decrement(StatusKind::Sleep));
        assert!(!status.is_active(StatusKind::Sleep));
    }

    #[test]
    fn test_clear_ailments_keeps_guards() {
        let mut status = StatusVector::new();
        status.set(StatusKind::Burn, 3);
        status.set(StatusKind::StatusImmune, 2);
        status.clear_ailments();
        assert!(!status.is_active(StatusKind::Burn));
        assert!(status.is_active(StatusKind::StatusImmune));
        assert!(!status.any_ailment());
        assert!(status.any_active());
    }

    #[test]
    fn test_active_iterates_in_slot_order() {
        let mut status = StatusVector::new();
        status.set(StatusKind::Bleed, 1);
        status.set(StatusKind::Poison, 1);
        let active: Vec<_> = status.active().collect();
        assert_eq!(active, vec![StatusKind::Poison, StatusKind::Bleed]);
    }
}
