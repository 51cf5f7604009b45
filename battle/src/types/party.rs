//! One side's roster of combatants

use skirmish_protocol::{HpRecord, Side};

use super::combatant::Combatant;
use crate::error::BattleError;

/// A side's party: ordered roster plus the index of the active combatant
#[derive(Debug, Clone)]
pub struct Party {
    /// Combatants in party order
    pub members: Vec<Combatant>,

    /// Index of the combatant currently on the field
    active: usize,
}

impl Party {
    /// Create a party; the first healthy member starts active
    pub fn new(members: Vec<Combatant>) -> Self {
        let active = members.iter().position(|c| !c.is_fainted()).unwrap_or(0);
        Self { members, active }
    }

    /// A party of one (wild encounters, bosses)
    pub fn single(combatant: Combatant) -> Self {
        Self::new(vec![combatant])
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The combatant on the field.
    ///
    /// Panics only on an empty party, which `BattleSession::new` rejects.
    pub fn active(&self) -> &Combatant {
        &self.members[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        &mut self.members[self.active]
    }

    /// Iterate over bench members that can still fight
    pub fn bench(&self) -> impl Iterator<Item = (usize, &Combatant)> {
        let active = self.active;
        self.members
            .iter()
            .enumerate()
            .filter(move |(idx, c)| *idx != active && !c.is_fainted())
    }

    pub fn has_reserve(&self) -> bool {
        self.bench().next().is_some()
    }

    /// No member can fight
    pub fn is_defeated(&self) -> bool {
        self.members.iter().all(|c| c.is_fainted())
    }

    pub fn alive_count(&self) -> usize {
        self.members.iter().filter(|c| !c.is_fainted()).count()
    }

    /// Check that `slot` is a legal switch target without touching state
    pub fn validate_switch(&self, slot: usize) -> Result<(), BattleError> {
        let target = self
            .members
            .get(slot)
            .ok_or(BattleError::SwitchTargetMissing { slot })?;
        if slot == self.active {
            return Err(BattleError::SwitchTargetActive { slot });
        }
        if target.is_fainted() {
            return Err(BattleError::SwitchTargetFainted { slot });
        }
        Ok(())
    }

    /// Bring the member at `slot` onto the field
    pub fn switch_in(&mut self, slot: usize) -> Result<(), BattleError> {
        self.validate_switch(slot)?;
        self.members[self.active].on_switch_out();
        self.active = slot;
        Ok(())
    }

    /// HP of every member, for persisting back to pet records
    pub fn hp_records(&self, side: Side) -> Vec<HpRecord> {
        self.members
            .iter()
            .map(|c| HpRecord {
                side,
                pet_id: c.pet_id,
                hp: c.hp(),
                max_hp: c.max_hp(),
            })
            .collect()
    }
}
