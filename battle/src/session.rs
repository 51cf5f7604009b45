//! Battle session state

use chrono::Utc;
use rand::Rng;
use skirmish_protocol::{EndReason, HpRecord, Side, TurnResult};
use tracing::info;

use crate::boss::BossFight;
use crate::effect::{AttackTally, EffectContext, Hook, apply_results};
use crate::error::BattleError;
use crate::types::{Combatant, Party};

/// What kind of challenge started the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleKind {
    Wild,
    Boss { boss_id: u32 },
    Pvp { opponent_id: u64 },
}

/// One battle between a player party and an enemy party
#[derive(Debug, Clone)]
pub struct BattleSession {
    pub owner_id: u64,
    pub kind: BattleKind,
    pub player: Party,
    pub enemy: Party,

    /// Completed turns
    turn: u32,
    started: bool,
    is_over: bool,
    winner: Option<Side>,
    reason: Option<EndReason>,

    /// Unix millis at creation; identifies the session for auxiliary maps
    started_at: i64,

    /// Map the battle is fought on, for scheduled bosses
    map_id: Option<u32>,

    /// The blow that last knocked out an enemy was a critical hit
    final_blow_crit: bool,
}

impl BattleSession {
    /// Create a session; both parties need at least one member
    pub fn new(
        owner_id: u64,
        kind: BattleKind,
        player: Party,
        enemy: Party,
    ) -> Result<Self, BattleError> {
        for (side, party) in [(Side::Player, &player), (Side::Enemy, &enemy)] {
            if party.members.is_empty() {
                return Err(BattleError::EmptyParty { side });
            }
        }
        Ok(Self {
            owner_id,
            kind,
            player,
            enemy,
            turn: 0,
            started: false,
            is_over: false,
            winner: None,
            reason: None,
            started_at: Utc::now().timestamp_millis(),
            map_id: None,
            final_blow_crit: false,
        })
    }

    pub fn wild(owner_id: u64, player: Party, wild: Combatant) -> Result<Self, BattleError> {
        Self::new(owner_id, BattleKind::Wild, player, Party::single(wild))
    }

    pub fn boss(
        owner_id: u64,
        boss_id: u32,
        player: Party,
        boss: Combatant,
    ) -> Result<Self, BattleError> {
        Self::new(
            owner_id,
            BattleKind::Boss { boss_id },
            player,
            Party::single(boss),
        )
    }

    pub fn pvp(
        owner_id: u64,
        opponent_id: u64,
        player: Party,
        enemy: Party,
    ) -> Result<Self, BattleError> {
        Self::new(owner_id, BattleKind::Pvp { opponent_id }, player, enemy)
    }

    /// Override the start timestamp (used as a map key by callers)
    pub fn with_started_at(mut self, millis: i64) -> Self {
        self.started_at = millis;
        self
    }

    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    pub fn with_map(mut self, map_id: u32) -> Self {
        self.map_id = Some(map_id);
        self
    }

    pub fn map_id(&self) -> Option<u32> {
        self.map_id
    }

    pub fn final_blow_crit(&self) -> bool {
        self.final_blow_crit
    }

    pub(crate) fn record_enemy_knockout(&mut self, crit: bool) {
        self.final_blow_crit = crit;
    }

    /// Completed turns so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn reason(&self) -> Option<EndReason> {
        self.reason
    }

    pub fn is_pvp(&self) -> bool {
        matches!(self.kind, BattleKind::Pvp { .. })
    }

    pub fn boss_id(&self) -> Option<u32> {
        match self.kind {
            BattleKind::Boss { boss_id } => Some(boss_id),
            _ => None,
        }
    }

    /// Key of this session's boss phase state
    pub fn boss_fight(&self) -> Option<BossFight> {
        self.boss_id().map(|boss_id| BossFight::new(boss_id, self.started_at))
    }

    /// Owner of a side's combatants
    pub fn owner_of(&self, side: Side) -> u64 {
        match (side, self.kind) {
            (Side::Player, _) => self.owner_id,
            (Side::Enemy, BattleKind::Pvp { opponent_id }) => opponent_id,
            (Side::Enemy, _) => 0,
        }
    }

    pub fn party(&self, side: Side) -> &Party {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn party_mut(&mut self, side: Side) -> &mut Party {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn active(&self, side: Side) -> &Combatant {
        self.party(side).active()
    }

    pub fn active_mut(&mut self, side: Side) -> &mut Combatant {
        self.party_mut(side).active_mut()
    }

    /// Both active combatants, `side` first
    pub fn pair(&self, side: Side) -> (&Combatant, &Combatant) {
        match side {
            Side::Player => (self.player.active(), self.enemy.active()),
            Side::Enemy => (self.enemy.active(), self.player.active()),
        }
    }

    /// Both active combatants mutably, `side` first
    pub fn pair_mut(&mut self, side: Side) -> (&mut Combatant, &mut Combatant) {
        match side {
            Side::Player => (self.player.active_mut(), self.enemy.active_mut()),
            Side::Enemy => (self.enemy.active_mut(), self.player.active_mut()),
        }
    }

    /// End the battle. One-way: later calls are ignored.
    pub fn finish(&mut self, winner: Option<Side>, reason: EndReason) {
        if self.is_over {
            return;
        }
        self.is_over = true;
        self.winner = winner;
        self.reason = Some(reason);
        info!(
            owner_id = self.owner_id,
            started_at = self.started_at,
            winner = ?winner,
            reason = ?reason,
            turns = self.turn,
            "battle over"
        );
    }

    /// The turn result reported for a session that has already ended
    pub fn over_result(&self) -> TurnResult {
        let mut result = TurnResult::new(self.turn);
        result.is_over = true;
        result.winner = self.winner;
        result.reason = self.reason;
        result
    }

    pub(crate) fn mark_started(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub(crate) fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// Count a turn in which neither side attacked (PVP switch turns)
    pub fn record_idle_turn(&mut self) -> TurnResult {
        let turn = self.advance_turn();
        TurnResult::new(turn)
    }

    /// Switch a side's active combatant. Validates before touching anything.
    pub fn switch_in<R: Rng + ?Sized>(
        &mut self,
        side: Side,
        slot: usize,
        rng: &mut R,
    ) -> Result<(), BattleError> {
        if self.is_over {
            return Err(BattleError::BattleOver);
        }
        self.party(side).validate_switch(slot)?;

        fire_side_hook(self, side, Hook::OnSwitchOut, rng);
        self.party_mut(side).switch_in(slot)?;
        fire_side_hook(self, side, Hook::OnSwitchIn, rng);
        Ok(())
    }

    /// A side whose active combatant fainted while healthy members remain
    pub fn pending_switch(&self) -> Option<Side> {
        Side::BOTH.into_iter().find(|side| {
            let party = self.party(*side);
            party.active().is_fainted() && party.has_reserve()
        })
    }

    /// Every party member's HP, for persistence after a switch or battle end
    pub fn hp_snapshot(&self) -> Vec<HpRecord> {
        let mut records = self.player.hp_records(Side::Player);
        records.extend(self.enemy.hp_records(Side::Enemy));
        records
    }
}

/// Fire a hook for the passives of one side's active combatant.
/// A fainted combatant's passives stay silent.
pub(crate) fn fire_side_hook<R: Rng + ?Sized>(
    session: &mut BattleSession,
    side: Side,
    hook: Hook,
    rng: &mut R,
) -> AttackTally {
    let mut tally = AttackTally::default();
    let results = {
        let (owner, foe) = session.pair(side);
        if owner.passives.is_empty() || owner.is_fainted() {
            return tally;
        }
        let effects: Vec<_> = owner.passives.iter().map(|p| p.effect.clone()).collect();
        let mut ctx = EffectContext::new(hook, owner, foe);
        let mut results = Vec::new();
        for effect in effects {
            results.extend(effect.fire(&mut ctx, rng));
        }
        results
    };
    let (owner, foe) = session.pair_mut(side);
    apply_results(owner, foe, results, &mut tally);
    tally
}
