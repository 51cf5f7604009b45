//! A PVP room: the shared session plus the turn rendezvous

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use skirmish_battle::capture::CaptureRefusal;
use skirmish_battle::turn::resolve_choice;
use skirmish_battle::{BattleError, BattleSession, Party, SkillLookup, TurnEnv, execute_turn};
use skirmish_protocol::{EndReason, EscapeRefusal, PlayerAction, Side, TurnResult};
use tracing::{debug, warn};

use crate::error::ServerError;

/// Outcome of offering one side's action to the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Stored; the other side has not acted yet
    Waiting,

    /// This side already has an action queued; the new one was dropped
    Duplicate,

    /// Both actions are in, indexed by `Side::index`. Both slots are now empty.
    Ready([PlayerAction; 2]),
}

/// Two action slots, one per side
#[derive(Debug, Default, Clone)]
pub struct TurnSynchronizer {
    slots: [Option<PlayerAction>; 2],
}

impl TurnSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, side: Side, action: PlayerAction) -> Submission {
        let slot = &mut self.slots[side.index()];
        if slot.is_some() {
            return Submission::Duplicate;
        }
        *slot = Some(action);

        match self.slots {
            [Some(player), Some(enemy)] => {
                self.slots = [None, None];
                Submission::Ready([player, enemy])
            }
            _ => Submission::Waiting,
        }
    }

    pub fn pending(&self, side: Side) -> Option<PlayerAction> {
        self.slots[side.index()]
    }

    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }
}

/// What a turn's rendezvous produced
#[derive(Debug, Clone, PartialEq)]
pub struct RoomTurn {
    /// Switches applied before anything else, in side order
    pub switches: Vec<(Side, usize)>,

    /// `None` when both sides switched and the turn was skipped
    pub result: Option<TurnResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomUpdate {
    Waiting,

    /// A side replaced a fainted combatant outside the rendezvous
    ForcedSwitch { side: Side, slot: usize },

    Resolved(RoomTurn),
}

#[derive(Debug)]
pub struct Room {
    pub id: u64,

    /// User ids indexed by `Side::index`; the inviter holds `Player`
    players: [u64; 2],
    session: BattleSession,
    sync: TurnSynchronizer,
    created_at: DateTime<Utc>,
}

impl Room {
    pub fn open(
        id: u64,
        inviter: (u64, Party),
        invitee: (u64, Party),
        created_at: DateTime<Utc>,
    ) -> Result<Self, ServerError> {
        let session = BattleSession::pvp(inviter.0, invitee.0, inviter.1, invitee.1)?;
        Ok(Self {
            id,
            players: [inviter.0, invitee.0],
            session,
            sync: TurnSynchronizer::new(),
            created_at,
        })
    }

    pub fn players(&self) -> [u64; 2] {
        self.players
    }

    pub fn user(&self, side: Side) -> u64 {
        self.players[side.index()]
    }

    pub fn side_of(&self, user: u64) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.players[side.index()] == user)
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn sync(&self) -> &TurnSynchronizer {
        &self.sync
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }

    /// The winning user, once the battle is over
    pub fn winner(&self) -> Option<u64> {
        self.session.winner().map(|side| self.user(side))
    }

    /// Offer a user's action for the current turn.
    ///
    /// Invalid actions are rejected before they reach a slot. The turn is
    /// resolved as soon as the second side's action arrives.
    pub fn submit<R: Rng + ?Sized>(
        &mut self,
        user: u64,
        action: PlayerAction,
        skills: &dyn SkillLookup,
        rng: &mut R,
    ) -> Result<RoomUpdate, ServerError> {
        let side = self.side_of(user).ok_or(ServerError::NotInRoom(user))?;
        if self.session.is_over() {
            return Err(BattleError::BattleOver.into());
        }

        if self.session.pending_switch() == Some(side) {
            let PlayerAction::Switch { slot } = action else {
                return Err(BattleError::MustSwitch { side }.into());
            };
            self.session.switch_in(side, slot, rng)?;
            debug!(room_id = self.id, %side, slot, "forced switch");
            return Ok(RoomUpdate::ForcedSwitch { side, slot });
        }

        self.validate(side, action, skills)?;

        match self.sync.submit(side, action) {
            Submission::Duplicate => Err(ServerError::ActionAlreadySubmitted(user)),
            Submission::Waiting => Ok(RoomUpdate::Waiting),
            Submission::Ready(actions) => self.resolve(actions, skills, rng).map(RoomUpdate::Resolved),
        }
    }

    fn validate(
        &self,
        side: Side,
        action: PlayerAction,
        skills: &dyn SkillLookup,
    ) -> Result<(), BattleError> {
        match action {
            PlayerAction::UseSkill { skill_id } => {
                resolve_choice(self.session.active(side), skill_id, skills).map(|_| ())
            }
            PlayerAction::Switch { slot } => self.session.party(side).validate_switch(slot),
            PlayerAction::Capture { .. } => {
                Err(BattleError::CaptureRefused(CaptureRefusal::PvpBattle))
            }
            PlayerAction::Escape => Err(BattleError::EscapeRefused(EscapeRefusal::PvpBattle)),
        }
    }

    fn resolve<R: Rng + ?Sized>(
        &mut self,
        actions: [PlayerAction; 2],
        skills: &dyn SkillLookup,
        rng: &mut R,
    ) -> Result<RoomTurn, ServerError> {
        let mut switches = Vec::new();
        for side in Side::BOTH {
            if let PlayerAction::Switch { slot } = actions[side.index()] {
                self.session.switch_in(side, slot, rng)?;
                switches.push((side, slot));
            }
        }

        let result = match (actions[0], actions[1]) {
            (
                PlayerAction::UseSkill { skill_id: player },
                PlayerAction::UseSkill { skill_id: enemy },
            ) => {
                let mut env = TurnEnv::new(skills, rng);
                let turn = execute_turn(&mut self.session, player, Some(enemy), &mut env);
                if let Err(err) = &turn {
                    warn!(room_id = self.id, %err, "turn rejected after rendezvous");
                }
                Some(turn?)
            }
            _ if switches.len() == 2 => None,
            _ => Some(self.session.record_idle_turn()),
        };

        debug!(room_id = self.id, switches = switches.len(), turn = ?result.as_ref().map(|r| r.turn), "turn resolved");
        Ok(RoomTurn { switches, result })
    }

    /// End the battle in the other side's favour
    pub fn forfeit(&mut self, user: u64) -> Result<(), ServerError> {
        let side = self.side_of(user).ok_or(ServerError::NotInRoom(user))?;
        self.sync.clear();
        self.session.finish(Some(side.opponent()), EndReason::Forfeit);
        Ok(())
    }
}
