//! PVP invites, rooms and event delivery

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use skirmish_battle::{Party, SkillBook};
use skirmish_protocol::{EndReason, HpRecord, PlayerAction, Side, TurnResult};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::invite::{Invite, InviteBook};
use super::room::{Room, RoomTurn, RoomUpdate};
use crate::config::ArenaConfig;
use crate::error::ServerError;

/// Everything a connected PVP user can be told
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PvpEvent {
    Invited { from: u64 },
    InviteDeclined { by: u64 },
    InviteWithdrawn { from: u64, to: u64 },
    InviteExpired { from: u64, to: u64 },
    RoomOpened { room_id: u64, side: Side, opponent: u64 },

    /// The opponent has locked in an action for this turn
    OpponentReady { room_id: u64 },
    Switched { room_id: u64, side: Side, slot: usize, hp: Vec<HpRecord> },
    Turn { room_id: u64, result: TurnResult },
    BattleEnded {
        room_id: u64,
        winner: Option<u64>,
        reason: EndReason,
        final_hp: Vec<HpRecord>,
    },

    /// The room outlived its TTL and was discarded without a result
    RoomClosed { room_id: u64 },
}

/// What one sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub invites: usize,
    pub rooms: usize,
}

/// Owns every invite and room; one writer at a time
#[derive(Debug)]
pub struct PvpHub {
    config: ArenaConfig,
    skills: Arc<SkillBook>,
    invites: InviteBook,
    rooms: HashMap<u64, Room>,

    /// User id to the room they sit in
    seats: HashMap<u64, u64>,
    subscribers: HashMap<u64, mpsc::UnboundedSender<PvpEvent>>,
    next_room_id: u64,
}

impl PvpHub {
    pub fn new(skills: Arc<SkillBook>, config: ArenaConfig) -> Self {
        Self {
            config,
            skills,
            invites: InviteBook::new(),
            rooms: HashMap::new(),
            seats: HashMap::new(),
            subscribers: HashMap::new(),
            next_room_id: 1,
        }
    }

    /// Register a user's event stream, replacing any earlier one
    pub fn connect(&mut self, user: u64) -> mpsc::UnboundedReceiver<PvpEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(user, tx);
        rx
    }

    pub fn is_seated(&self, user: u64) -> bool {
        self.seats.contains_key(&user)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn invite_count(&self) -> usize {
        self.invites.len()
    }

    pub fn invite(
        &mut self,
        from: u64,
        to: u64,
        party: Party,
        now: DateTime<Utc>,
    ) -> Result<(), ServerError> {
        if self.is_seated(from) {
            return Err(ServerError::AlreadyInBattle(from));
        }
        self.invites.issue(Invite::new(from, to, party, now));
        debug!(from, to, "invite issued");
        self.notify(to, PvpEvent::Invited { from });
        Ok(())
    }

    pub fn decline(&mut self, to: u64, from: u64, now: DateTime<Utc>) -> Result<(), ServerError> {
        self.invites.take(from, to, now, self.config.invite_ttl())?;
        self.notify(from, PvpEvent::InviteDeclined { by: to });
        Ok(())
    }

    /// Accept an invite and open a room. The inviter plays the `Player` side.
    pub fn accept(
        &mut self,
        to: u64,
        from: u64,
        party: Party,
        now: DateTime<Utc>,
    ) -> Result<u64, ServerError> {
        for user in [from, to] {
            if self.is_seated(user) {
                return Err(ServerError::AlreadyInBattle(user));
            }
        }
        if !self.invites.contains(from, to) {
            return Err(ServerError::InviteNotFound { from, to });
        }

        let room_id = self.next_room_id;
        let invite = self.invites.take(from, to, now, self.config.invite_ttl())?;
        let room = Room::open(room_id, (from, invite.party), (to, party), now)?;
        self.next_room_id += 1;

        self.rooms.insert(room_id, room);
        self.seats.insert(from, room_id);
        self.seats.insert(to, room_id);
        info!(room_id, from, to, "pvp room opened");

        self.notify(
            from,
            PvpEvent::RoomOpened {
                room_id,
                side: Side::Player,
                opponent: to,
            },
        );
        self.notify(
            to,
            PvpEvent::RoomOpened {
                room_id,
                side: Side::Enemy,
                opponent: from,
            },
        );
        Ok(room_id)
    }

    /// Submit a user's action for the current turn of their room
    pub fn submit<R: Rng + ?Sized>(
        &mut self,
        user: u64,
        action: PlayerAction,
        rng: &mut R,
    ) -> Result<(), ServerError> {
        let room_id = *self.seats.get(&user).ok_or(ServerError::NotInRoom(user))?;
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(ServerError::RoomNotFound(room_id))?;

        let update = room.submit(user, action, &*self.skills, rng)?;
        let players = room.players();
        let hp = room.session().hp_snapshot();
        let over = room.session().is_over();

        match update {
            RoomUpdate::Waiting => {
                let opponent = players.into_iter().find(|p| *p != user).unwrap_or(user);
                self.notify(opponent, PvpEvent::OpponentReady { room_id });
            }
            RoomUpdate::ForcedSwitch { side, slot } => {
                self.broadcast(players, &PvpEvent::Switched { room_id, side, slot, hp });
            }
            RoomUpdate::Resolved(RoomTurn { switches, result }) => {
                for (side, slot) in switches {
                    let event = PvpEvent::Switched {
                        room_id,
                        side,
                        slot,
                        hp: hp.clone(),
                    };
                    self.broadcast(players, &event);
                }
                if let Some(result) = result {
                    self.broadcast(players, &PvpEvent::Turn { room_id, result });
                }
            }
        }

        if over {
            self.close(room_id);
        }
        Ok(())
    }

    /// Drop a user: withdraw their invites and forfeit any battle they are in
    pub fn disconnect(&mut self, user: u64) {
        self.subscribers.remove(&user);

        for invite in self.invites.withdraw_user(user) {
            let other = if invite.from == user { invite.to } else { invite.from };
            self.notify(
                other,
                PvpEvent::InviteWithdrawn {
                    from: invite.from,
                    to: invite.to,
                },
            );
        }

        let Some(&room_id) = self.seats.get(&user) else {
            return;
        };
        if let Some(room) = self.rooms.get_mut(&room_id) {
            if room.forfeit(user).is_ok() {
                info!(room_id, user, "pvp participant disconnected");
            }
        }
        self.close(room_id);
    }

    /// Discard invites and rooms past their TTL
    pub fn sweep(&mut self, now: DateTime<Utc>) -> SweepReport {
        let expired_invites = self.invites.sweep(now, self.config.invite_ttl());
        for invite in &expired_invites {
            let event = PvpEvent::InviteExpired {
                from: invite.from,
                to: invite.to,
            };
            self.broadcast([invite.from, invite.to], &event);
        }

        let room_ttl = self.config.room_ttl();
        let expired_rooms: Vec<u64> = self
            .rooms
            .values()
            .filter(|room| room.is_expired(now, room_ttl))
            .map(|room| room.id)
            .collect();
        for room_id in &expired_rooms {
            if let Some(room) = self.rooms.remove(room_id) {
                let players = room.players();
                for user in players {
                    self.seats.remove(&user);
                }
                info!(room_id, "pvp room expired");
                self.broadcast(players, &PvpEvent::RoomClosed { room_id: *room_id });
            }
        }

        let report = SweepReport {
            invites: expired_invites.len(),
            rooms: expired_rooms.len(),
        };
        if report != SweepReport::default() {
            debug!(?report, "sweep");
        }
        report
    }

    /// Tear a room down, telling both seats how it ended
    fn close(&mut self, room_id: u64) {
        let Some(room) = self.rooms.remove(&room_id) else {
            return;
        };
        let players = room.players();
        for user in players {
            self.seats.remove(&user);
        }

        let session = room.session();
        let event = PvpEvent::BattleEnded {
            room_id,
            winner: room.winner(),
            reason: session.reason().unwrap_or(EndReason::Knockout),
            final_hp: session.hp_snapshot(),
        };
        info!(room_id, winner = ?room.winner(), turns = session.turn(), "pvp battle ended");
        self.broadcast(players, &event);
    }

    fn broadcast(&mut self, users: [u64; 2], event: &PvpEvent) {
        for user in users {
            self.notify(user, event.clone());
        }
    }

    fn notify(&mut self, user: u64, event: PvpEvent) {
        let Some(tx) = self.subscribers.get(&user) else {
            return;
        };
        if tx.send(event).is_err() {
            debug!(user, "subscriber gone, dropping");
            self.subscribers.remove(&user);
        }
    }
}
