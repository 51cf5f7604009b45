//! Player-versus-player battles

mod hub;
mod invite;
mod room;

pub use hub::{PvpEvent, PvpHub, SweepReport};
pub use invite::{Invite, InviteBook};
pub use room::{Room, RoomTurn, RoomUpdate, Submission, TurnSynchronizer};
