use skirmish_battle::BattleError;
use skirmish_protocol::RejectCode;
use thiserror::Error;

/// A request the session layer turned down. Nothing was mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("User {0} has no battle in progress")]
    NoBattle(u64),

    #[error("User {0} is already in a battle")]
    AlreadyInBattle(u64),

    #[error("User {0} is not in a PVP room")]
    NotInRoom(u64),

    #[error("User {0} already submitted an action this turn")]
    ActionAlreadySubmitted(u64),

    #[error("Room {0} not found")]
    RoomNotFound(u64),

    #[error("No pending invite from {from} to {to}")]
    InviteNotFound { from: u64, to: u64 },
}

impl ServerError {
    pub fn code(&self) -> RejectCode {
        match self {
            ServerError::Battle(err) => err.code(),
            ServerError::NoBattle(_) => RejectCode::NoBattle,
            ServerError::AlreadyInBattle(_) => RejectCode::AlreadyInBattle,
            ServerError::NotInRoom(_) => RejectCode::NotInRoom,
            ServerError::ActionAlreadySubmitted(_) => RejectCode::ActionAlreadySubmitted,
            ServerError::RoomNotFound(_) => RejectCode::RoomNotFound,
            ServerError::InviteNotFound { .. } => RejectCode::InviteNotFound,
        }
    }
}
