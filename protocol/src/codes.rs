use serde::{Deserialize, Serialize};

/// Why a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum EndReason {
    /// One side has no combatant left standing
    Knockout = 0,
    Escape = 1,
    /// The opponent disconnected or forfeited
    Forfeit = 2,
    Capture = 6,
}

impl EndReason {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EndReason::Knockout),
            1 => Some(EndReason::Escape),
            2 => Some(EndReason::Forfeit),
            6 => Some(EndReason::Capture),
            _ => None,
        }
    }
}

/// Numeric reason attached to a rejected request.
///
/// Rejections never mutate battle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u16)]
pub enum RejectCode {
    UnknownSkill = 10,
    SkillNotInLoadout = 11,
    NoPpLeft = 12,
    SwitchTargetMissing = 20,
    SwitchTargetFainted = 21,
    SwitchTargetActive = 22,
    MustSwitch = 23,
    BattleOver = 30,
    NoBattle = 31,
    CaptureRefused = 40,
    EscapeRefused = 41,
    NotInRoom = 50,
    ActionAlreadySubmitted = 51,
    RoomNotFound = 52,
    InviteNotFound = 53,
    AlreadyInBattle = 54,
}

impl RejectCode {
    pub fn code(self) -> u16 {
        self as u16
    }
}
