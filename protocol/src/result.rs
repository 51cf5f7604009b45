//! Result records the battle core hands back to the calling layer

use serde::{Deserialize, Serialize};

use crate::codes::EndReason;
use crate::side::Side;

/// Number of slots in a status-duration vector
pub const STATUS_SLOTS: usize = 20;

/// Number of stage-modifier axes
pub const STAGE_AXES: usize = 6;

/// Everything a caller needs to animate one attack without re-deriving it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResult {
    /// Owner of the attacking combatant
    pub user_id: u64,
    pub side: Side,
    pub skill_id: u32,

    /// Number of hits landed (multi-hit skills report more than one)
    pub atk_times: u8,

    /// Total damage dealt to the defender
    pub damage: u32,

    /// HP the attacker regained during this attack (drain, heal)
    pub gain_hp: u32,

    pub attacker_remain_hp: u32,
    pub attacker_max_hp: u32,
    pub defender_remain_hp: u32,

    pub missed: bool,

    /// The attacker could not act this turn (sleep, fear, flinch, ...)
    pub blocked: bool,

    pub is_crit: bool,

    pub attacker_status: [u8; STATUS_SLOTS],
    pub attacker_stages: [i8; STAGE_AXES],
    pub defender_status: [u8; STATUS_SLOTS],
    pub defender_stages: [i8; STAGE_AXES],

    /// Human-readable effect log, in resolution order
    #[serde(default)]
    pub messages: Vec<String>,
}

impl AttackResult {
    /// An attack that never happened (blocked attacker or no-op PVP side)
    pub fn idle(user_id: u64, side: Side, skill_id: u32) -> Self {
        Self {
            user_id,
            side,
            skill_id,
            atk_times: 0,
            damage: 0,
            gain_hp: 0,
            attacker_remain_hp: 0,
            attacker_max_hp: 0,
            defender_remain_hp: 0,
            missed: false,
            blocked: false,
            is_crit: false,
            attacker_status: [0; STATUS_SLOTS],
            attacker_stages: [0; STAGE_AXES],
            defender_status: [0; STATUS_SLOTS],
            defender_stages: [0; STAGE_AXES],
            messages: Vec::new(),
        }
    }
}

/// Outcome of one resolved turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    /// Turn number this result belongs to (1-based)
    pub turn: u32,

    #[serde(default)]
    pub first_attack: Option<AttackResult>,

    #[serde(default)]
    pub second_attack: Option<AttackResult>,

    /// Start-of-turn status damage taken by each side, indexed by `Side::index`
    pub status_damage: [u32; 2],

    pub is_over: bool,

    #[serde(default)]
    pub winner: Option<Side>,

    #[serde(default)]
    pub reason: Option<EndReason>,

    /// A side whose active combatant fainted and must switch before the next turn
    #[serde(default)]
    pub needs_switch: Option<Side>,

    /// Experience granted to the player side when a PVE enemy is defeated
    #[serde(default)]
    pub exp_reward: Option<u32>,
}

impl TurnResult {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            first_attack: None,
            second_attack: None,
            status_damage: [0; 2],
            is_over: false,
            winner: None,
            reason: None,
            needs_switch: None,
            exp_reward: None,
        }
    }

    /// Find the attack record made by a given side, if that side attacked
    pub fn attack_by(&self, side: Side) -> Option<&AttackResult> {
        [self.first_attack.as_ref(), self.second_attack.as_ref()]
            .into_iter()
            .flatten()
            .find(|a| a.side == side)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub success: bool,

    /// Number of shake trials passed (0..=3)
    pub shake_count: u8,

    /// The flat "critical capture" roll succeeded
    pub critical: bool,

    /// Computed catch rate in [1, 100]
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscapeRefusal {
    BossBattle,
    Bound,
    TooManyAttempts,
    PvpBattle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscapeResult {
    /// The escape was allowed to roll at all
    pub can_escape: bool,
    pub success: bool,

    /// Attempts made so far, including this one when it rolled
    pub attempts: u8,

    #[serde(default)]
    pub refusal: Option<EscapeRefusal>,
}

impl EscapeResult {
    pub fn refused(refusal: EscapeRefusal, attempts: u8) -> Self {
        Self {
            can_escape: false,
            success: false,
            attempts,
            refusal: Some(refusal),
        }
    }
}

/// Final HP of one party member, for the caller to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpRecord {
    pub side: Side,
    pub pet_id: u64,
    pub hp: u32,
    pub max_hp: u32,
}
