//! Turn-based combat core for the skirmish battle server.
//!
//! The crate owns the rules of a fight and nothing else: no sockets, no
//! storage. Callers build a [`BattleSession`] from two parties, feed it choices
//! through [`execute_turn`], and persist what comes back.
//!
//! # Overview
//!
//! ```text
//! skirmish-protocol (boundary records)
//!        │
//!        ▼
//! skirmish-battle (rules + session state) ← THIS CRATE
//!        │
//!        └─> skirmish-server (PVE registry, PVP rooms, simulator)
//! ```
//!
//! # Main Types
//!
//! - [`BattleSession`] - Both parties plus turn counter and outcome
//! - [`SkillBook`] - Skill table with side effects bound at load time
//! - [`EffectRegistry`] - Side-effect id to constructor map
//! - [`BossRuleEngine`] - Per-fight boss damage gating and schedule checks
//! - [`TurnEnv`] - Collaborators a turn needs (skills, RNG, boss rules)
//!
//! # Example Usage
//!
//! ```ignore
//! use skirmish_battle::{BattleSession, EffectRegistry, Party, TurnEnv, demo, execute_turn};
//!
//! let registry = EffectRegistry::builtin()?;
//! let skills = demo::demo_skill_book(&registry)?;
//! let mut session = BattleSession::wild(owner_id, Party::single(mine), wild_pet)?;
//!
//! let mut rng = rand::thread_rng();
//! let mut env = TurnEnv::new(&skills, &mut rng);
//! let result = execute_turn(&mut session, skill_id, None, &mut env)?;
//! ```

pub mod ai;
pub mod boss;
pub mod capture;
pub mod demo;
pub mod effect;
pub mod error;
pub mod escape;
pub mod formula;
pub mod session;
pub mod skill;
pub mod tracker;
pub mod turn;
pub mod types;

pub use boss::{BossFight, BossRuleBook, BossRuleEngine};
pub use capture::{BallType, CaptureRefusal, attempt_capture};
pub use effect::{EffectRegistry, Hook};
pub use error::{BattleError, ConfigError};
pub use escape::{MAX_ESCAPE_ATTEMPTS, attempt_escape};
pub use session::{BattleKind, BattleSession};
pub use skill::{SkillBook, SkillDefinition, SkillLookup, SkillRecord};
pub use turn::{TurnEnv, execute_turn};
pub use types::{Combatant, Element, Party, PetSource, SkillSlot, StatusKind, TraitSpec};

// Re-export the boundary records callers consume
pub use skirmish_protocol::{
    AttackResult, CaptureResult, EndReason, EscapeResult, HpRecord, Side, TurnResult,
};
