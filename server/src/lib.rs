//! Session layer for the skirmish battle core.
//!
//! The battle crate resolves fights; this crate owns who is fighting whom.
//! [`Arena`] is the entry point: a cloneable handle over the PVE session
//! registry and the PVP hub, safe to share across tasks.
//!
//! # Example Usage
//!
//! ```ignore
//! use skirmish_server::{Arena, ArenaConfig, Content};
//!
//! let arena = Arena::new(Content::demo()?, ArenaConfig::default());
//! let reaper = arena.spawn_reaper();
//!
//! let mut events = arena.connect(user_id);
//! arena.invite(user_id, friend_id, party)?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! reaper.shutdown().await;
//! ```

mod arena;
pub mod config;
pub mod content;
mod error;
pub mod pve;
pub mod pvp;

pub use arena::{Arena, PveResponse, Reaper};
pub use config::ArenaConfig;
pub use content::Content;
pub use error::ServerError;
pub use pve::{PveRegistry, PveReply};
pub use pvp::{PvpEvent, PvpHub, SweepReport};
