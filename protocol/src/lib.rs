//! Boundary records for the skirmish battle core.
//!
//! Everything in this crate is plain data: the calling layer (network handlers,
//! persistence, UI) turns these records into wire messages and database writes.
//! None of it carries game rules.

use thiserror::Error;

mod action;
mod codes;
mod result;
mod side;
mod stat;


pub use action::PlayerAction;
pub use codes::{EndReason, RejectCode};
pub use result::{
    AttackResult, CaptureResult, EscapeRefusal, EscapeResult, HpRecord, TurnResult, STAGE_AXES,
    STATUS_SLOTS,
};
pub use side::Side;
pub use stat::Stat;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid action format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty action")]
    EmptyAction,
}
