//! Turn execution

mod attack;
mod executor;

pub use executor::{
    DEFAULT_BASE_EXP, TurnEnv, TurnPhase, execute_turn, exp_reward, resolve_choice,
};

#[cfg(test)]
mod tests;
