use serde::{Deserialize, Serialize};

use crate::ParseError;

/// An action a player submits for the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlayerAction {
    /// Use the skill with this id from the active combatant's loadout
    UseSkill { skill_id: u32 },

    /// Swap the active combatant for the party member at `slot`
    Switch { slot: usize },

    /// Throw a capture ball (PVE only)
    Capture { ball: u32 },

    /// Try to run from the battle (PVE only)
    Escape,
}

impl PlayerAction {
    /// Parse a textual command: `skill <id>`, `switch <slot>`, `capture <ball>`, `escape`
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyAction);
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "skill" | "move" => Ok(PlayerAction::UseSkill {
                skill_id: parse_number(&parts, "skill id")?,
            }),
            "switch" => Ok(PlayerAction::Switch {
                slot: parse_number(&parts, "switch slot")?,
            }),
            "capture" | "catch" => Ok(PlayerAction::Capture {
                ball: parse_number(&parts, "ball type")?,
            }),
            "escape" | "run" => Ok(PlayerAction::Escape),
            other => Err(ParseError::InvalidFormat(format!("unknown action: {}", other))),
        }
    }

    /// Whether this action is a pet switch (resolved before any skill in PVP)
    pub fn is_switch(&self) -> bool {
        matches!(self, PlayerAction::Switch { .. })
    }
}

fn parse_number<T: std::str::FromStr>(parts: &[&str], field: &str) -> Result<T, ParseError> {
    let raw = parts
        .get(1)
        .ok_or_else(|| ParseError::MissingField(field.to_string()))?;
    raw.parse()
        .map_err(|_| ParseError::InvalidFormat(format!("{} is not a number: {}", field, raw)))
}
