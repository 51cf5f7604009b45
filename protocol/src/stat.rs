use serde::{Deserialize, Serialize};

/// Stage-modifiable stat axes, in the order used by stage vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    Atk,
    Def,
    SpAtk,
    SpDef,
    Speed,
    Accuracy,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Atk,
        Stat::Def,
        Stat::SpAtk,
        Stat::SpDef,
        Stat::Speed,
        Stat::Accuracy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spatk" | "spa" => Some(Stat::SpAtk),
            "spdef" | "spd" => Some(Stat::SpDef),
            "speed" | "spe" => Some(Stat::Speed),
            "accuracy" | "acc" => Some(Stat::Accuracy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Atk => "atk",
            Stat::Def => "def",
            Stat::SpAtk => "spatk",
            Stat::SpDef => "spdef",
            Stat::Speed => "speed",
            Stat::Accuracy => "accuracy",
        }
    }
}
