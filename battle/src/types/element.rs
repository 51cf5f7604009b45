//! Element types and the matchup chart

use serde::{Deserialize, Serialize};

/// Combatant and skill elements (16 in the current ruleset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Element {
    Normal = 0,
    Grass = 1,
    Water = 2,
    Fire = 3,
    Flying = 4,
    Electric = 5,
    Machine = 6,
    Ground = 7,
    Ice = 8,
    Psychic = 9,
    Fighting = 10,
    Light = 11,
    Shadow = 12,
    Mystic = 13,
    Dragon = 14,
    Holy = 15,
}

impl Element {
    /// All elements, in chart order
    pub const ALL: [Element; 16] = [
        Element::Normal,
        Element::Grass,
        Element::Water,
        Element::Fire,
        Element::Flying,
        Element::Electric,
        Element::Machine,
        Element::Ground,
        Element::Ice,
        Element::Psychic,
        Element::Fighting,
        Element::Light,
        Element::Shadow,
        Element::Mystic,
        Element::Dragon,
        Element::Holy,
    ];

    /// Multiplier for a skill of this element hitting a defender of `defender`'s element
    pub fn effectiveness(&self, defender: Element) -> f64 {
        ELEMENT_CHART[*self as usize][defender as usize]
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Normal => "Normal",
            Element::Grass => "Grass",
            Element::Water => "Water",
            Element::Fire => "Fire",
            Element::Flying => "Flying",
            Element::Electric => "Electric",
            Element::Machine => "Machine",
            Element::Ground => "Ground",
            Element::Ice => "Ice",
            Element::Psychic => "Psychic",
            Element::Fighting => "Fighting",
            Element::Light => "Light",
            Element::Shadow => "Shadow",
            Element::Mystic => "Mystic",
            Element::Dragon => "Dragon",
            Element::Holy => "Holy",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 16x16 matchup chart
/// Row = attacking element, Column = defending element
/// Values: 0.0 = immune, 0.5 = resisted, 1.0 = neutral, 2.0 = super effective
///
/// Matchups are one-way unless both rows list each other (Light/Shadow are mutual).
#[rustfmt::skip]
pub static ELEMENT_CHART: [[f64; 16]; 16] = [
    // Normal attacking
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0],
    // Grass attacking
    [1.0, 0.5, 2.0, 0.5, 0.5, 1.0, 0.5, 2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 0.5, 1.0],
    // Water attacking
    [1.0, 0.5, 0.5, 2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0],
    // Fire attacking
    [1.0, 2.0, 0.5, 0.5, 1.0, 1.0, 2.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0],
    // Flying attacking
    [1.0, 2.0, 1.0, 1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    // Electric attacking
    [1.0, 0.5, 2.0, 1.0, 2.0, 0.5, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    // Machine attacking
    [1.0, 1.0, 0.5, 0.5, 1.0, 0.5, 0.5, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0],
    // Ground attacking
    [1.0, 0.5, 1.0, 2.0, 0.0, 2.0, 2.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0],
    // Ice attacking
    [1.0, 2.0, 0.5, 0.5, 2.0, 1.0, 0.5, 2.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0],
    // Psychic attacking
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 0.5, 2.0, 0.5, 1.0, 2.0, 1.0, 1.0],
    // Fighting attacking
    [2.0, 1.0, 1.0, 1.0, 0.5, 1.0, 2.0, 1.0, 2.0, 0.5, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0],
    // Light attacking
    [1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 2.0, 1.0, 1.0, 1.0],
    // Shadow attacking
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 2.0, 0.5, 1.0, 1.0, 0.5],
    // Mystic attacking
    [1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 2.0],
    // Dragon attacking
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5],
    // Holy attacking
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5, 2.0, 0.5],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_effective() {
        assert_eq!(Element::Fire.effectiveness(Element::Grass), 2.0);
        assert_eq!(Element::Water.effectiveness(Element::Fire), 2.0);
        assert_eq!(Element::Electric.effectiveness(Element::Water), 2.0);
        assert_eq!(Element::Fighting.effectiveness(Element::Normal), 2.0);
    }

    #[test]
    fn test_resisted() {
        assert_eq!(Element::Fire.effectiveness(Element::Water), 0.5);
        assert_eq!(Element::Grass.effectiveness(Element::Fire), 0.5);
        assert_eq!(Element::Dragon.effectiveness(Element::Holy), 0.5);
    }

    #[test]
    fn test_immune() {
        assert_eq!(Element::Electric.effectiveness(Element::Ground), 0.0);
        assert_eq!(Element::Ground.effectiveness(Element::Flying), 0.0);
        assert_eq!(Element::Normal.effectiveness(Element::Shadow), 0.0);
    }

    #[test]
    fn test_one_way_and_mutual() {
        // one-way: Grass beats Light, Light does not beat Grass
        assert_eq!(Element::Grass.effectiveness(Element::Light), 2.0);
        assert_eq!(Element::Light.effectiveness(Element::Grass), 0.5);
        // mutual
        assert_eq!(Element::Light.effectiveness(Element::Shadow), 2.0);
        assert_eq!(Element::Shadow.effectiveness(Element::Light), 2.0);
    }

    #[test]
    fn test_chart_only_uses_known_multipliers() {
        for row in ELEMENT_CHART.iter() {
            for value in row.iter() {
                assert!([0.0, 0.5, 1.0, 2.0].contains(value));
            }
        }
    }

    #[test]
    fn test_from_id() {
        assert_eq!(Element::from_id(0), Some(Element::Normal));
        assert_eq!(Element::from_id(15), Some(Element::Holy));
        assert_eq!(Element::from_id(16), None);
        assert_eq!(Element::ALL.len(), 16);
    }
}
