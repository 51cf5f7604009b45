//! Runtime configuration

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Session-layer settings. Every field has a default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArenaConfig {
    /// Hard lifetime of a PVP invite
    pub invite_ttl_secs: u64,

    /// Hard lifetime of a PVP room, activity or not
    pub room_ttl_secs: u64,

    /// How often the reaper sweeps invites and rooms
    pub sweep_interval_secs: u64,

    pub max_escape_attempts: u8,
    pub base_exp: u32,

    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            invite_ttl_secs: 60,
            room_ttl_secs: 300,
            sweep_interval_secs: 5,
            max_escape_attempts: 3,
            base_exp: 100,
            seed: None,
        }
    }
}

impl ArenaConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn invite_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.invite_ttl_secs as i64)
    }

    pub fn room_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.room_ttl_secs as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ArenaConfig::from_json("{}").unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.invite_ttl_secs, 60);
        assert_eq!(config.room_ttl_secs, 300);
        assert_eq!(config.max_escape_attempts, 3);
    }

    #[test]
    fn test_partial_override() {
        let config = ArenaConfig::from_json(r#"{"roomTtlSecs": 30, "seed": 9}"#).unwrap();
        assert_eq!(config.room_ttl_secs, 30);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.base_exp, 100);
        assert_eq!(config.room_ttl(), chrono::Duration::seconds(30));
    }

    #[test]
    fn test_zero_sweep_interval_is_clamped() {
        let config = ArenaConfig {
            sweep_interval_secs: 0,
            ..ArenaConfig::default()
        };
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = ArenaConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
