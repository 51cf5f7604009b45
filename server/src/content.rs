//! Static game content shared by every session

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use skirmish_battle::demo::{DEMO_BOSSES_JSON, DEMO_SKILLS_JSON};
use skirmish_battle::{BossRuleBook, EffectRegistry, SkillBook};
use tracing::info;

/// Effect registry, skill table and boss rules, loaded once at startup
#[derive(Debug, Clone)]
pub struct Content {
    /// Binds pet traits when combatants are built from persisted data
    pub effects: Arc<EffectRegistry>,
    pub skills: Arc<SkillBook>,
    pub bosses: Arc<BossRuleBook>,
}

impl Content {
    /// Bind both tables; any bad side effect or boss rule fails the load
    pub fn from_json(skills_json: &str, bosses_json: &str) -> Result<Self> {
        let registry = EffectRegistry::builtin().context("Invalid built-in effect registry")?;
        let skills = SkillBook::from_json(skills_json, &registry).context("Invalid skill table")?;
        let bosses = BossRuleBook::from_json(bosses_json).context("Invalid boss rule table")?;
        info!(skills = skills.len(), bosses = bosses.len(), "content loaded");
        Ok(Self {
            effects: Arc::new(registry),
            skills: Arc::new(skills),
            bosses: Arc::new(bosses),
        })
    }

    pub fn load(skills_path: impl AsRef<Path>, bosses_path: Option<&Path>) -> Result<Self> {
        let skills_path = skills_path.as_ref();
        let skills = std::fs::read_to_string(skills_path)
            .with_context(|| format!("Failed to read skill table: {}", skills_path.display()))?;
        let bosses = match bosses_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read boss table: {}", path.display()))?,
            None => "[]".to_string(),
        };
        Self::from_json(&skills, &bosses)
    }

    /// The built-in demo tables
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_SKILLS_JSON, DEMO_BOSSES_JSON)
    }
}
