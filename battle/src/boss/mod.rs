//! Boss rules: type-break rotation, break-then-finish kills, weekday schedules

mod engine;
mod rules;

pub use engine::{BossFight, BossHit, BossOutcome, BossPhase, BossRuleEngine, BossVerdict};
pub use rules::{BossRule, BossRuleBook, ChallengeCondition, KillCondition, WeekdaySchedule};
