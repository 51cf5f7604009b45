//! PVE session registry

use std::collections::HashMap;

use rand::Rng;
use skirmish_battle::capture::{BallType, CaptureRefusal, attempt_capture};
use skirmish_battle::escape::attempt_escape;
use skirmish_battle::{BattleError, BattleSession, BossRuleEngine, TurnEnv, execute_turn};
use skirmish_protocol::{CaptureResult, EndReason, EscapeResult, HpRecord, Side, TurnResult};
use tracing::{debug, info};

use crate::config::ArenaConfig;
use crate::content::Content;
use crate::error::ServerError;

/// An operation's outcome, plus the final HP of both parties when it ended the battle
#[derive(Debug, Clone, PartialEq)]
pub struct PveReply<T> {
    pub outcome: T,
    pub final_hp: Option<Vec<HpRecord>>,
}

impl<T> PveReply<T> {
    fn ongoing(outcome: T) -> Self {
        Self {
            outcome,
            final_hp: None,
        }
    }

    pub fn ended(&self) -> bool {
        self.final_hp.is_some()
    }
}

/// One live PVE battle per owner, with the auxiliary state those battles need
#[derive(Debug)]
pub struct PveRegistry {
    content: Content,
    config: ArenaConfig,
    sessions: HashMap<u64, BattleSession>,

    /// Escape attempts per session, keyed by the session's start timestamp
    escape_attempts: HashMap<i64, u8>,

    /// Phase state for every live boss fight
    bosses: BossRuleEngine,
}

impl PveRegistry {
    pub fn new(content: Content, config: ArenaConfig) -> Self {
        let bosses = BossRuleEngine::new(content.bosses.clone());
        Self {
            content,
            config,
            sessions: HashMap::new(),
            escape_attempts: HashMap::new(),
            bosses,
        }
    }

    /// Register a new battle for its owner
    pub fn start(&mut self, mut session: BattleSession) -> Result<(), ServerError> {
        let owner_id = session.owner_id;
        if self.sessions.contains_key(&owner_id) {
            return Err(ServerError::AlreadyInBattle(owner_id));
        }

        // Start timestamps key escape counters and boss phases, so keep them unique
        let mut started_at = session.started_at();
        while self.sessions.values().any(|s| s.started_at() == started_at) {
            started_at += 1;
        }
        session = session.with_started_at(started_at);

        info!(owner_id, kind = ?session.kind, "pve battle started");
        self.sessions.insert(owner_id, session);
        Ok(())
    }

    pub fn session(&self, owner_id: u64) -> Option<&BattleSession> {
        self.sessions.get(&owner_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Escape attempts recorded for an owner's current battle
    pub fn escape_attempts(&self, owner_id: u64) -> u8 {
        self.sessions
            .get(&owner_id)
            .and_then(|s| self.escape_attempts.get(&s.started_at()))
            .copied()
            .unwrap_or(0)
    }

    pub fn tracked_escape_counters(&self) -> usize {
        self.escape_attempts.len()
    }

    pub fn boss_engine(&self) -> &BossRuleEngine {
        &self.bosses
    }

    /// Resolve one turn with the player's skill; the enemy picks through the AI
    pub fn use_skill<R: Rng + ?Sized>(
        &mut self,
        owner_id: u64,
        skill_id: u32,
        rng: &mut R,
    ) -> Result<PveReply<TurnResult>, ServerError> {
        let session = self
            .sessions
            .get_mut(&owner_id)
            .ok_or(ServerError::NoBattle(owner_id))?;

        if session.pending_switch() == Some(Side::Enemy) {
            replace_fainted_enemy(session, rng)?;
        }

        let mut env = TurnEnv::new(&*self.content.skills, rng)
            .with_bosses(&mut self.bosses)
            .with_base_exp(self.config.base_exp);
        let result = execute_turn(session, skill_id, None, &mut env)?;

        if result.is_over {
            let final_hp = self.end(owner_id);
            return Ok(PveReply {
                outcome: result,
                final_hp,
            });
        }
        Ok(PveReply::ongoing(result))
    }

    /// Swap the player's active combatant; returns HP records to persist
    pub fn switch<R: Rng + ?Sized>(
        &mut self,
        owner_id: u64,
        slot: usize,
        rng: &mut R,
    ) -> Result<Vec<HpRecord>, ServerError> {
        let session = self
            .sessions
            .get_mut(&owner_id)
            .ok_or(ServerError::NoBattle(owner_id))?;
        session.switch_in(Side::Player, slot, rng)?;
        debug!(owner_id, slot, "player switched");
        Ok(session.hp_snapshot())
    }

    /// Throw a ball at the enemy. A catch ends the battle.
    pub fn capture<R: Rng + ?Sized>(
        &mut self,
        owner_id: u64,
        ball_id: u32,
        rng: &mut R,
    ) -> Result<PveReply<CaptureResult>, ServerError> {
        let session = self
            .sessions
            .get(&owner_id)
            .ok_or(ServerError::NoBattle(owner_id))?;
        if session.is_over() {
            return Err(BattleError::BattleOver.into());
        }
        if session.is_pvp() {
            return Err(BattleError::CaptureRefused(CaptureRefusal::PvpBattle).into());
        }

        let target = session.active(Side::Enemy);
        let result = attempt_capture(
            target,
            session.boss_id().is_some(),
            BallType::from_id(ball_id),
            target.catch_rate as u32,
            rng,
        )?;
        debug!(owner_id, ball_id, success = result.success, shakes = result.shake_count, "capture rolled");

        if !result.success {
            return Ok(PveReply::ongoing(result));
        }
        if let Some(session) = self.sessions.get_mut(&owner_id) {
            session.finish(Some(Side::Player), EndReason::Capture);
        }
        let final_hp = self.end(owner_id);
        Ok(PveReply {
            outcome: result,
            final_hp,
        })
    }

    /// Try to run. Refusals come back as a result record, not an error.
    pub fn escape<R: Rng + ?Sized>(
        &mut self,
        owner_id: u64,
        rng: &mut R,
    ) -> Result<PveReply<EscapeResult>, ServerError> {
        let session = self
            .sessions
            .get_mut(&owner_id)
            .ok_or(ServerError::NoBattle(owner_id))?;
        let key = session.started_at();
        let prior = self.escape_attempts.get(&key).copied().unwrap_or(0);

        let result = attempt_escape(session, prior, self.config.max_escape_attempts, rng);
        if result.can_escape {
            self.escape_attempts.insert(key, result.attempts);
        }

        if result.success {
            let final_hp = self.end(owner_id);
            return Ok(PveReply {
                outcome: result,
                final_hp,
            });
        }
        Ok(PveReply::ongoing(result))
    }

    /// Give up; the enemy side wins
    pub fn forfeit(&mut self, owner_id: u64) -> Result<Vec<HpRecord>, ServerError> {
        let session = self
            .sessions
            .get_mut(&owner_id)
            .ok_or(ServerError::NoBattle(owner_id))?;
        session.finish(Some(Side::Enemy), EndReason::Forfeit);
        Ok(self.end(owner_id).unwrap_or_default())
    }

    pub fn hp_snapshot(&self, owner_id: u64) -> Result<Vec<HpRecord>, ServerError> {
        self.sessions
            .get(&owner_id)
            .map(BattleSession::hp_snapshot)
            .ok_or(ServerError::NoBattle(owner_id))
    }

    /// Drop a session and everything keyed to it
    fn end(&mut self, owner_id: u64) -> Option<Vec<HpRecord>> {
        let session = self.sessions.remove(&owner_id)?;
        self.escape_attempts.remove(&session.started_at());
        if let Some(fight) = session.boss_fight() {
            self.bosses.clear(fight);
        }
        info!(
            owner_id,
            winner = ?session.winner(),
            reason = ?session.reason(),
            turns = session.turn(),
            "pve battle ended"
        );
        Some(session.hp_snapshot())
    }
}

/// Bring in the first healthy enemy reserve after a knockout
fn replace_fainted_enemy<R: Rng + ?Sized>(
    session: &mut BattleSession,
    rng: &mut R,
) -> Result<(), BattleError> {
    let slot = session
        .party(Side::Enemy)
        .bench()
        .find(|(_, c)| !c.is_fainted())
        .map(|(slot, _)| slot);
    match slot {
        Some(slot) => session.switch_in(Side::Enemy, slot, rng),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use skirmish_battle::formula::CoreStats;
    use skirmish_battle::{Combatant, Element, Party, SkillSlot};
    use skirmish_protocol::EscapeRefusal;

    use super::*;

    fn pet(pet_id: u64, speed: u32, hp: u32) -> Combatant {
        let stats = CoreStats {
            max_hp: 100,
            atk: 70,
            def: 60,
            sp_atk: 70,
            sp_def: 60,
            speed,
        };
        let mut c = Combatant::new(pet_id, 20, Element::Normal, stats)
            .with_skills([SkillSlot::new(1, 30), SkillSlot::new(9, 30)]);
        c.set_hp(hp);
        c
    }

    fn registry() -> PveRegistry {
        PveRegistry::new(Content::demo().unwrap(), ArenaConfig::default())
    }

    fn start_wild(reg: &mut PveRegistry, owner_id: u64, enemy: Combatant) {
        let session =
            BattleSession::wild(owner_id, Party::single(pet(1, 80, 100)), enemy).unwrap();
        reg.start(session).unwrap();
    }

    #[test]
    fn test_one_battle_per_owner() {
        let mut reg = registry();
        start_wild(&mut reg, 7, pet(2, 50, 100));
        let again = BattleSession::wild(7, Party::single(pet(1, 80, 100)), pet(3, 50, 100)).unwrap();
        assert_eq!(reg.start(again), Err(ServerError::AlreadyInBattle(7)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_start_timestamps_stay_unique() {
        let mut reg = registry();
        let a = BattleSession::wild(1, Party::single(pet(1, 80, 100)), pet(2, 50, 100))
            .unwrap()
            .with_started_at(1_000);
        let b = BattleSession::wild(2, Party::single(pet(1, 80, 100)), pet(2, 50, 100))
            .unwrap()
            .with_started_at(1_000);
        reg.start(a).unwrap();
        reg.start(b).unwrap();
        assert_ne!(
            reg.session(1).unwrap().started_at(),
            reg.session(2).unwrap().started_at()
        );
    }

    #[test]
    fn test_unknown_owner_has_no_battle() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            reg.use_skill(5, 1, &mut rng).unwrap_err(),
            ServerError::NoBattle(5)
        );
        assert_eq!(reg.hp_snapshot(5).unwrap_err().code().code(), 31);
    }

    #[test]
    fn test_knockout_ends_and_clears_session() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        start_wild(&mut reg, 7, pet(2, 10, 1));

        let reply = reg.use_skill(7, 1, &mut rng).unwrap();
        assert!(reply.outcome.is_over);
        assert_eq!(reply.outcome.winner, Some(Side::Player));
        assert!(reply.outcome.exp_reward.is_some());
        let final_hp = reply.final_hp.unwrap();
        assert_eq!(final_hp.len(), 2);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_master_ball_catches_and_ends_battle() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        start_wild(&mut reg, 7, pet(2, 50, 100));

        let reply = reg.capture(7, 5, &mut rng).unwrap();
        assert!(reply.outcome.success);
        assert_eq!(reply.outcome.shake_count, 3);
        assert!(reply.ended());
        assert!(reg.session(7).is_none());
    }

    #[test]
    fn test_healthy_target_refuses_capture() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        start_wild(&mut reg, 7, pet(2, 50, 100));

        assert_eq!(
            reg.capture(7, 1, &mut rng).unwrap_err(),
            ServerError::Battle(BattleError::CaptureRefused(CaptureRefusal::HpTooHigh))
        );
        assert!(reg.session(7).is_some());
    }

    #[test]
    fn test_escape_counter_caps_and_clears() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        // A much faster enemy keeps the escape score low
        start_wild(&mut reg, 7, pet(2, 250, 100));
        reg.sessions
            .get_mut(&7)
            .unwrap()
            .active_mut(Side::Player)
            .stats
            .speed = 1;

        let mut last = None;
        for _ in 0..3 {
            let reply = reg.escape(7, &mut rng).unwrap();
            if reply.outcome.success {
                break;
            }
            last = Some(reply.outcome);
        }

        if reg.session(7).is_some() {
            assert_eq!(last.unwrap().attempts, 3);
            assert_eq!(reg.escape_attempts(7), 3);
            let refused = reg.escape(7, &mut rng).unwrap().outcome;
            assert!(!refused.can_escape);
            assert_eq!(refused.refusal, Some(EscapeRefusal::TooManyAttempts));

            reg.forfeit(7).unwrap();
        }
        assert_eq!(reg.tracked_escape_counters(), 0);
    }

    #[test]
    fn test_boss_battle_refuses_escape_and_capture() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        let session = BattleSession::boss(7, 900, Party::single(pet(1, 80, 100)), pet(2, 50, 10)).unwrap();
        reg.start(session).unwrap();

        let escape = reg.escape(7, &mut rng).unwrap().outcome;
        assert_eq!(escape.refusal, Some(EscapeRefusal::BossBattle));
        assert_eq!(
            reg.capture(7, 5, &mut rng).unwrap_err(),
            ServerError::Battle(BattleError::CaptureRefused(CaptureRefusal::Boss))
        );
    }

    #[test]
    fn test_boss_phase_cleared_on_end() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        let session = BattleSession::boss(7, 900, Party::single(pet(1, 80, 100)), pet(2, 50, 100)).unwrap();
        reg.start(session).unwrap();

        reg.use_skill(7, 1, &mut rng).unwrap();
        assert_eq!(reg.boss_engine().tracked(), 1);

        reg.forfeit(7).unwrap();
        assert_eq!(reg.boss_engine().tracked(), 0);
    }

    #[test]
    fn test_concurrent_boss_fights_keep_their_own_phase() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        for owner_id in [7, 8] {
            let session = BattleSession::boss(
                owner_id,
                900,
                Party::single(pet(1, 80, 100)),
                pet(2, 50, 100),
            )
            .unwrap()
            .with_started_at(1_000);
            reg.start(session).unwrap();
        }

        reg.use_skill(7, 1, &mut rng).unwrap();
        reg.use_skill(8, 1, &mut rng).unwrap();
        assert_eq!(reg.boss_engine().tracked(), 2);

        reg.forfeit(7).unwrap();
        assert_eq!(reg.boss_engine().tracked(), 1);
        let fight = reg.session(8).unwrap().boss_fight().unwrap();
        assert!(reg.boss_engine().phase(fight).is_some());
    }

    #[test]
    fn test_switch_returns_hp_records() {
        let mut reg = registry();
        let mut rng = StdRng::seed_from_u64(3);
        let party = Party::new(vec![pet(1, 80, 100), pet(3, 80, 40)]);
        let session = BattleSession::wild(7, party, pet(2, 50, 100)).unwrap();
        reg.start(session).unwrap();

        let records = reg.switch(7, 1, &mut rng).unwrap();
        assert!(records.iter().any(|r| r.pet_id == 3 && r.hp == 40));
        assert_eq!(
            reg.switch(7, 1, &mut rng).unwrap_err(),
            ServerError::Battle(BattleError::SwitchTargetActive { slot: 1 })
        );
    }
}
