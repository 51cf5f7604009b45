//! Escape model

use rand::Rng;
use skirmish_protocol::{EndReason, EscapeRefusal, EscapeResult, Side};

use crate::session::BattleSession;

/// Attempts allowed per battle
pub const MAX_ESCAPE_ATTEMPTS: u8 = 3;

/// A score at or above this always escapes
pub const ESCAPE_THRESHOLD: u32 = 256;

/// Bonus per prior failed attempt
pub const ATTEMPT_BONUS: u32 = 30;

/// `clamp(0, 256, player×128/(enemy+1) + 30×prior)`
pub fn escape_score(player_speed: u32, enemy_speed: u32, prior_attempts: u8) -> u32 {
    let ratio = player_speed as u64 * 128 / (enemy_speed as u64 + 1);
    let score = ratio + ATTEMPT_BONUS as u64 * prior_attempts as u64;
    score.min(ESCAPE_THRESHOLD as u64) as u32
}

/// Why the player side may not try to run, if anything
pub fn escape_refusal(
    session: &BattleSession,
    prior_attempts: u8,
    max_attempts: u8,
) -> Option<EscapeRefusal> {
    if session.is_pvp() {
        return Some(EscapeRefusal::PvpBattle);
    }
    if session.boss_id().is_some() {
        return Some(EscapeRefusal::BossBattle);
    }
    if session.active(Side::Player).flags.bound_turns > 0 {
        return Some(EscapeRefusal::Bound);
    }
    if prior_attempts >= max_attempts {
        return Some(EscapeRefusal::TooManyAttempts);
    }
    None
}

/// Roll an escape for the player side. A success ends the battle.
///
/// Refusals are returned before any roll and leave the session untouched.
pub fn attempt_escape<R: Rng + ?Sized>(
    session: &mut BattleSession,
    prior_attempts: u8,
    max_attempts: u8,
    rng: &mut R,
) -> EscapeResult {
    if let Some(refusal) = escape_refusal(session, prior_attempts, max_attempts) {
        return EscapeResult::refused(refusal, prior_attempts);
    }

    let score = escape_score(
        session.active(Side::Player).effective_speed(),
        session.active(Side::Enemy).effective_speed(),
        prior_attempts,
    );
    let success = score >= ESCAPE_THRESHOLD || rng.gen_range(0..ESCAPE_THRESHOLD) < score;
    if success {
        session.finish(None, EndReason::Escape);
    }

    EscapeResult {
        can_escape: true,
        success,
        attempts: prior_attempts + 1,
        refusal: None,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::formula::CoreStats;
    use crate::types::{Combatant, Element, Party, StatusKind};

    fn pet(pet_id: u64, speed: u32) -> Combatant {
        let stats = CoreStats {
            max_hp: 100,
            atk: 50,
            def: 50,
            sp_atk: 50,
            sp_def: 50,
            speed,
        };
        Combatant::new(pet_id, 20, Element::Water, stats)
    }

    fn wild(player_speed: u32, enemy_speed: u32) -> BattleSession {
        BattleSession::wild(1, Party::single(pet(1, player_speed)), pet(2, enemy_speed)).unwrap()
    }

    #[test]
    fn test_score() {
        assert_eq!(escape_score(100, 99, 0), 128);
        assert_eq!(escape_score(100, 99, 2), 188);
        assert_eq!(escape_score(1000, 10, 0), 256);
        assert_eq!(escape_score(0, 0, 0), 0);
    }

    #[test]
    fn test_attempt_cap_refused_before_roll() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = wild(1000, 1);
        let result = attempt_escape(&mut session, 3, MAX_ESCAPE_ATTEMPTS, &mut rng);
        assert!(!result.can_escape);
        assert!(!result.success);
        assert_eq!(result.refusal, Some(EscapeRefusal::TooManyAttempts));
        assert!(!session.is_over());
    }

    #[test]
    fn test_boss_and_bound_refused() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss =
            BattleSession::boss(1, 9, Party::single(pet(1, 500)), pet(2, 1)).unwrap();
        let result = attempt_escape(&mut boss, 0, MAX_ESCAPE_ATTEMPTS, &mut rng);
        assert_eq!(result.refusal, Some(EscapeRefusal::BossBattle));

        let mut bound = wild(500, 1);
        bound.active_mut(Side::Player).flags.bound_turns = 2;
        let result = attempt_escape(&mut bound, 0, MAX_ESCAPE_ATTEMPTS, &mut rng);
        assert_eq!(result.refusal, Some(EscapeRefusal::Bound));
    }

    #[test]
    fn test_fast_player_always_escapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = wild(300, 100);
        let result = attempt_escape(&mut session, 0, MAX_ESCAPE_ATTEMPTS, &mut rng);
        assert!(result.success);
        assert_eq!(result.attempts, 1);
        assert!(session.is_over());
        assert_eq!(session.reason(), Some(EndReason::Escape));
        assert_eq!(session.winner(), None);
    }

    #[test]
    fn test_paralysis_halves_escape_speed() {
        let mut session = wild(200, 99);
        session
            .active_mut(Side::Player)
            .status
            .set(StatusKind::Paralysis, 3);
        let speed = session.active(Side::Player).effective_speed();
        assert_eq!(escape_score(speed, 99, 0), 128);
    }

    #[test]
    fn test_even_odds_escape_about_half() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut escaped = 0;
        for _ in 0..2_000 {
            let mut session = wild(100, 99);
            if attempt_escape(&mut session, 0, MAX_ESCAPE_ATTEMPTS, &mut rng).success {
                escaped += 1;
            }
        }
        assert!((850..1_150).contains(&escaped), "escaped = {escaped}");
    }
}
