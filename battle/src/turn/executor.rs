//! The turn state machine

use chrono::{Datelike, Utc, Weekday};
use rand::Rng;
use skirmish_protocol::{AttackResult, EndReason, Side, TurnResult};
use tracing::{debug, info};

use super::attack::{AttackRun, blocked_attack};
use crate::ai::select_skill;
use crate::boss::{BossOutcome, BossRuleEngine};
use crate::effect::Hook;
use crate::error::BattleError;
use crate::formula::{Contender, determine_first_move};
use crate::session::{BattleSession, fire_side_hook};
use crate::skill::{BASIC_ATTACK_ID, SkillLookup};
use crate::tracker::{self, BlockReason};
use crate::types::Combatant;

/// Experience base used when the caller does not configure one
pub const DEFAULT_BASE_EXP: u32 = 100;

/// Phases of one turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    TurnStart,
    StatusTick,
    ActionGate,
    SpeedResolve,
    FirstAttack,
    SecondAttack,
    TurnEnd,
    Continuing,
    BattleOver,
}

/// Collaborators a turn needs besides the session itself
pub struct TurnEnv<'a, R: Rng + ?Sized> {
    pub skills: &'a dyn SkillLookup,
    pub rng: &'a mut R,
    pub bosses: Option<&'a mut BossRuleEngine>,
    pub base_exp: u32,

    /// Day the battle is judged against for scheduled bosses
    pub weekday: Weekday,
}

impl<'a, R: Rng + ?Sized> TurnEnv<'a, R> {
    pub fn new(skills: &'a dyn SkillLookup, rng: &'a mut R) -> Self {
        Self {
            skills,
            rng,
            bosses: None,
            base_exp: DEFAULT_BASE_EXP,
            weekday: Utc::now().weekday(),
        }
    }

    pub fn with_bosses(mut self, bosses: &'a mut BossRuleEngine) -> Self {
        self.bosses = Some(bosses);
        self
    }

    pub fn with_base_exp(mut self, base_exp: u32) -> Self {
        self.base_exp = base_exp;
        self
    }

    pub fn with_weekday(mut self, weekday: Weekday) -> Self {
        self.weekday = weekday;
        self
    }
}

/// `floor(base × enemy level / 7)`
pub fn exp_reward(base_exp: u32, enemy_level: u8) -> u32 {
    base_exp * enemy_level as u32 / 7
}

/// Check a requested skill against a combatant's loadout without mutating.
///
/// An encored combatant is held to its last skill while that skill has PP.
pub fn resolve_choice(
    combatant: &Combatant,
    requested: u32,
    skills: &dyn SkillLookup,
) -> Result<u32, BattleError> {
    if let Some(forced) = encored_skill(combatant) {
        return Ok(forced);
    }

    if requested == BASIC_ATTACK_ID && combatant.usable_skills().next().is_none() {
        return Ok(BASIC_ATTACK_ID);
    }

    match combatant.slot(requested) {
        Some(slot) if slot.has_pp() => Ok(requested),
        Some(_) => Err(BattleError::NoPpLeft {
            skill_id: requested,
        }),
        None if skills.skill(requested).is_none() => Err(BattleError::UnknownSkill(requested)),
        None => Err(BattleError::SkillNotInLoadout {
            skill_id: requested,
        }),
    }
}

fn encored_skill(combatant: &Combatant) -> Option<u32> {
    if combatant.flags.encore_turns == 0 {
        return None;
    }
    let last = combatant.flags.last_skill?;
    combatant
        .slot(last)
        .filter(|slot| slot.has_pp())
        .map(|slot| slot.skill_id)
}

/// Resolve one full turn.
///
/// `enemy_skill` is the PVP opponent's choice; computer-controlled enemies
/// pick through the AI when it is `None`. Every rejection happens before any
/// state changes, and a session that is already over is returned untouched.
pub fn execute_turn<R: Rng + ?Sized>(
    session: &mut BattleSession,
    player_skill: u32,
    enemy_skill: Option<u32>,
    env: &mut TurnEnv<'_, R>,
) -> Result<TurnResult, BattleError> {
    if session.is_over() {
        return Ok(session.over_result());
    }
    if let Some(side) = session.pending_switch() {
        return Err(BattleError::MustSwitch { side });
    }

    let skills = env.skills;
    let player_choice = resolve_choice(session.active(Side::Player), player_skill, skills)?;
    let enemy_choice = match enemy_skill {
        Some(id) => resolve_choice(session.active(Side::Enemy), id, skills)?,
        None => {
            let (enemy, player) = session.pair(Side::Enemy);
            encored_skill(enemy).unwrap_or_else(|| select_skill(enemy, player, skills))
        }
    };
    let choices = [player_choice, enemy_choice];

    let mut result = TurnResult::new(session.turn() + 1);
    let mut blocked: [Option<BlockReason>; 2] = [None, None];
    let mut order = [Side::Player, Side::Enemy];
    let mut phase = TurnPhase::TurnStart;

    debug!(turn = result.turn, player_choice, enemy_choice, "turn start");

    loop {
        phase = match phase {
            TurnPhase::TurnStart => {
                if session.mark_started() {
                    if let (Some(fight), Some(engine)) =
                        (session.boss_fight(), env.bosses.as_deref_mut())
                    {
                        engine.reset(fight);
                    }
                    fire_both(session, Hook::BattleStart, env.rng);
                }
                fire_both(session, Hook::TurnStart, env.rng);
                if check_termination(session, &mut result, env) {
                    TurnPhase::BattleOver
                } else {
                    TurnPhase::StatusTick
                }
            }

            TurnPhase::StatusTick => {
                for side in Side::BOTH {
                    result.status_damage[side.index()] =
                        tracker::start_of_turn_damage(session.active_mut(side));
                }
                if check_termination(session, &mut result, env) {
                    TurnPhase::BattleOver
                } else if any_fainted(session) {
                    TurnPhase::TurnEnd
                } else {
                    TurnPhase::ActionGate
                }
            }

            TurnPhase::ActionGate => {
                for side in Side::BOTH {
                    blocked[side.index()] = tracker::action_gate(session.active_mut(side), env.rng);
                }
                TurnPhase::SpeedResolve
            }

            TurnPhase::SpeedResolve => {
                fire_both(session, Hook::BeforeSpeedCheck, env.rng);
                let contender = |side: Side| Contender {
                    priority: skills.skill_or_basic(choices[side.index()]).priority,
                    speed: session.active(side).effective_speed(),
                };
                let (player, enemy) = (contender(Side::Player), contender(Side::Enemy));
                let first = determine_first_move(&player, &enemy, env.rng);
                order = [first, first.opponent()];
                fire_both(session, Hook::AfterSpeedCheck, env.rng);
                TurnPhase::FirstAttack
            }

            TurnPhase::FirstAttack => {
                let side = order[0];
                result.first_attack = Some(attack(session, side, &choices, &blocked, true, env));
                if check_termination(session, &mut result, env) {
                    TurnPhase::BattleOver
                } else if any_fainted(session) {
                    TurnPhase::TurnEnd
                } else {
                    TurnPhase::SecondAttack
                }
            }

            TurnPhase::SecondAttack => {
                let side = order[1];
                if blocked[side.index()].is_none() {
                    blocked[side.index()] = tracker::check_flinch(session.active_mut(side));
                }
                result.second_attack = Some(attack(session, side, &choices, &blocked, false, env));
                if check_termination(session, &mut result, env) {
                    TurnPhase::BattleOver
                } else {
                    TurnPhase::TurnEnd
                }
            }

            TurnPhase::TurnEnd => {
                fire_both(session, Hook::TurnEnd, env.rng);
                for side in Side::BOTH {
                    tracker::end_of_turn(session.active_mut(side));
                }
                if check_termination(session, &mut result, env) {
                    TurnPhase::BattleOver
                } else {
                    TurnPhase::Continuing
                }
            }

            TurnPhase::Continuing => {
                result.needs_switch = session.pending_switch();
                session.advance_turn();
                break;
            }

            TurnPhase::BattleOver => {
                fire_both(session, Hook::BattleEnd, env.rng);
                session.advance_turn();
                break;
            }
        };
    }

    debug!(
        turn = result.turn,
        over = result.is_over,
        needs_switch = ?result.needs_switch,
        "turn resolved"
    );
    Ok(result)
}

fn attack<R: Rng + ?Sized>(
    session: &mut BattleSession,
    side: Side,
    choices: &[u32; 2],
    blocked: &[Option<BlockReason>; 2],
    moved_first: bool,
    env: &mut TurnEnv<'_, R>,
) -> AttackResult {
    let skill_id = choices[side.index()];
    if let Some(reason) = blocked[side.index()] {
        return blocked_attack(session, side, skill_id, reason);
    }

    let skills = env.skills;
    let skill = skills.skill_or_basic(skill_id);
    AttackRun::new(
        session,
        side,
        skill,
        moved_first,
        &mut *env.rng,
        env.bosses.as_deref_mut(),
    )
    .run()
}

fn fire_both<R: Rng + ?Sized>(session: &mut BattleSession, hook: Hook, rng: &mut R) {
    for side in Side::BOTH {
        fire_side_hook(session, side, hook, rng);
    }
}

fn any_fainted(session: &BattleSession) -> bool {
    Side::BOTH
        .into_iter()
        .any(|side| session.active(side).is_fainted())
}

/// End the battle when a whole party is down. Both down at once is a draw.
fn check_termination<R: Rng + ?Sized>(
    session: &mut BattleSession,
    result: &mut TurnResult,
    env: &TurnEnv<'_, R>,
) -> bool {
    let player_down = session.player.is_defeated();
    let enemy_down = session.enemy.is_defeated();
    let winner = match (player_down, enemy_down) {
        (false, false) => return false,
        (false, true) => Some(Side::Player),
        (true, false) => Some(Side::Enemy),
        (true, true) => None,
    };

    session.finish(winner, EndReason::Knockout);
    result.is_over = true;
    result.winner = winner;
    result.reason = Some(EndReason::Knockout);
    let pays_out = winner == Some(Side::Player) && !session.is_pvp();
    if pays_out && schedule_met(session, result, env) {
        result.exp_reward = Some(exp_reward(env.base_exp, session.active(Side::Enemy).level));
    }
    true
}

/// A won boss battle only pays out when it met the boss's weekday schedule
fn schedule_met<R: Rng + ?Sized>(
    session: &BattleSession,
    result: &TurnResult,
    env: &TurnEnv<'_, R>,
) -> bool {
    let (Some(boss_id), Some(engine)) = (session.boss_id(), env.bosses.as_deref()) else {
        return true;
    };
    let outcome = BossOutcome {
        weekday: env.weekday,
        map_id: session.map_id().unwrap_or_default(),
        rounds: result.turn,
        final_blow_crit: session.final_blow_crit(),
    };
    let met = engine.validate_schedule(boss_id, &outcome);
    if !met {
        info!(
            owner_id = session.owner_id,
            boss_id,
            ?outcome,
            "boss schedule not met, reward withheld"
        );
    }
    met
}
