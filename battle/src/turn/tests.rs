use std::sync::Arc;

use chrono::Weekday;
use rand::SeedableRng;
use rand::rngs::StdRng;
use skirmish_protocol::{EndReason, Side, TurnResult};

use super::*;
use crate::boss::{BossRuleBook, BossRuleEngine};
use crate::demo::{DEMO_BOSSES_JSON, demo_skill_book};
use crate::effect::{EffectRegistry, effect_ids};
use crate::error::BattleError;
use crate::formula::CoreStats;
use crate::session::BattleSession;
use crate::skill::SkillBook;
use crate::types::{Combatant, Element, Party, SkillSlot, StatusKind};

const TACKLE: u32 = 1;
const EMBER: u32 = 2;
const WATER_GUN: u32 = 3;
const QUICK_STRIKE: u32 = 6;
const LEECH_SEED: u32 = 7;
const GROWL: u32 = 9;
const NIGHT_SLASH: u32 = 31;

fn book() -> SkillBook {
    demo_skill_book(&EffectRegistry::builtin().unwrap()).unwrap()
}

fn custom_book(json: &str) -> SkillBook {
    SkillBook::from_json(json, &EffectRegistry::builtin().unwrap()).unwrap()
}

fn pet(pet_id: u64, speed: u32, skills: &[u32]) -> Combatant {
    let stats = CoreStats {
        max_hp: 200,
        atk: 80,
        def: 80,
        sp_atk: 80,
        sp_def: 80,
        speed,
    };
    let mut c = Combatant::new(pet_id, 30, Element::Normal, stats)
        .with_skills(skills.iter().map(|&id| SkillSlot::new(id, 10)));
    c.name = format!("pet-{pet_id}");
    c
}

fn regenerating(pet_id: u64, speed: u32, hp: u32) -> Combatant {
    let effect = EffectRegistry::builtin()
        .unwrap()
        .bind(effect_ids::REGENERATE, "10")
        .unwrap();
    let mut c = pet(pet_id, speed, &[GROWL]);
    c.add_passive(Arc::new(effect), None);
    c.set_hp(hp);
    c
}

fn wild(player: Combatant, enemy: Combatant) -> BattleSession {
    BattleSession::wild(1, Party::single(player), enemy).unwrap()
}

#[test]
fn test_turn_deals_damage_and_spends_pp() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = wild(pet(1, 100, &[TACKLE]), pet(2, 50, &[TACKLE]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap();

    assert_eq!(result.turn, 1);
    assert_eq!(session.turn(), 1);
    let first = result.first_attack.as_ref().unwrap();
    assert_eq!(first.side, Side::Player);
    assert!(first.damage > 0);
    assert_eq!(first.defender_remain_hp, 200 - first.damage);
    assert!(result.second_attack.is_some());
    assert!(!result.is_over);
    assert_eq!(session.active(Side::Player).slot(TACKLE).unwrap().pp, 9);
    assert_eq!(session.active(Side::Enemy).slot(TACKLE).unwrap().pp, 9);
}

#[test]
fn test_priority_beats_speed() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(3);
    let mut session = wild(pet(1, 10, &[QUICK_STRIKE]), pet(2, 200, &[TACKLE]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, QUICK_STRIKE, Some(TACKLE), &mut env).unwrap();

    assert_eq!(result.first_attack.unwrap().side, Side::Player);
    assert_eq!(result.second_attack.unwrap().side, Side::Enemy);
}

#[test]
fn test_rejected_choice_leaves_session_untouched() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(1);
    let mut player = pet(1, 100, &[TACKLE, EMBER]);
    player.slot_mut(EMBER).unwrap().pp = 0;
    let mut session = wild(player, pet(2, 50, &[TACKLE]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    assert_eq!(
        execute_turn(&mut session, WATER_GUN, Some(TACKLE), &mut env).unwrap_err(),
        BattleError::SkillNotInLoadout { skill_id: WATER_GUN }
    );
    assert_eq!(
        execute_turn(&mut session, 999, Some(TACKLE), &mut env).unwrap_err(),
        BattleError::UnknownSkill(999)
    );
    assert_eq!(
        execute_turn(&mut session, EMBER, Some(TACKLE), &mut env).unwrap_err(),
        BattleError::NoPpLeft { skill_id: EMBER }
    );

    assert_eq!(session.turn(), 0);
    assert_eq!(session.active(Side::Player).slot(TACKLE).unwrap().pp, 10);
    assert_eq!(session.active(Side::Enemy).hp(), 200);
}

#[test]
fn test_finished_session_is_returned_unchanged() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = wild(pet(1, 100, &[TACKLE]), pet(2, 50, &[TACKLE]));
    session.finish(Some(Side::Player), EndReason::Escape);

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap();

    assert!(result.is_over);
    assert!(result.first_attack.is_none());
    assert_eq!(session.turn(), 0);
    assert_eq!(session.active(Side::Player).slot(TACKLE).unwrap().pp, 10);
}

#[test]
fn test_knockout_ends_battle_with_exp() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(11);
    let mut enemy = pet(2, 50, &[TACKLE]);
    enemy.set_hp(1);
    let mut session = wild(pet(1, 100, &[TACKLE]), enemy);

    let mut env = TurnEnv::new(&skills, &mut rng).with_base_exp(70);
    let result = execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap();

    assert!(result.is_over);
    assert_eq!(result.winner, Some(Side::Player));
    assert_eq!(result.reason, Some(EndReason::Knockout));
    assert_eq!(result.exp_reward, Some(exp_reward(70, 30)));
    assert_eq!(result.exp_reward, Some(300));
    assert!(result.second_attack.is_none());
    assert!(session.is_over());
    assert_eq!(session.turn(), 1);
}

#[test]
fn test_exp_reward_floors() {
    assert_eq!(exp_reward(DEFAULT_BASE_EXP, 30), 428);
    assert_eq!(exp_reward(100, 1), 14);
    assert_eq!(exp_reward(0, 50), 0);
}

#[test]
fn test_pending_switch_blocks_turn() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(1);
    let player = Party::new(vec![pet(1, 100, &[TACKLE]), pet(3, 100, &[TACKLE])]);
    let mut session = BattleSession::wild(1, player, pet(2, 50, &[TACKLE])).unwrap();
    session.active_mut(Side::Player).set_hp(0);

    let mut env = TurnEnv::new(&skills, &mut rng);
    assert_eq!(
        execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap_err(),
        BattleError::MustSwitch { side: Side::Player }
    );
    assert_eq!(session.turn(), 0);
}

#[test]
fn test_status_knockout_requests_switch() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(5);
    let mut poisoned = pet(2, 50, &[TACKLE]);
    poisoned.set_hp(1);
    poisoned.status.set(StatusKind::Poison, 3);
    let enemy = Party::new(vec![poisoned, pet(4, 50, &[TACKLE])]);
    let mut session =
        BattleSession::new(1, crate::session::BattleKind::Wild, Party::single(pet(1, 100, &[TACKLE])), enemy)
            .unwrap();

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap();

    assert_eq!(result.status_damage[Side::Enemy.index()], 1);
    assert!(result.first_attack.is_none());
    assert!(!result.is_over);
    assert_eq!(result.needs_switch, Some(Side::Enemy));
    assert_eq!(session.active(Side::Player).slot(TACKLE).unwrap().pp, 10);
}

#[test]
fn test_double_status_knockout_is_a_draw() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(5);
    let mut player = pet(1, 100, &[TACKLE]);
    let mut enemy = pet(2, 50, &[TACKLE]);
    for c in [&mut player, &mut enemy] {
        c.set_hp(1);
        c.status.set(StatusKind::Poison, 2);
    }
    let mut session = wild(player, enemy);

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap();

    assert!(result.is_over);
    assert_eq!(result.winner, None);
    assert_eq!(result.reason, Some(EndReason::Knockout));
    assert_eq!(result.exp_reward, None);
}

#[test]
fn test_sleeping_attacker_keeps_pp() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(9);
    let mut player = pet(1, 100, &[TACKLE]);
    player.status.set(StatusKind::Sleep, 3);
    let mut session = wild(player, pet(2, 50, &[TACKLE]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap();

    let mine = result.attack_by(Side::Player).unwrap();
    assert!(mine.blocked);
    assert_eq!(mine.damage, 0);
    assert_eq!(session.active(Side::Player).slot(TACKLE).unwrap().pp, 10);
    assert_eq!(session.active(Side::Enemy).hp(), 200);
    assert!(!result.attack_by(Side::Enemy).unwrap().blocked);
}

#[test]
fn test_drain_reports_gain_hp() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(21);
    let mut player = pet(1, 100, &[LEECH_SEED]);
    player.set_hp(100);
    let mut session = wild(player, pet(2, 50, &[GROWL]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, LEECH_SEED, Some(GROWL), &mut env).unwrap();

    let first = result.first_attack.unwrap();
    assert!(first.damage > 0);
    assert_eq!(first.gain_hp, first.damage / 2);
    assert_eq!(first.attacker_remain_hp, 100 + first.gain_hp);
}

#[test]
fn test_boss_type_break_rejects_wrong_element() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(4);
    let rules = Arc::new(BossRuleBook::from_json(DEMO_BOSSES_JSON).unwrap());
    let mut engine = BossRuleEngine::new(rules);
    let mut session = BattleSession::boss(
        1,
        900,
        Party::single(pet(1, 100, &[EMBER, WATER_GUN])),
        pet(2, 50, &[GROWL]),
    )
    .unwrap();

    let mut env = TurnEnv::new(&skills, &mut rng).with_bosses(&mut engine);
    let blocked = execute_turn(&mut session, WATER_GUN, Some(GROWL), &mut env).unwrap();
    let hit = blocked.attack_by(Side::Player).unwrap();
    assert_eq!(hit.damage, 0);
    assert!(!hit.messages.is_empty());
    assert_eq!(session.active(Side::Enemy).hp(), 200);

    let landed = execute_turn(&mut session, EMBER, Some(GROWL), &mut env).unwrap();
    assert!(landed.attack_by(Side::Player).unwrap().damage > 0);
    let fight = session.boss_fight().unwrap();
    assert_eq!(engine.phase(fight).unwrap().type_index, 1);
}

fn scheduled_boss_win(map_id: u32, weekday: Weekday) -> TurnResult {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(11);
    let rules = Arc::new(BossRuleBook::from_json(DEMO_BOSSES_JSON).unwrap());
    let mut engine = BossRuleEngine::new(rules);
    let mut boss = pet(2, 50, &[TACKLE]);
    boss.set_hp(1);
    let mut session = BattleSession::boss(1, 902, Party::single(pet(1, 100, &[TACKLE])), boss)
        .unwrap()
        .with_map(map_id);

    let mut env = TurnEnv::new(&skills, &mut rng)
        .with_bosses(&mut engine)
        .with_weekday(weekday);
    execute_turn(&mut session, TACKLE, Some(TACKLE), &mut env).unwrap()
}

#[test]
fn test_scheduled_boss_pays_out_on_its_day() {
    let result = scheduled_boss_win(12, Weekday::Sat);
    assert!(result.is_over);
    assert_eq!(result.winner, Some(Side::Player));
    assert_eq!(result.exp_reward, Some(exp_reward(DEFAULT_BASE_EXP, 30)));
}

#[test]
fn test_scheduled_boss_withholds_reward_off_schedule() {
    for (map_id, weekday) in [(12, Weekday::Tue), (3, Weekday::Sat)] {
        let result = scheduled_boss_win(map_id, weekday);
        assert!(result.is_over);
        assert_eq!(result.winner, Some(Side::Player));
        assert_eq!(result.exp_reward, None, "map {map_id} on {weekday:?}");
    }
}

#[test]
fn test_crit_kill_schedule_reads_final_blow() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(16);
    let rules = BossRuleBook::from_json(
        r#"[{"bossId": 950, "schedule": {"weekdays": [0], "mapId": 4,
             "condition": {"kind": "critKill"}}}]"#,
    )
    .unwrap();
    let mut engine = BossRuleEngine::new(Arc::new(rules));
    let mut player = pet(1, 100, &[NIGHT_SLASH]);
    player.set_hp(50);
    let mut boss = pet(2, 50, &[TACKLE]);
    boss.set_hp(1);
    let mut session = BattleSession::boss(1, 950, Party::single(player), boss)
        .unwrap()
        .with_map(4);

    let mut env = TurnEnv::new(&skills, &mut rng)
        .with_bosses(&mut engine)
        .with_weekday(Weekday::Mon);
    let result = execute_turn(&mut session, NIGHT_SLASH, Some(TACKLE), &mut env).unwrap();

    assert!(result.first_attack.unwrap().is_crit);
    assert!(session.final_blow_crit());
    assert_eq!(result.exp_reward, Some(exp_reward(DEFAULT_BASE_EXP, 30)));
}

#[test]
fn test_flinch_blocks_slower_attacker() {
    let skills = custom_book(
        r#"[{"id": 40, "name": "Headbutt", "category": "physical", "element": "normal",
             "power": 30, "maxPp": 15, "sideEffect": 12, "sideEffectArg": "100"}]"#,
    );
    let mut rng = StdRng::seed_from_u64(2);
    let mut session = wild(pet(1, 100, &[40]), pet(2, 50, &[40]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, 40, Some(40), &mut env).unwrap();

    assert!(result.second_attack.unwrap().blocked);
    assert_eq!(session.active(Side::Enemy).slot(40).unwrap().pp, 10);
    assert!(!session.active(Side::Enemy).flags.flinched);
}

#[test]
fn test_encore_forces_last_skill() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(8);
    let mut player = pet(1, 100, &[TACKLE, GROWL]);
    player.flags.encore_turns = 2;
    player.flags.last_skill = Some(TACKLE);
    let mut session = wild(player, pet(2, 50, &[GROWL]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, GROWL, Some(GROWL), &mut env).unwrap();

    assert_eq!(result.attack_by(Side::Player).unwrap().skill_id, TACKLE);
    assert_eq!(session.active(Side::Player).slot(GROWL).unwrap().pp, 10);
    assert_eq!(session.active(Side::Player).flags.encore_turns, 1);
}

#[test]
fn test_multi_hit_reports_hit_count() {
    let skills = custom_book(
        r#"[{"id": 41, "name": "Triple Jab", "category": "physical", "element": "fighting",
             "power": 15, "maxPp": 10, "sideEffect": 11, "sideEffectArg": "3 3"}]"#,
    );
    let mut rng = StdRng::seed_from_u64(6);
    let mut session = wild(pet(1, 100, &[41]), pet(2, 50, &[41]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, 41, Some(41), &mut env).unwrap();

    let first = result.first_attack.unwrap();
    assert_eq!(first.atk_times, 3);
    assert!(first.damage >= 3);
}

#[test]
fn test_missing_skill_config_uses_basic_attack() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(12);
    let mut session = wild(pet(1, 100, &[500]), pet(2, 50, &[GROWL]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, 500, Some(GROWL), &mut env).unwrap();

    let first = result.first_attack.unwrap();
    assert_eq!(first.skill_id, crate::skill::BASIC_ATTACK_ID);
    assert!(first.damage > 0);
}

#[test]
fn test_basic_attack_allowed_without_pp() {
    let skills = book();
    let mut player = pet(1, 100, &[TACKLE]);
    player.slot_mut(TACKLE).unwrap().pp = 0;

    assert_eq!(resolve_choice(&player, 0, &skills), Ok(0));
    assert_eq!(
        resolve_choice(&player, TACKLE, &skills),
        Err(BattleError::NoPpLeft { skill_id: TACKLE })
    );
}

#[test]
fn test_ai_picks_enemy_skill_when_unspecified() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(13);
    let mut session = wild(pet(1, 100, &[TACKLE]), pet(2, 50, &[TACKLE, GROWL]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, TACKLE, None, &mut env).unwrap();

    let enemy = result.attack_by(Side::Enemy).unwrap();
    assert!(enemy.skill_id == TACKLE || enemy.skill_id == GROWL);
}

#[test]
fn test_regenerate_trait_heals_at_turn_end() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(14);
    let mut session = wild(regenerating(1, 100, 100), pet(2, 50, &[GROWL]));

    let mut env = TurnEnv::new(&skills, &mut rng);
    execute_turn(&mut session, GROWL, Some(GROWL), &mut env).unwrap();

    assert_eq!(session.active(Side::Player).hp(), 120);
}

#[test]
fn test_fainted_combatant_stays_down_at_turn_end() {
    let skills = book();
    let mut rng = StdRng::seed_from_u64(15);
    let player = Party::new(vec![regenerating(1, 10, 1), pet(3, 10, &[TACKLE])]);
    let mut session = BattleSession::wild(1, player, pet(2, 200, &[TACKLE])).unwrap();

    let mut env = TurnEnv::new(&skills, &mut rng);
    let result = execute_turn(&mut session, GROWL, Some(TACKLE), &mut env).unwrap();

    let first = result.first_attack.as_ref().unwrap();
    assert_eq!(first.side, Side::Enemy);
    assert_eq!(first.defender_remain_hp, 0);
    assert!(result.second_attack.is_none());
    assert!(!result.is_over);
    assert_eq!(session.active(Side::Player).hp(), 0);
    assert_eq!(result.needs_switch, Some(Side::Player));
}
