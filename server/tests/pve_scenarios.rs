use skirmish_battle::formula::CoreStats;
use skirmish_battle::{BattleError, BattleSession, CaptureRefusal, Combatant, Element, Party, SkillSlot};
use skirmish_protocol::{EscapeRefusal, PlayerAction, Side};
use skirmish_server::{Arena, ArenaConfig, Content, PveResponse, ServerError};

const OWNER: u64 = 7;

fn combatant(pet_id: u64, max_hp: u32, power: u32, speed: u32) -> Combatant {
    let stats = CoreStats {
        max_hp,
        atk: power,
        def: power,
        sp_atk: power,
        sp_def: power,
        speed,
    };
    Combatant::new(pet_id, 30, Element::Normal, stats).with_skills([SkillSlot::new(1, 30)])
}

fn arena_with(config: ArenaConfig) -> Arena {
    Arena::new(
        Content::demo().unwrap(),
        ArenaConfig {
            seed: Some(11),
            ..config
        },
    )
}

fn wild_battle(arena: &Arena, player_speed: u32, wild_speed: u32) {
    let player = Party::single(combatant(1, 250, 200, player_speed));
    let wild = combatant(50, 60, 20, wild_speed);
    arena
        .start_pve(BattleSession::wild(OWNER, player, wild).unwrap())
        .unwrap();
}

#[test]
fn test_wild_battle_runs_to_a_knockout() {
    let arena = arena_with(ArenaConfig::default());
    wild_battle(&arena, 100, 10);

    let mut last = None;
    for _ in 0..30 {
        let PveResponse::Turn(reply) = arena
            .pve_action(OWNER, PlayerAction::UseSkill { skill_id: 1 })
            .unwrap()
        else {
            panic!("a skill resolves a turn");
        };
        let ended = reply.ended();
        last = Some(reply);
        if ended {
            break;
        }
    }

    let reply = last.unwrap();
    assert!(reply.ended());
    assert!(reply.outcome.is_over);
    assert_eq!(reply.outcome.winner, Some(Side::Player));
    assert!(reply.outcome.exp_reward.unwrap() > 0);
    assert_eq!(reply.final_hp.unwrap().len(), 2);

    assert_eq!(arena.pve_count(), 0);
    assert_eq!(
        arena
            .pve_action(OWNER, PlayerAction::UseSkill { skill_id: 1 })
            .unwrap_err(),
        ServerError::NoBattle(OWNER)
    );
}

#[test]
fn test_guaranteed_escape_ends_without_winner() {
    let arena = arena_with(ArenaConfig::default());
    wild_battle(&arena, 1000, 1);

    let PveResponse::Escape(reply) = arena.pve_action(OWNER, PlayerAction::Escape).unwrap() else {
        panic!("escape answers with an escape record");
    };
    assert!(reply.outcome.success);
    assert_eq!(reply.outcome.attempts, 1);
    assert!(reply.ended());
    assert_eq!(arena.pve_count(), 0);
}

#[test]
fn test_escape_attempts_are_capped() {
    let arena = arena_with(ArenaConfig {
        max_escape_attempts: 1,
        ..ArenaConfig::default()
    });
    wild_battle(&arena, 1, 1000);

    let PveResponse::Escape(first) = arena.pve_action(OWNER, PlayerAction::Escape).unwrap() else {
        panic!("escape answers with an escape record");
    };
    assert!(first.outcome.can_escape);
    assert!(!first.outcome.success);

    let PveResponse::Escape(second) = arena.pve_action(OWNER, PlayerAction::Escape).unwrap() else {
        panic!("escape answers with an escape record");
    };
    assert!(!second.outcome.can_escape);
    assert_eq!(second.outcome.refusal, Some(EscapeRefusal::TooManyAttempts));
    assert_eq!(second.outcome.attempts, 1);
    assert_eq!(arena.pve_count(), 1);
}

#[test]
fn test_master_ball_captures_and_ends_the_battle() {
    let arena = arena_with(ArenaConfig::default());
    wild_battle(&arena, 100, 10);

    let PveResponse::Capture(reply) = arena
        .pve_action(OWNER, PlayerAction::Capture { ball: 5 })
        .unwrap()
    else {
        panic!("capture answers with a capture record");
    };
    assert!(reply.outcome.success);
    assert!(reply.ended());
    assert_eq!(arena.pve_count(), 0);
}

#[test]
fn test_boss_refuses_capture_and_escape() {
    let arena = arena_with(ArenaConfig::default());
    let player = Party::single(combatant(1, 250, 100, 100));
    let boss = combatant(900, 2000, 100, 50);
    arena
        .start_pve(BattleSession::boss(OWNER, 900, player, boss).unwrap())
        .unwrap();

    assert_eq!(
        arena
            .pve_action(OWNER, PlayerAction::Capture { ball: 5 })
            .unwrap_err(),
        ServerError::Battle(BattleError::CaptureRefused(CaptureRefusal::Boss))
    );

    let PveResponse::Escape(reply) = arena.pve_action(OWNER, PlayerAction::Escape).unwrap() else {
        panic!("escape answers with an escape record");
    };
    assert_eq!(reply.outcome.refusal, Some(EscapeRefusal::BossBattle));
    assert!(!reply.ended());

    let final_hp = arena.pve_forfeit(OWNER).unwrap();
    assert_eq!(final_hp.len(), 2);
    assert_eq!(arena.pve_count(), 0);
}

#[test]
fn test_second_pve_battle_is_rejected() {
    let arena = arena_with(ArenaConfig::default());
    wild_battle(&arena, 100, 10);

    let again = BattleSession::wild(
        OWNER,
        Party::single(combatant(2, 100, 50, 50)),
        combatant(51, 60, 20, 10),
    )
    .unwrap();
    assert_eq!(
        arena.start_pve(again).unwrap_err(),
        ServerError::AlreadyInBattle(OWNER)
    );
    assert_eq!(arena.pve_hp(OWNER).unwrap()[0].hp, 250);
}
