//! Headless battle simulator
//!
//! Runs seeded PVE battles between generated combatants and reports win
//! rates. No networking, no persistence.
//!
//! Usage:
//!   cargo run -p skirmish-server --bin skirmish-sim -- --battles 500 --seed 7

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use skirmish_battle::ai::select_skill;
use skirmish_battle::formula::{BaseStats, EffortValues};
use skirmish_battle::{
    BattleSession, Combatant, EffectRegistry, Element, Party, PetSource, SkillBook, SkillLookup,
    SkillSlot, TurnEnv, execute_turn,
};
use skirmish_protocol::Side;
use skirmish_server::{ArenaConfig, Content};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "skirmish-sim")]
#[command(about = "Run seeded PVE battles headlessly", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of battles to run
    #[arg(short, long, default_value_t = 100)]
    battles: u32,

    /// RNG seed; every run with the same seed is identical
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Level of both combatants
    #[arg(short, long, default_value_t = 30)]
    level: u8,

    /// Party size per side
    #[arg(long, default_value_t = 1)]
    party: usize,

    /// Give up on a battle after this many turns
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Skill table JSON (defaults to the built-in demo table)
    #[arg(long)]
    skills: Option<PathBuf>,

    /// Arena config JSON, for the experience base
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct Tally {
    player_wins: u32,
    enemy_wins: u32,
    draws: u32,
    unfinished: u32,
    turns: u64,
    exp: u64,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let content = match &cli.skills {
        Some(path) => Content::load(path, None)?,
        None => Content::demo()?,
    };
    let config = match &cli.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    let skill_ids = content.skills.ids();
    anyhow::ensure!(!skill_ids.is_empty(), "skill table is empty");

    info!(battles = cli.battles, seed = cli.seed, level = cli.level, "simulation started");
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut tally = Tally::default();

    for battle in 0..cli.battles {
        let player = party(&mut rng, &content, &skill_ids, cli.level, cli.party, 1)?;
        let enemy = party(&mut rng, &content, &skill_ids, cli.level, cli.party, 2)?;
        let mut session = BattleSession::new(1, skirmish_battle::BattleKind::Wild, player, enemy)
            .with_context(|| format!("Failed to set up battle {battle}"))?;

        run_battle(&mut session, &content.skills, &config, cli.max_turns, &mut rng, &mut tally)?;
    }

    let finished = cli.battles - tally.unfinished;
    let pct = |n: u32| 100.0 * n as f64 / cli.battles.max(1) as f64;
    println!("=== skirmish-sim: {} battles, seed {} ===", cli.battles, cli.seed);
    println!("  player wins : {:>6} ({:.1}%)", tally.player_wins, pct(tally.player_wins));
    println!("  enemy wins  : {:>6} ({:.1}%)", tally.enemy_wins, pct(tally.enemy_wins));
    println!("  draws       : {:>6} ({:.1}%)", tally.draws, pct(tally.draws));
    println!("  unfinished  : {:>6}", tally.unfinished);
    if finished > 0 {
        println!("  avg turns   : {:>9.2}", tally.turns as f64 / finished as f64);
    }
    if tally.player_wins > 0 {
        println!("  avg exp     : {:>9.2}", tally.exp as f64 / tally.player_wins as f64);
    }
    Ok(())
}

/// Both sides are driven by the AI; fainted actives are replaced in slot order
fn run_battle(
    session: &mut BattleSession,
    skills: &SkillBook,
    config: &ArenaConfig,
    max_turns: u32,
    rng: &mut StdRng,
    tally: &mut Tally,
) -> Result<()> {
    while session.turn() < max_turns {
        if let Some(side) = session.pending_switch() {
            let slot = session.party(side).bench().map(|(slot, _)| slot).next();
            if let Some(slot) = slot {
                session.switch_in(side, slot, rng)?;
            }
        }

        let (player, enemy) = session.pair(Side::Player);
        let choice = select_skill(player, enemy, skills);
        let mut env = TurnEnv::new(skills, rng).with_base_exp(config.base_exp);
        let result = execute_turn(session, choice, None, &mut env)?;
        debug!(turn = result.turn, over = result.is_over, "turn");

        if result.is_over {
            tally.turns += session.turn() as u64;
            match result.winner {
                Some(Side::Player) => {
                    tally.player_wins += 1;
                    tally.exp += result.exp_reward.unwrap_or(0) as u64;
                }
                Some(Side::Enemy) => tally.enemy_wins += 1,
                None => tally.draws += 1,
            }
            return Ok(());
        }
    }
    tally.unfinished += 1;
    Ok(())
}

fn party(
    rng: &mut StdRng,
    content: &Content,
    skill_ids: &[u32],
    level: u8,
    size: usize,
    owner_id: u64,
) -> Result<Party> {
    let members = (0..size.max(1))
        .map(|i| {
            let pet_id = owner_id * 100 + i as u64;
            combatant(rng, &content.skills, &content.effects, skill_ids, level, owner_id, pet_id)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Party::new(members))
}

fn combatant(
    rng: &mut StdRng,
    skills: &SkillBook,
    effects: &EffectRegistry,
    skill_ids: &[u32],
    level: u8,
    owner_id: u64,
    pet_id: u64,
) -> Result<Combatant> {
    let mut base_stat = || rng.gen_range(40..=120);
    let base = BaseStats {
        hp: base_stat(),
        atk: base_stat(),
        def: base_stat(),
        sp_atk: base_stat(),
        sp_def: base_stat(),
        speed: base_stat(),
    };
    let element = *Element::ALL.choose(rng).unwrap_or(&Element::Normal);
    let loadout = skill_ids
        .choose_multiple(rng, 4)
        .filter_map(|id| skills.skill(*id))
        .map(|skill| SkillSlot::new(skill.id, skill.max_pp))
        .collect();

    let source = PetSource {
        pet_id,
        owner_id,
        species_id: pet_id as u32,
        name: format!("sim-{pet_id}"),
        element,
        level,
        base,
        individual_value: None,
        effort: EffortValues::default(),
        nature_id: rng.gen_range(1..=25),
        skills: loadout,
        hp: None,
        catch_rate: 45,
        traits: Vec::new(),
    };
    Combatant::from_source(&source, effects)
        .with_context(|| format!("Failed to build combatant {pet_id}"))
}
