//! One attack, start to finish, through every effect hook

use std::sync::Arc;

use rand::Rng;
use skirmish_protocol::{AttackResult, Side, Stat};
use tracing::{debug, trace};

use crate::boss::{BossHit, BossRuleEngine};
use crate::effect::{AttackTally, BoundEffect, EffectContext, Hook, Role, apply_results};
use crate::formula::{CritInput, DamageInput, DamageOptions, check_crit, check_hit, compute_damage};
use crate::session::BattleSession;
use crate::skill::SkillDefinition;
use crate::types::{Combatant, StatusKind};

/// Attack-stat multiplier while weakened
const WEAKEN_MULTIPLIER: f64 = 0.5;

/// Damage multiplier against a guarding defender
const GUARD_MULTIPLIER: f64 = 0.5;

/// Damage multiplier while berserk
const BERSERK_MULTIPLIER: f64 = 1.5;

/// Attack state carried between hooks
#[derive(Debug, Clone, Copy)]
struct InFlight {
    damage: u32,
    fixed_damage: Option<u32>,
    hits: u8,
    force_crit: bool,
    is_crit: bool,
    damage_dealt: u32,
}

impl Default for InFlight {
    fn default() -> Self {
        Self {
            damage: 0,
            fixed_damage: None,
            hits: 1,
            force_crit: false,
            is_crit: false,
            damage_dealt: 0,
        }
    }
}

pub(super) struct AttackRun<'s, 'k, R: Rng + ?Sized> {
    session: &'s mut BattleSession,
    side: Side,
    skill: &'k SkillDefinition,
    moved_first: bool,
    rng: &'s mut R,
    bosses: Option<&'s mut BossRuleEngine>,
    flight: InFlight,
    tally: AttackTally,
}

impl<'s, 'k, R: Rng + ?Sized> AttackRun<'s, 'k, R> {
    pub fn new(
        session: &'s mut BattleSession,
        side: Side,
        skill: &'k SkillDefinition,
        moved_first: bool,
        rng: &'s mut R,
        bosses: Option<&'s mut BossRuleEngine>,
    ) -> Self {
        Self {
            session,
            side,
            skill,
            moved_first,
            rng,
            bosses,
            flight: InFlight::default(),
            tally: AttackTally::default(),
        }
    }

    /// Resolve the attack and report it
    pub fn run(mut self) -> AttackResult {
        let skill = self.skill;
        let mut record = AttackResult::idle(self.session.owner_of(self.side), self.side, skill.id);

        {
            let attacker = self.session.active_mut(self.side);
            attacker.spend_pp(skill.id);
            attacker.flags.last_skill = Some(skill.id);
        }
        trace!(side = %self.side, skill_id = skill.id, "attack start");

        self.fire(Hook::BeforeSkill);
        self.fire(Hook::OnAttack);

        // === Hit check ===
        self.fire(Hook::BeforeHitCheck);
        let accuracy_stage = self.session.active(self.side).stages.get(Stat::Accuracy);
        let hit = check_hit(skill.accuracy, accuracy_stage, self.rng);
        self.fire(Hook::AfterHitCheck);

        if !hit {
            record.missed = true;
            self.tally
                .messages
                .push(format!("{} missed", self.session.active(self.side).name));
            self.fire(Hook::OnMiss);
            self.fire(Hook::OnEvade);
            return self.finish(record);
        }

        self.fire(Hook::OnHit);
        self.fire(Hook::OnAttacked);

        let deals_damage = skill.is_damaging()
            || skill
                .effect
                .as_ref()
                .is_some_and(|e| e.fires_at(Hook::BeforeDamageCalc));

        if deals_damage {
            self.resolve_crit();
            self.resolve_damage();
            record.atk_times = self.flight.hits;
        } else {
            record.atk_times = 1;
        }

        self.fire(Hook::AfterSkill);
        if self.tally.statuses_applied > 0 {
            self.fire(Hook::OnStatusApplied);
        }
        if self.tally.gain_hp > 0 {
            self.fire(Hook::OnHeal);
        }

        self.finish(record)
    }

    fn resolve_crit(&mut self) {
        if !self.skill.is_damaging() {
            return;
        }
        self.fire(Hook::BeforeCritCheck);
        let crit = self.flight.force_crit || {
            let (attacker, defender) = self.session.pair(self.side);
            let input = CritInput {
                base_rate: self.skill.crit_rate,
                speed_stage: attacker.stages.get(Stat::Speed),
                special: self.skill.special_crit,
                moved_first: self.moved_first,
                self_hp_ratio: attacker.hp_ratio(),
                foe_hp_ratio: defender.hp_ratio(),
            };
            check_crit(&input, self.rng)
        };
        self.flight.is_crit = crit;
        self.fire(Hook::AfterCritCheck);
        if crit {
            self.tally.messages.push("A critical hit".to_string());
            self.fire(Hook::OnCrit);
        }
    }

    fn resolve_damage(&mut self) {
        self.fire(Hook::BeforeDamageCalc);
        let hits = self.flight.hits.max(1);
        self.flight.hits = hits;

        let damage = match self.flight.fixed_damage {
            Some(fixed) => fixed,
            None => {
                let (attacker, defender) = self.session.pair(self.side);
                let opts = damage_options(attacker, defender, self.flight.is_crit);
                let input = DamageInput {
                    attacker: &attacker.stats,
                    defender: &defender.stats,
                    attacker_element: attacker.element,
                    defender_element: defender.element,
                    level: attacker.level,
                    power: self.skill.power,
                    skill_element: self.skill.element,
                    category: self.skill.category,
                    attacker_stages: &attacker.stages,
                    defender_stages: &defender.stages,
                };
                (0..hits)
                    .map(|_| compute_damage(&input, &opts, self.rng).damage)
                    .fold(0u32, u32::saturating_add)
            }
        };
        self.flight.damage = damage;

        self.fire(Hook::AfterDamageCalc);
        self.fire(Hook::BeforeDamageApply);
        self.flight.damage = self.boss_gate(self.flight.damage);

        let defender_side = self.side.opponent();
        let dealt = self
            .session
            .active_mut(defender_side)
            .take_damage(self.flight.damage);
        self.flight.damage_dealt = dealt;
        debug!(side = %self.side, skill_id = self.skill.id, dealt, crit = self.flight.is_crit, "damage applied");

        if dealt > 0 {
            self.fire(Hook::OnReceiveDamage);
            self.fire(Hook::OnHpChange);
        }
        if self.session.active(defender_side).is_fainted() {
            if defender_side == Side::Enemy {
                self.session.record_enemy_knockout(self.flight.is_crit);
            }
            let name = self.session.active(defender_side).name.clone();
            self.tally.messages.push(format!("{name} fainted"));
            self.fire(Hook::OnKo);
        }
        self.fire(Hook::AfterDamageApply);
    }

    /// Boss rules apply to hits landing on the enemy side of a boss battle
    fn boss_gate(&mut self, damage: u32) -> u32 {
        let Some(fight) = self.session.boss_fight() else {
            return damage;
        };
        if self.side != Side::Player {
            return damage;
        }
        let Some(engine) = self.bosses.as_deref_mut() else {
            return damage;
        };
        let (attacker, boss) = self.session.pair(self.side);
        let verdict = engine.filter_damage(
            fight,
            &BossHit {
                skill_id: self.skill.id,
                skill_element: self.skill.element,
                attacker_species: attacker.species_id,
                damage,
                boss_hp: boss.hp(),
            },
        );
        if let Some(note) = verdict.note {
            self.tally.messages.push(note);
        }
        verdict.damage
    }

    /// Run every effect bound to `hook`: the skill's side effect, then the
    /// attacker's passives, then the defender's. Results are committed before
    /// returning.
    fn fire(&mut self, hook: Hook) {
        let results = {
            let (attacker, defender) = self.session.pair(self.side);
            let mut sources: Vec<(Role, Arc<BoundEffect>)> = Vec::new();
            if let Some(effect) = self.skill.effect.as_ref().filter(|e| e.fires_at(hook)) {
                sources.push((Role::Attacker, Arc::clone(effect)));
            }
            for (role, owner) in [(Role::Attacker, attacker), (Role::Defender, defender)] {
                sources.extend(
                    owner
                        .passives
                        .iter()
                        .filter(|p| p.effect.fires_at(hook))
                        .map(|p| (role, Arc::clone(&p.effect))),
                );
            }
            if sources.is_empty() {
                return;
            }

            let mut ctx = EffectContext::new(hook, attacker, defender).with_skill(self.skill);
            ctx.moved_first = self.moved_first;
            ctx.damage = self.flight.damage;
            ctx.fixed_damage = self.flight.fixed_damage;
            ctx.hits = self.flight.hits;
            ctx.force_crit = self.flight.force_crit;
            ctx.is_crit = self.flight.is_crit;
            ctx.damage_dealt = self.flight.damage_dealt;

            let mut results = Vec::new();
            for (owner, effect) in &sources {
                ctx.owner = *owner;
                results.extend(effect.fire(&mut ctx, self.rng));
            }

            self.flight.damage = ctx.damage;
            self.flight.fixed_damage = ctx.fixed_damage;
            self.flight.hits = ctx.hits;
            self.flight.force_crit = ctx.force_crit;
            results
        };

        let (attacker, defender) = self.session.pair_mut(self.side);
        apply_results(attacker, defender, results, &mut self.tally);
    }

    fn finish(self, mut record: AttackResult) -> AttackResult {
        record.damage = self.flight.damage_dealt;
        record.gain_hp = self.tally.gain_hp;
        record.is_crit = self.flight.is_crit;
        record.messages = self.tally.messages;
        snapshot(&mut record, self.session, self.side);
        record
    }
}

/// The record for an attacker that lost its action
pub(super) fn blocked_attack(
    session: &BattleSession,
    side: Side,
    skill_id: u32,
    reason: impl std::fmt::Display,
) -> AttackResult {
    let mut record = AttackResult::idle(session.owner_of(side), side, skill_id);
    record.blocked = true;
    record
        .messages
        .push(format!("{} {reason}", session.active(side).name));
    snapshot(&mut record, session, side);
    record
}

/// Copy post-attack HP, status and stages into a record
fn snapshot(record: &mut AttackResult, session: &BattleSession, side: Side) {
    let (attacker, defender) = session.pair(side);
    record.attacker_remain_hp = attacker.hp();
    record.attacker_max_hp = attacker.max_hp();
    record.defender_remain_hp = defender.hp();
    record.attacker_status = attacker.status.as_array();
    record.attacker_stages = attacker.stages.as_array();
    record.defender_status = defender.status.as_array();
    record.defender_stages = defender.stages.as_array();
}

/// Status-driven multipliers on top of the base formula
fn damage_options(attacker: &Combatant, defender: &Combatant, is_crit: bool) -> DamageOptions {
    let mut opts = DamageOptions {
        is_crit,
        ..DamageOptions::default()
    };
    if attacker.status.is_active(StatusKind::Weaken) {
        opts.seal_multiplier = WEAKEN_MULTIPLIER;
    }
    if defender.status.is_active(StatusKind::Guard) {
        opts.other_multiplier *= GUARD_MULTIPLIER;
    }
    if attacker.status.is_active(StatusKind::Berserk) {
        opts.other_multiplier *= BERSERK_MULTIPLIER;
    }
    opts
}
