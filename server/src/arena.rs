//! Cloneable handle over the PVE registry and PVP hub

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use skirmish_battle::{BattleSession, Party};
use skirmish_protocol::{CaptureResult, EscapeResult, HpRecord, PlayerAction, TurnResult};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ArenaConfig;
use crate::content::Content;
use crate::error::ServerError;
use crate::pve::{PveRegistry, PveReply};
use crate::pvp::{PvpEvent, PvpHub, SweepReport};

/// Reply to a PVE action
#[derive(Debug, Clone, PartialEq)]
pub enum PveResponse {
    Turn(PveReply<TurnResult>),
    Switched(Vec<HpRecord>),
    Capture(PveReply<CaptureResult>),
    Escape(PveReply<EscapeResult>),
}

// Locks are always taken in field order
struct ArenaState {
    config: ArenaConfig,
    pve: Mutex<PveRegistry>,
    pvp: Mutex<PvpHub>,
    rng: Mutex<StdRng>,
}

#[derive(Clone)]
pub struct Arena {
    state: Arc<ArenaState>,
}

impl Arena {
    pub fn new(content: Content, config: ArenaConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = ArenaState {
            pve: Mutex::new(PveRegistry::new(content.clone(), config.clone())),
            pvp: Mutex::new(PvpHub::new(content.skills, config.clone())),
            rng: Mutex::new(rng),
            config,
        };
        Self {
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.state.config
    }

    // === PVE ===

    pub fn start_pve(&self, session: BattleSession) -> Result<(), ServerError> {
        let mut pve = lock(&self.state.pve, "pve");
        let owner_id = session.owner_id;
        if lock(&self.state.pvp, "pvp").is_seated(owner_id) {
            return Err(ServerError::AlreadyInBattle(owner_id));
        }
        pve.start(session)
    }

    /// Dispatch one player action against the owner's PVE battle
    pub fn pve_action(&self, owner_id: u64, action: PlayerAction) -> Result<PveResponse, ServerError> {
        let mut pve = lock(&self.state.pve, "pve");
        let mut rng = lock(&self.state.rng, "rng");
        let rng = &mut *rng;

        let response = match action {
            PlayerAction::UseSkill { skill_id } => {
                PveResponse::Turn(pve.use_skill(owner_id, skill_id, rng)?)
            }
            PlayerAction::Switch { slot } => PveResponse::Switched(pve.switch(owner_id, slot, rng)?),
            PlayerAction::Capture { ball } => PveResponse::Capture(pve.capture(owner_id, ball, rng)?),
            PlayerAction::Escape => PveResponse::Escape(pve.escape(owner_id, rng)?),
        };
        debug!(owner_id, ?action, "pve action handled");
        Ok(response)
    }

    pub fn pve_forfeit(&self, owner_id: u64) -> Result<Vec<HpRecord>, ServerError> {
        lock(&self.state.pve, "pve").forfeit(owner_id)
    }

    pub fn pve_hp(&self, owner_id: u64) -> Result<Vec<HpRecord>, ServerError> {
        lock(&self.state.pve, "pve").hp_snapshot(owner_id)
    }

    pub fn pve_count(&self) -> usize {
        lock(&self.state.pve, "pve").len()
    }

    // === PVP ===

    pub fn connect(&self, user: u64) -> mpsc::UnboundedReceiver<PvpEvent> {
        lock(&self.state.pvp, "pvp").connect(user)
    }

    pub fn invite(&self, from: u64, to: u64, party: Party) -> Result<(), ServerError> {
        let pve = lock(&self.state.pve, "pve");
        if pve.session(from).is_some() {
            return Err(ServerError::AlreadyInBattle(from));
        }
        lock(&self.state.pvp, "pvp").invite(from, to, party, Utc::now())
    }

    pub fn accept(&self, to: u64, from: u64, party: Party) -> Result<u64, ServerError> {
        let pve = lock(&self.state.pve, "pve");
        for user in [from, to] {
            if pve.session(user).is_some() {
                return Err(ServerError::AlreadyInBattle(user));
            }
        }
        lock(&self.state.pvp, "pvp").accept(to, from, party, Utc::now())
    }

    pub fn decline(&self, to: u64, from: u64) -> Result<(), ServerError> {
        lock(&self.state.pvp, "pvp").decline(to, from, Utc::now())
    }

    pub fn submit(&self, user: u64, action: PlayerAction) -> Result<(), ServerError> {
        let mut pvp = lock(&self.state.pvp, "pvp");
        let mut rng = lock(&self.state.rng, "rng");
        pvp.submit(user, action, &mut *rng)
    }

    pub fn disconnect(&self, user: u64) {
        lock(&self.state.pvp, "pvp").disconnect(user);
    }

    pub fn room_count(&self) -> usize {
        lock(&self.state.pvp, "pvp").room_count()
    }

    pub fn invite_count(&self) -> usize {
        lock(&self.state.pvp, "pvp").invite_count()
    }

    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        lock(&self.state.pvp, "pvp").sweep(now)
    }

    /// Start the periodic TTL sweep. It stops on shutdown, when the
    /// [`Reaper`] is dropped, or once every arena handle is gone.
    pub fn spawn_reaper(&self) -> Reaper {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let period = self.state.config.sweep_interval();
        let task = tokio::spawn(reap(Arc::downgrade(&self.state), period, shutdown_rx));
        Reaper { shutdown_tx, task }
    }
}

/// Background sweeper handle
pub struct Reaper {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Reaper {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            error!(%err, "reaper task failed");
        }
    }
}

async fn reap(state: Weak<ArenaState>, period: std::time::Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut tick = tokio::time::interval(period);
    info!(?period, "reaper started");

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = tick.tick() => {
                let Some(state) = state.upgrade() else {
                    break;
                };
                let report = lock(&state.pvp, "pvp").sweep(Utc::now());
                if report.invites + report.rooms > 0 {
                    info!(invites = report.invites, rooms = report.rooms, "expired pvp state reaped");
                }
            }
        }
    }
    info!("reaper stopped");
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        error!(lock = name, "lock poisoned, continuing with inner state");
        poisoned.into_inner()
    })
}
