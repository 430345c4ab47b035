//! Arena state and authoritative tick loop

use dashmap::DashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::time::TICK_DURATION_MICROS;
use crate::ws::protocol::{ClientMsg, GameEvent, PlayerInfo, ServerMsg};

use super::combat::CombatSystem;
use super::controls::ControlState;
use super::player::{Player, PlayerOpts};
use super::position::PositionState;
use super::snapshot::SnapshotBuilder;
use super::tuning::Tuning;
use super::PlayerInput;

/// Arena state (owned by the arena task)
pub struct ArenaState {
    pub id: Uuid,
    pub seed: u64,
    pub tick: u64,
    /// Players in join order
    pub players: Vec<Player>,
    pub tuning: Tuning,
    pub rng: ChaCha8Rng,
    pub max_players: usize,
}

impl ArenaState {
    pub fn new(id: Uuid, seed: u64, max_players: usize, tuning: Tuning) -> Self {
        Self {
            id,
            seed,
            tick: 0,
            players: Vec::new(),
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_players,
        }
    }

    /// Generate a spawn pose for a new player, away from the walls
    pub fn generate_spawn_position(&mut self) -> PositionState {
        let margin_x = self.tuning.universe_width * 0.1;
        let margin_y = self.tuning.universe_height * 0.1;
        let x = self
            .rng
            .gen_range(margin_x..self.tuning.universe_width - margin_x);
        let y = self
            .rng
            .gen_range(margin_y..self.tuning.universe_height - margin_y);
        let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
        PositionState::new(x, y, angle)
    }

    pub fn player(&self, id: &Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn player_mut(&mut self, id: &Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == *id)
    }
}

/// Slot counter value once an arena has shut down; no reservation can succeed
const CLOSED: usize = usize::MAX;

/// Handle to a running arena
#[derive(Clone)]
pub struct ArenaHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub server_tx: broadcast::Sender<ServerMsg>,
    /// Players currently in the simulation, written by the arena task
    pub player_count: Arc<AtomicUsize>,
    /// Sessions holding a seat, written at assignment time
    slots: Arc<AtomicUsize>,
    max_players: usize,
}

impl ArenaHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    /// Seats held by connected sessions
    pub fn reserved_slots(&self) -> usize {
        match self.slots.load(Ordering::Acquire) {
            CLOSED => 0,
            n => n,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.slots.load(Ordering::Acquire) == CLOSED
    }

    /// Claim a seat if the arena has room and is still running
    pub fn try_reserve(&self) -> Option<ArenaSlot> {
        let max = self.max_players;
        self.slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then(|| n + 1)
            })
            .ok()
            .map(|_| ArenaSlot {
                handle: self.clone(),
            })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.server_tx.subscribe()
    }
}

/// A seat in an arena, held for the lifetime of a session and released on drop
pub struct ArenaSlot {
    handle: ArenaHandle,
}

impl ArenaSlot {
    pub fn handle(&self) -> &ArenaHandle {
        &self.handle
    }
}

impl Drop for ArenaSlot {
    fn drop(&mut self) {
        self.handle.slots.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Registry of all active arenas
pub struct ArenaRegistry {
    arenas: DashMap<Uuid, ArenaHandle>,
    max_players: usize,
    /// Fixed seed for every arena, random when unset
    seed: Option<u64>,
}

impl ArenaRegistry {
    pub fn new(max_players: usize, seed: Option<u64>) -> Self {
        Self {
            arenas: DashMap::new(),
            max_players: max_players.max(1),
            seed,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<ArenaHandle> {
        self.arenas.get(id).map(|a| a.value().clone())
    }

    pub fn insert(&self, handle: ArenaHandle) {
        self.arenas.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<ArenaHandle> {
        self.arenas.remove(id).map(|(_, h)| h)
    }

    pub fn active_arenas(&self) -> usize {
        self.arenas.len()
    }

    pub fn total_players(&self) -> usize {
        self.arenas.iter().map(|a| a.value().player_count()).sum()
    }

    pub fn handles(&self) -> Vec<ArenaHandle> {
        self.arenas.iter().map(|a| a.value().clone()).collect()
    }

    /// Reserve a seat in the first running arena with room
    pub fn find_available(&self) -> Option<ArenaSlot> {
        self.arenas
            .iter()
            .find_map(|a| a.value().try_reserve())
    }

    /// Reserve a seat, starting a new arena when all are full.
    ///
    /// The seat is taken before the caller's join reaches the arena task, so
    /// concurrent connections never overfill an arena.
    pub fn find_or_create(self: &Arc<Self>) -> ArenaSlot {
        loop {
            if let Some(slot) = self.find_available() {
                return slot;
            }

            let id = Uuid::new_v4();
            let seed = self.seed.unwrap_or_else(rand::random);
            let (arena, handle) = GameArena::new(id, seed, self.max_players, Tuning::default());

            // Claimed before anyone else can see the arena
            let Some(slot) = handle.try_reserve() else {
                warn!(arena_id = %id, "Fresh arena refused a seat");
                continue;
            };
            self.insert(handle);

            let registry = Arc::clone(self);
            tokio::spawn(async move {
                arena.run().await;
                registry.remove(&id);
                info!(arena_id = %id, "Arena removed from registry");
            });

            return slot;
        }
    }
}

/// The authoritative arena
pub struct GameArena {
    state: ArenaState,
    input_rx: mpsc::Receiver<PlayerInput>,
    server_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    /// Events collected since the last snapshot
    pending_events: Vec<GameEvent>,
    player_count: Arc<AtomicUsize>,
    slots: Arc<AtomicUsize>,
}

impl GameArena {
    /// Create a new arena
    pub fn new(id: Uuid, seed: u64, max_players: usize, tuning: Tuning) -> (Self, ArenaHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (server_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));
        let slots = Arc::new(AtomicUsize::new(0));

        let handle = ArenaHandle {
            id,
            input_tx,
            server_tx: server_tx.clone(),
            player_count: player_count.clone(),
            slots: slots.clone(),
            max_players,
        };

        let arena = Self {
            snapshot_builder: SnapshotBuilder::new(tuning.sync_interval_ticks),
            state: ArenaState::new(id, seed, max_players, tuning),
            input_rx,
            server_tx,
            pending_events: Vec::new(),
            player_count,
            slots,
        };

        (arena, handle)
    }

    pub fn state(&self) -> &ArenaState {
        &self.state
    }

    /// Run the authoritative tick loop
    pub async fn run(mut self) {
        info!(arena_id = %self.state.id, seed = self.state.seed, "Arena started");

        let mut tick_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            self.process_inputs();
            self.step();

            if self.try_close() {
                info!(arena_id = %self.state.id, "No players or sessions left, ending arena");
                break;
            }
        }
    }

    /// Shut the arena once it is empty and no session holds a seat.
    ///
    /// Marks the seat counter closed in the same step, so a session cannot
    /// reserve a seat in an arena that is about to stop.
    fn try_close(&self) -> bool {
        self.state.players.is_empty()
            && self
                .slots
                .compare_exchange(0, CLOSED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// One fixed-step frame: tick every player, resolve breath, sync.
    pub fn step(&mut self) {
        let events = self.run_tick();
        self.pending_events.extend(events);

        if self.snapshot_builder.should_send() {
            let events = std::mem::take(&mut self.pending_events);
            let snapshot = self
                .snapshot_builder
                .build(self.state.tick, &self.state.players, events);
            let _ = self.server_tx.send(snapshot);
        }
    }

    /// Drain pending inputs
    fn process_inputs(&mut self) {
        while let Ok(input) = self.input_rx.try_recv() {
            self.handle_input(input);
        }
    }

    pub fn handle_input(&mut self, input: PlayerInput) {
        match input.msg {
            ClientMsg::Join { name } => self.handle_join(input.player_id, name),
            ClientMsg::Controls { controls } => self.handle_controls(input.player_id, controls),
            ClientMsg::Ping { t } => {
                let _ = self.server_tx.send(ServerMsg::Pong {
                    player_id: input.player_id,
                    t,
                });
            }
            ClientMsg::Leave => self.handle_leave(input.player_id),
        }
    }

    /// Handle player join request
    fn handle_join(&mut self, player_id: Uuid, name: Option<String>) {
        if self.state.player(&player_id).is_some() {
            warn!(player_id = %player_id, "Player already in arena");
            return;
        }

        if self.state.players.len() >= self.state.max_players {
            warn!(arena_id = %self.state.id, player_id = %player_id, "Join refused, arena full");
            let _ = self.server_tx.send(ServerMsg::Error {
                player_id: Some(player_id),
                code: "arena_full".to_string(),
                message: "Arena is full".to_string(),
            });
            return;
        }

        let position = self.state.generate_spawn_position();
        let mut opts = PlayerOpts::new(player_id).with_position(position);
        if let Some(name) = name {
            opts = opts.with_name(name);
        }
        let player = Player::new(opts, &self.state.tuning);

        let info = PlayerInfo {
            player_id,
            name: player.name.clone(),
        };

        self.state.players.push(player);
        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);

        let _ = self.server_tx.send(ServerMsg::PlayerJoined { player: info });

        let players: Vec<PlayerInfo> = self
            .state
            .players
            .iter()
            .map(|p| PlayerInfo {
                player_id: p.id,
                name: p.name.clone(),
            })
            .collect();

        let _ = self.server_tx.send(ServerMsg::Joined {
            arena_id: self.state.id,
            seed: self.state.seed,
            players,
        });

        // New players need positions right away
        self.snapshot_builder.force_next();

        info!(
            arena_id = %self.state.id,
            player_id = %player_id,
            player_count = self.state.players.len(),
            "Player joined arena"
        );
    }

    /// Store the latest controls; a burning player's are ignored by its tick
    fn handle_controls(&mut self, player_id: Uuid, controls: ControlState) {
        match self.state.player_mut(&player_id) {
            Some(player) => player.controls = controls,
            None => debug!(player_id = %player_id, "Controls for unknown player"),
        }
    }

    /// Handle player leave
    fn handle_leave(&mut self, player_id: Uuid) {
        let before = self.state.players.len();
        self.state.players.retain(|p| p.id != player_id);
        if self.state.players.len() == before {
            return;
        }

        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);

        let _ = self.server_tx.send(ServerMsg::PlayerLeft {
            player_id,
            reason: "disconnected".to_string(),
        });

        info!(
            arena_id = %self.state.id,
            player_id = %player_id,
            "Player left arena"
        );
    }

    /// Run a single simulation tick
    fn run_tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.state.tick += 1;

        let tuning = self.state.tuning;

        // Movement first: breath must see every post-movement position
        for player in self.state.players.iter_mut() {
            let was_alive = player.is_alive();
            let before = player.controls;
            let after = player.tick(&tuning);

            if after != before {
                let _ = self.server_tx.send(ServerMsg::ControlsOverride {
                    player_id: player.id,
                    controls: after,
                });
            }

            if was_alive && player.is_dying() {
                info!(
                    arena_id = %self.state.id,
                    player_id = %player.id,
                    damage = player.damage,
                    "Player ignited"
                );
                events.push(GameEvent::Ignited {
                    player_id: player.id,
                });
                self.snapshot_builder.force_next();
            }
        }

        let hits = CombatSystem::resolve_breaths(&mut self.state.players, &tuning);
        events.extend(hits.into_iter().map(|hit| GameEvent::Breath {
            attacker_id: hit.attacker_id,
            target_id: hit.target_id,
            damage: hit.damage,
            bearing: hit.bearing,
        }));

        events.extend(self.remove_burnt_out());

        events
    }

    /// Drop players whose burn animation has finished
    fn remove_burnt_out(&mut self) -> Vec<GameEvent> {
        let tuning = self.state.tuning;
        let burnt: Vec<Uuid> = self
            .state
            .players
            .iter()
            .filter(|p| p.is_burnt_out(&tuning))
            .map(|p| p.id)
            .collect();

        if burnt.is_empty() {
            return Vec::new();
        }

        self.state.players.retain(|p| !p.is_burnt_out(&tuning));
        self.player_count
            .store(self.state.players.len(), Ordering::Relaxed);

        burnt
            .into_iter()
            .map(|player_id| {
                info!(arena_id = %self.state.id, player_id = %player_id, "Player burned out");
                GameEvent::Burned { player_id }
            })
            .collect()
    }
}
