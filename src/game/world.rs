//! World state and authoritative tick loop

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

use crate::util::time::{unix_millis, INPUT_STEP_SECS, TICK_DURATION_MICROS};
use crate::ws::protocol::{LeaderboardEntry, PlayerSnapshot, ProjectileSnapshot, ServerMsg};

use super::combat::CombatSystem;
use super::entity::{Player, PlayerId, Projectile, ProjectileId};
use super::movement::MovementSystem;
use super::ranking::RankingTracker;
use super::{InputFrame, Outbound, SessionEvent};

/// The authoritative world state, exclusively owned by the world task.
/// Every mutation happens through one of the methods below, each of which is
/// an atomic unit of work relative to the tick pipeline.
pub struct World {
    pub players: HashMap<PlayerId, Player>,
    pub projectiles: HashMap<ProjectileId, Projectile>,
    /// Cached ranking projection, regenerated every ranking cycle
    pub leaderboard: Vec<LeaderboardEntry>,
    rng: ChaCha8Rng,
    next_shot_seq: u64,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            players: HashMap::new(),
            projectiles: HashMap::new(),
            leaderboard: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_shot_seq: 0,
        }
    }

    /// Create and insert the player for a new connection
    pub fn connect_player(&mut self, id: PlayerId) -> PlayerSnapshot {
        let player = Player::spawn(id, &mut self.rng);
        let snapshot = PlayerSnapshot::from(&player);
        self.players.insert(id, player);
        snapshot
    }

    /// Remove the player; their in-flight projectiles stay live
    pub fn disconnect_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Apply one input frame to this connection's player. Missing or dead
    /// players make the whole update a silent no-op.
    pub fn apply_input(
        &mut self,
        id: PlayerId,
        frame: &InputFrame,
        now_ms: u64,
    ) -> Option<PlayerSnapshot> {
        let player = self.players.get_mut(&id)?;
        if !player.is_alive() {
            return None;
        }

        MovementSystem::apply_input(player, frame, INPUT_STEP_SECS);

        if frame.shooting && MovementSystem::try_fire(player, now_ms) {
            self.next_shot_seq += 1;
            let shot_id = ProjectileId::generate(id, self.next_shot_seq);
            let projectile = MovementSystem::spawn_shot(player, shot_id, now_ms);
            self.projectiles.insert(projectile.id.clone(), projectile);
        }

        let player = &self.players[&id];
        Some(PlayerSnapshot::from(player))
    }

    /// Reset position and health; identity, name and score persist
    pub fn respawn_player(&mut self, id: PlayerId) -> Option<PlayerSnapshot> {
        let player = self.players.get_mut(&id)?;
        player.respawn(&mut self.rng);
        Some(PlayerSnapshot::from(&*player))
    }

    /// Full snapshot for a newly connected client
    pub fn game_state(&self) -> ServerMsg {
        ServerMsg::GameState {
            players: self
                .players
                .iter()
                .map(|(id, p)| (*id, PlayerSnapshot::from(p)))
                .collect(),
            bullets: self.projectile_snapshots(),
        }
    }

    /// Per-tick projectile broadcast payload
    pub fn bullet_update(&self) -> ServerMsg {
        ServerMsg::BulletUpdate {
            bullets: self.projectile_snapshots(),
        }
    }

    fn projectile_snapshots(&self) -> HashMap<ProjectileId, ProjectileSnapshot> {
        self.projectiles
            .iter()
            .map(|(id, p)| (id.clone(), ProjectileSnapshot::from(p)))
            .collect()
    }
}

/// Handle to the running world task
#[derive(Clone)]
pub struct WorldHandle {
    pub event_tx: mpsc::Sender<SessionEvent>,
    pub broadcast_tx: broadcast::Sender<Outbound>,
    pub player_count: Arc<AtomicUsize>,
}

impl WorldHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }
}

/// The authoritative simulation task: one fixed-rate tick loop plus
/// event-driven session handling, serialized on a single task so no input
/// can interleave with a tick in progress.
pub struct GameWorld {
    world: World,
    event_rx: mpsc::Receiver<SessionEvent>,
    broadcast_tx: broadcast::Sender<Outbound>,
    ranking: RankingTracker,
    player_count: Arc<AtomicUsize>,
}

impl GameWorld {
    pub fn new(seed: u64) -> (Self, WorldHandle) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (broadcast_tx, _) = broadcast::channel(256);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = WorldHandle {
            event_tx,
            broadcast_tx: broadcast_tx.clone(),
            player_count: player_count.clone(),
        };

        let game_world = Self {
            world: World::new(seed),
            event_rx,
            broadcast_tx,
            ranking: RankingTracker::new(),
            player_count,
        };

        (game_world, handle)
    }

    /// Run the tick loop. A tick that overruns its interval delays the next
    /// one; there is no catch-up burst.
    pub async fn run(mut self) {
        info!("World simulation started");

        let tick_duration = Duration::from_micros(TICK_DURATION_MICROS);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    // Timer delivery jitters; integrate with measured time
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;
                    self.run_tick(dt);
                }
                event = self.event_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break, // every handle dropped, shut down
                },
            }
        }

        info!("World simulation stopped");
    }

    /// One full simulation tick: advance projectiles, resolve hits, publish
    /// the ranking on its boundary, broadcast the projectile set.
    fn run_tick(&mut self, dt: f32) {
        let now_ms = unix_millis();

        CombatSystem::advance_projectiles(&mut self.world.projectiles, dt, now_ms);

        let outcomes =
            CombatSystem::resolve_hits(&mut self.world.players, &mut self.world.projectiles);
        for outcome in &outcomes {
            if let Some(killer_id) = outcome.killer {
                let killer = self.world.players.get(&killer_id).map(|p| p.name.clone());
                let victim = self.world.players.get(&outcome.victim).map(|p| p.name.clone());
                if let (Some(killer), Some(victim)) = (killer, victim) {
                    info!(%killer, %victim, "Player killed");
                    let _ = self
                        .broadcast_tx
                        .send(Outbound::to_all(ServerMsg::PlayerKilled { killer, victim }));
                }
            }

            // Victim state goes out whether or not the hit was lethal
            if let Some(victim) = self.world.players.get(&outcome.victim) {
                let _ = self.broadcast_tx.send(Outbound::to_all(ServerMsg::PlayerUpdate {
                    player: PlayerSnapshot::from(victim),
                }));
            }
        }

        if self.ranking.should_publish(dt) {
            self.world.leaderboard = RankingTracker::compute(self.world.players.values());
            let _ = self.broadcast_tx.send(Outbound::to_all(ServerMsg::Leaderboard {
                entries: self.world.leaderboard.clone(),
            }));
        }

        let _ = self.broadcast_tx.send(Outbound::to_all(self.world.bullet_update()));
    }

    /// Handle one session event as an atomic unit of work
    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connect { player_id, reply } => {
                let joined = self.world.connect_player(player_id);
                self.player_count
                    .store(self.world.players.len(), Ordering::Relaxed);

                // Full state to the new client, join notice to the rest
                let _ = reply.send(self.world.game_state());
                let _ = self.broadcast_tx.send(Outbound::to_others(
                    player_id,
                    ServerMsg::PlayerJoined { player: joined },
                ));

                info!(
                    player_id = %player_id,
                    player_count = self.world.players.len(),
                    "Player connected"
                );
            }
            SessionEvent::Input { player_id, frame } => {
                if let Some(player) = self.world.apply_input(player_id, &frame, unix_millis()) {
                    let _ = self
                        .broadcast_tx
                        .send(Outbound::to_all(ServerMsg::PlayerUpdate { player }));
                }
            }
            SessionEvent::Respawn { player_id } => {
                if let Some(player) = self.world.respawn_player(player_id) {
                    let _ = self
                        .broadcast_tx
                        .send(Outbound::to_all(ServerMsg::PlayerUpdate { player }));
                }
            }
            SessionEvent::Disconnect { player_id } => {
                if self.world.disconnect_player(player_id).is_some() {
                    self.player_count
                        .store(self.world.players.len(), Ordering::Relaxed);
                    let _ = self.broadcast_tx.send(Outbound::to_others(
                        player_id,
                        ServerMsg::PlayerLeft { player_id },
                    ));

                    info!(
                        player_id = %player_id,
                        player_count = self.world.players.len(),
                        "Player disconnected"
                    );
                }
            }
        }
    }
}
