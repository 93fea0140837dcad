//! Entity model - players, projectiles, and their identifiers

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// World dimensions in game units
pub const WORLD_WIDTH: f32 = 3000.0;
pub const WORLD_HEIGHT: f32 = 3000.0;

/// Player movement speed in units per second
pub const PLAYER_SPEED: f32 = 200.0;
/// Player hit radius, also the world-bounds clamp margin
pub const PLAYER_RADIUS: f32 = 25.0;
pub const PLAYER_MAX_HEALTH: f32 = 100.0;

/// Projectile speed in units per second
pub const BULLET_SPEED: f32 = 400.0;
/// Damage applied per projectile hit
pub const BULLET_DAMAGE: f32 = 25.0;
/// Projectile lifetime before expiry
pub const BULLET_LIFETIME_MS: u64 = 3000;
/// Spawn offset from the shooter along the facing direction
pub const MUZZLE_OFFSET: f32 = 30.0;

/// Minimum interval between a player's consecutive shots
pub const FIRE_COOLDOWN_MS: u64 = 200;
/// Score awarded for a kill
pub const KILL_SCORE: u32 = 100;

/// Stable identity of a connected player, assigned at connect time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique projectile identity: owning player plus a per-world monotonic
/// sequence number, collision-free for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectileId(String);

impl ProjectileId {
    pub fn generate(owner: PlayerId, seq: u64) -> Self {
        Self(format!("bullet_{}_{}", owner, seq))
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One connected combatant (authoritative state)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Facing angle in radians
    pub rotation: f32,
    /// May go negative on the killing hit; dead once <= 0
    pub health: f32,
    pub max_health: f32,
    pub score: u32,
    /// Unix millis of the last successful shot
    pub last_shot: u64,
    /// Cosmetic label, e.g. "hsl(212, 70%, 50%)"
    pub color: String,
}

impl Player {
    /// Create a freshly connected player at a random in-bounds position
    pub fn spawn(id: PlayerId, rng: &mut impl Rng) -> Self {
        let (x, y) = random_position(rng);
        Self {
            id,
            name: format!("Player{}", rng.gen_range(0..1000)),
            x,
            y,
            rotation: 0.0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            score: 0,
            last_shot: 0,
            color: format!("hsl({}, 70%, 50%)", rng.gen_range(0..360)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Apply damage, returns true if this hit was lethal
    pub fn apply_damage(&mut self, damage: f32) -> bool {
        self.health -= damage;
        self.health <= 0.0
    }

    /// Reset position and health; identity, name, score and color persist
    pub fn respawn(&mut self, rng: &mut impl Rng) {
        let (x, y) = random_position(rng);
        self.x = x;
        self.y = y;
        self.health = PLAYER_MAX_HEALTH;
    }
}

/// One in-flight shot (authoritative state)
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    /// Unix millis of creation
    pub created_at: u64,
}

impl Projectile {
    /// Advance along the constant velocity vector
    pub fn advance(&mut self, dt: f32) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
    }

    /// Expiry predicate, evaluated after moving: out of world bounds on
    /// either axis, or older than the lifetime cap.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.x < 0.0
            || self.x > WORLD_WIDTH
            || self.y < 0.0
            || self.y > WORLD_HEIGHT
            || now_ms.saturating_sub(self.created_at) > BULLET_LIFETIME_MS
    }
}

/// Random position with the clamp margin applied, so spawns never clip the
/// world edge.
fn random_position(rng: &mut impl Rng) -> (f32, f32) {
    (
        rng.gen_range(PLAYER_RADIUS..WORLD_WIDTH - PLAYER_RADIUS),
        rng.gen_range(PLAYER_RADIUS..WORLD_HEIGHT - PLAYER_RADIUS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn spawn_is_inside_clamped_bounds() {
        let mut rng = rng();
        for _ in 0..100 {
            let player = Player::spawn(PlayerId::new(), &mut rng);
            assert!(player.x >= PLAYER_RADIUS && player.x <= WORLD_WIDTH - PLAYER_RADIUS);
            assert!(player.y >= PLAYER_RADIUS && player.y <= WORLD_HEIGHT - PLAYER_RADIUS);
            assert_eq!(player.health, PLAYER_MAX_HEALTH);
            assert_eq!(player.score, 0);
        }
    }

    #[test]
    fn four_hits_are_lethal() {
        let mut rng = rng();
        let mut player = Player::spawn(PlayerId::new(), &mut rng);

        assert!(!player.apply_damage(BULLET_DAMAGE));
        assert!(!player.apply_damage(BULLET_DAMAGE));
        assert!(!player.apply_damage(BULLET_DAMAGE));
        assert!(player.apply_damage(BULLET_DAMAGE));
        assert_eq!(player.health, 0.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn respawn_preserves_identity_and_score() {
        let mut rng = rng();
        let mut player = Player::spawn(PlayerId::new(), &mut rng);
        let id = player.id;
        let name = player.name.clone();
        let color = player.color.clone();

        player.score = 300;
        player.apply_damage(PLAYER_MAX_HEALTH);
        assert!(!player.is_alive());

        player.respawn(&mut rng);

        assert_eq!(player.id, id);
        assert_eq!(player.name, name);
        assert_eq!(player.color, color);
        assert_eq!(player.score, 300);
        assert_eq!(player.health, PLAYER_MAX_HEALTH);
        assert!(player.x >= PLAYER_RADIUS && player.x <= WORLD_WIDTH - PLAYER_RADIUS);
    }

    #[test]
    fn projectile_ids_are_unique_per_sequence() {
        let owner = PlayerId::new();
        let a = ProjectileId::generate(owner, 1);
        let b = ProjectileId::generate(owner, 2);
        assert_ne!(a, b);
        assert_eq!(a, ProjectileId::generate(owner, 1));
    }

    #[test]
    fn projectile_expires_by_age() {
        let owner = PlayerId::new();
        let projectile = Projectile {
            id: ProjectileId::generate(owner, 1),
            owner,
            x: 1500.0,
            y: 1500.0,
            vel_x: 0.0,
            vel_y: 0.0,
            created_at: 10_000,
        };

        assert!(!projectile.is_expired(10_000 + BULLET_LIFETIME_MS));
        assert!(projectile.is_expired(10_001 + BULLET_LIFETIME_MS));
    }

    #[test]
    fn projectile_expires_by_bounds() {
        let owner = PlayerId::new();
        let mut projectile = Projectile {
            id: ProjectileId::generate(owner, 1),
            owner,
            x: WORLD_WIDTH - 1.0,
            y: 1500.0,
            vel_x: BULLET_SPEED,
            vel_y: 0.0,
            created_at: 0,
        };

        assert!(!projectile.is_expired(0));
        projectile.advance(0.5);
        assert!(projectile.is_expired(0));
    }
}
