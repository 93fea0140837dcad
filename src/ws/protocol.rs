//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::entity::{Player, PlayerId, Projectile, ProjectileId};
use crate::game::InputFrame;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Movement/aim/fire intent for the sending connection's player
    PlayerInput(InputFrame),

    /// Request to come back after death
    Respawn,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Full world snapshot, sent once to a newly connected client
    GameState {
        players: HashMap<PlayerId, PlayerSnapshot>,
        bullets: HashMap<ProjectileId, ProjectileSnapshot>,
    },

    /// A new player entered the world (sent to everyone else)
    PlayerJoined { player: PlayerSnapshot },

    /// One player's updated state, emitted on every successful
    /// input, respawn, or hit
    PlayerUpdate { player: PlayerSnapshot },

    /// A player disconnected (sent to everyone else)
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: PlayerId },

    /// A lethal hit landed
    PlayerKilled { killer: String, victim: String },

    /// Full projectile set, broadcast once per tick
    BulletUpdate {
        bullets: HashMap<ProjectileId, ProjectileSnapshot>,
    },

    /// Top-10 ranking, broadcast every five seconds
    Leaderboard { entries: Vec<LeaderboardEntry> },
}

/// Player state on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Facing angle in radians
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub score: u32,
    pub color: String,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            x: p.x,
            y: p.y,
            rotation: p.rotation,
            health: p.health,
            max_health: p.max_health,
            score: p.score,
            color: p.color.clone(),
        }
    }
}

/// Projectile state on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileSnapshot {
    pub id: ProjectileId,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    /// The shooter
    pub player_id: PlayerId,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id.clone(),
            x: p.x,
            y: p.y,
            vel_x: p.vel_x,
            vel_y: p.vel_y,
            player_id: p.owner,
        }
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}
