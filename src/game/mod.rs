//! Game simulation modules

pub mod combat;
pub mod entity;
pub mod movement;
pub mod ranking;
pub mod world;

pub use world::{GameWorld, World, WorldHandle};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::ws::protocol::ServerMsg;
use entity::PlayerId;

/// One input intent frame from a client. Every field defaults, so a sparse
/// or partially malformed frame is applied rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputFrame {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Aim point; facing is unchanged when absent
    pub mouse_x: Option<f32>,
    pub mouse_y: Option<f32>,
    pub shooting: bool,
}

/// Session lifecycle and input events funneled into the world task
#[derive(Debug)]
pub enum SessionEvent {
    /// A connection opened; the world replies with the full game state
    Connect {
        player_id: PlayerId,
        reply: oneshot::Sender<ServerMsg>,
    },
    /// An input frame arrived for this connection's player
    Input {
        player_id: PlayerId,
        frame: InputFrame,
    },
    /// The player asked to come back after death
    Respawn { player_id: PlayerId },
    /// The connection closed
    Disconnect { player_id: PlayerId },
}

/// Broadcast envelope. `skip` routes join/leave notifications to everyone
/// except the subject connection; the session writer filters on it.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub skip: Option<PlayerId>,
    pub msg: ServerMsg,
}

impl Outbound {
    pub fn to_all(msg: ServerMsg) -> Self {
        Self { skip: None, msg }
    }

    pub fn to_others(skip: PlayerId, msg: ServerMsg) -> Self {
        Self {
            skip: Some(skip),
            msg,
        }
    }
}
