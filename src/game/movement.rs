//! Player movement, aiming, and fire gating

use super::entity::{
    Player, Projectile, ProjectileId, BULLET_SPEED, FIRE_COOLDOWN_MS, MUZZLE_OFFSET, PLAYER_RADIUS,
    PLAYER_SPEED, WORLD_HEIGHT, WORLD_WIDTH,
};
use super::InputFrame;

/// Movement system for applying input intents to player state
pub struct MovementSystem;

impl MovementSystem {
    /// Apply one input frame: integrate axis-aligned velocity, clamp to the
    /// world, and update facing when an aim point is present.
    ///
    /// Each held directional flag contributes the full per-axis speed, so
    /// diagonal movement is faster than cardinal movement. This mirrors the
    /// client's expectations and is intentional, not an oversight.
    pub fn apply_input(player: &mut Player, input: &InputFrame, dt: f32) {
        let mut vel_x = 0.0;
        let mut vel_y = 0.0;
        if input.up {
            vel_y -= PLAYER_SPEED;
        }
        if input.down {
            vel_y += PLAYER_SPEED;
        }
        if input.left {
            vel_x -= PLAYER_SPEED;
        }
        if input.right {
            vel_x += PLAYER_SPEED;
        }

        player.x += vel_x * dt;
        player.y += vel_y * dt;

        // Keep the full collision circle inside the world
        player.x = player.x.clamp(PLAYER_RADIUS, WORLD_WIDTH - PLAYER_RADIUS);
        player.y = player.y.clamp(PLAYER_RADIUS, WORLD_HEIGHT - PLAYER_RADIUS);

        if let (Some(mouse_x), Some(mouse_y)) = (input.mouse_x, input.mouse_y) {
            player.rotation = (mouse_y - player.y).atan2(mouse_x - player.x);
        }
    }

    /// Fire-rate gate: true (and stamps the shot time) when the cooldown has
    /// elapsed, false for a silent no-op.
    pub fn try_fire(player: &mut Player, now_ms: u64) -> bool {
        if now_ms.saturating_sub(player.last_shot) > FIRE_COOLDOWN_MS {
            player.last_shot = now_ms;
            true
        } else {
            false
        }
    }

    /// Build the projectile for a successful fire action: spawned ahead of
    /// the muzzle along the facing direction, at fixed speed.
    pub fn spawn_shot(player: &Player, id: ProjectileId, now_ms: u64) -> Projectile {
        let dir_x = player.rotation.cos();
        let dir_y = player.rotation.sin();
        Projectile {
            id,
            owner: player.id,
            x: player.x + dir_x * MUZZLE_OFFSET,
            y: player.y + dir_y * MUZZLE_OFFSET,
            vel_x: dir_x * BULLET_SPEED,
            vel_y: dir_y * BULLET_SPEED,
            created_at: now_ms,
        }
    }
}
