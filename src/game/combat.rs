//! Combat system - projectile lifecycle and hit resolution

use std::collections::HashMap;

use super::entity::{
    Player, PlayerId, Projectile, ProjectileId, BULLET_DAMAGE, KILL_SCORE, PLAYER_RADIUS,
};

/// Outcome of one projectile connecting with one player
#[derive(Debug, Clone)]
pub struct HitOutcome {
    pub victim: PlayerId,
    /// Set only on a lethal hit with the shooter still connected
    pub killer: Option<PlayerId>,
    pub lethal: bool,
}

/// Combat system for the per-tick projectile and collision passes
pub struct CombatSystem;

impl CombatSystem {
    /// Advance every live projectile by the measured tick delta, then cull
    /// anything out of bounds or past its lifetime. Culled projectiles never
    /// reach hit resolution in the same tick.
    pub fn advance_projectiles(
        projectiles: &mut HashMap<ProjectileId, Projectile>,
        dt: f32,
        now_ms: u64,
    ) {
        for projectile in projectiles.values_mut() {
            projectile.advance(dt);
        }
        projectiles.retain(|_, p| !p.is_expired(now_ms));
    }

    /// Test every live projectile against every eligible player and apply
    /// damage and kill credit. Ids are sorted first so resolution order is
    /// stable. A projectile is removed the instant it connects, so it can
    /// hit at most one player.
    pub fn resolve_hits(
        players: &mut HashMap<PlayerId, Player>,
        projectiles: &mut HashMap<ProjectileId, Projectile>,
    ) -> Vec<HitOutcome> {
        let mut outcomes = Vec::new();

        let mut projectile_ids: Vec<ProjectileId> = projectiles.keys().cloned().collect();
        projectile_ids.sort();
        let mut player_ids: Vec<PlayerId> = players.keys().copied().collect();
        player_ids.sort();

        for projectile_id in projectile_ids {
            let Some(projectile) = projectiles.get(&projectile_id) else {
                continue;
            };
            let owner = projectile.owner;

            let mut hit: Option<(PlayerId, bool)> = None;
            for target_id in &player_ids {
                if *target_id == owner {
                    continue;
                }
                let Some(target) = players.get_mut(target_id) else {
                    continue;
                };
                if !target.is_alive() {
                    continue;
                }

                let dx = projectile.x - target.x;
                let dy = projectile.y - target.y;
                if dx * dx + dy * dy < PLAYER_RADIUS * PLAYER_RADIUS {
                    let lethal = target.apply_damage(BULLET_DAMAGE);
                    hit = Some((*target_id, lethal));
                    break;
                }
            }

            if let Some((victim, lethal)) = hit {
                projectiles.remove(&projectile_id);

                // Kill credit only if the shooter is still connected; a
                // disconnected owner's projectile still deals its damage.
                let killer = if lethal {
                    players.get_mut(&owner).map(|shooter| {
                        shooter.score += KILL_SCORE;
                        shooter.id
                    })
                } else {
                    None
                };

                outcomes.push(HitOutcome {
                    victim,
                    killer,
                    lethal,
                });
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{BULLET_LIFETIME_MS, PLAYER_MAX_HEALTH, WORLD_WIDTH};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player_at(x: f32, y: f32) -> Player {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut player = Player::spawn(PlayerId::new(), &mut rng);
        player.x = x;
        player.y = y;
        player
    }

    fn shot_at(owner: PlayerId, seq: u64, x: f32, y: f32) -> Projectile {
        Projectile {
            id: ProjectileId::generate(owner, seq),
            owner,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            created_at: 0,
        }
    }

    fn world_of(
        players: Vec<Player>,
        projectiles: Vec<Projectile>,
    ) -> (
        HashMap<PlayerId, Player>,
        HashMap<ProjectileId, Projectile>,
    ) {
        (
            players.into_iter().map(|p| (p.id, p)).collect(),
            projectiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        )
    }

    #[test]
    fn hit_applies_damage_and_removes_projectile() {
        let shooter = player_at(100.0, 100.0);
        let target = player_at(500.0, 500.0);
        let target_id = target.id;
        let shot = shot_at(shooter.id, 1, 510.0, 500.0);

        let (mut players, mut projectiles) = world_of(vec![shooter, target], vec![shot]);
        let outcomes = CombatSystem::resolve_hits(&mut players, &mut projectiles);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].victim, target_id);
        assert!(!outcomes[0].lethal);
        assert_eq!(players[&target_id].health, PLAYER_MAX_HEALTH - BULLET_DAMAGE);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn own_projectile_never_damages_shooter() {
        let shooter = player_at(100.0, 100.0);
        let shooter_id = shooter.id;
        let shot = shot_at(shooter_id, 1, 100.0, 100.0);

        let (mut players, mut projectiles) = world_of(vec![shooter], vec![shot]);
        let outcomes = CombatSystem::resolve_hits(&mut players, &mut projectiles);

        assert!(outcomes.is_empty());
        assert_eq!(players[&shooter_id].health, PLAYER_MAX_HEALTH);
        assert_eq!(projectiles.len(), 1);
    }

    #[test]
    fn projectile_hits_at_most_one_player() {
        let shooter = player_at(2000.0, 2000.0);
        let near = player_at(500.0, 500.0);
        let also_near = player_at(505.0, 500.0);
        let shot = shot_at(shooter.id, 1, 502.0, 500.0);

        let (mut players, mut projectiles) =
            world_of(vec![shooter, near, also_near], vec![shot]);
        let outcomes = CombatSystem::resolve_hits(&mut players, &mut projectiles);

        assert_eq!(outcomes.len(), 1);
        let damaged = players
            .values()
            .filter(|p| p.health < PLAYER_MAX_HEALTH)
            .count();
        assert_eq!(damaged, 1);
    }

    #[test]
    fn lethal_hit_credits_connected_shooter() {
        let shooter = player_at(2000.0, 2000.0);
        let shooter_id = shooter.id;
        let mut target = player_at(500.0, 500.0);
        target.health = BULLET_DAMAGE; // one hit from death
        let target_id = target.id;
        let shot = shot_at(shooter_id, 1, 500.0, 500.0);

        let (mut players, mut projectiles) = world_of(vec![shooter, target], vec![shot]);
        let outcomes = CombatSystem::resolve_hits(&mut players, &mut projectiles);

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].lethal);
        assert_eq!(outcomes[0].killer, Some(shooter_id));
        assert_eq!(players[&shooter_id].score, KILL_SCORE);
        assert!(!players[&target_id].is_alive());
    }

    #[test]
    fn disconnected_shooters_projectile_still_kills_without_credit() {
        let mut target = player_at(500.0, 500.0);
        target.health = BULLET_DAMAGE;
        let target_id = target.id;
        let gone = PlayerId::new(); // owner no longer in the world
        let shot = shot_at(gone, 1, 500.0, 500.0);

        let (mut players, mut projectiles) = world_of(vec![target], vec![shot]);
        let outcomes = CombatSystem::resolve_hits(&mut players, &mut projectiles);

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].lethal);
        assert_eq!(outcomes[0].killer, None);
        assert!(!players[&target_id].is_alive());
    }

    #[test]
    fn dead_players_are_untargetable() {
        let shooter = player_at(2000.0, 2000.0);
        let mut corpse = player_at(500.0, 500.0);
        corpse.health = 0.0;
        let corpse_id = corpse.id;
        let shot = shot_at(shooter.id, 1, 500.0, 500.0);

        let (mut players, mut projectiles) = world_of(vec![shooter, corpse], vec![shot]);
        let outcomes = CombatSystem::resolve_hits(&mut players, &mut projectiles);

        assert!(outcomes.is_empty());
        assert_eq!(players[&corpse_id].health, 0.0);
        assert_eq!(projectiles.len(), 1);
    }

    #[test]
    fn advance_culls_expired_before_resolution() {
        let owner = PlayerId::new();
        let now = BULLET_LIFETIME_MS + 1;

        let aged = shot_at(owner, 1, 1500.0, 1500.0); // created_at 0, past lifetime
        let mut escaping = shot_at(owner, 2, WORLD_WIDTH - 1.0, 1500.0);
        escaping.vel_x = 400.0;
        escaping.created_at = now;
        let mut live = shot_at(owner, 3, 1500.0, 1600.0);
        live.created_at = now;
        let live_id = live.id.clone();

        let (_, mut projectiles) = world_of(vec![], vec![aged, escaping, live]);
        CombatSystem::advance_projectiles(&mut projectiles, 0.5, now);

        assert_eq!(projectiles.len(), 1);
        assert!(projectiles.contains_key(&live_id));
    }

    #[test]
    fn advance_keeps_live_projectiles_moving() {
        let owner = PlayerId::new();
        let mut shot = shot_at(owner, 1, 1000.0, 1000.0);
        shot.vel_x = 400.0;
        shot.created_at = 5000;

        let (_, mut projectiles) = world_of(vec![], vec![shot.clone()]);
        CombatSystem::advance_projectiles(&mut projectiles, 0.25, 5100);

        let moved = &projectiles[&shot.id];
        assert!((moved.x - 1100.0).abs() < 1e-3);
        assert_eq!(moved.y, 1000.0);
    }
}
