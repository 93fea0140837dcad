//! Ranking tracker - periodic top-10 leaderboard recomputation

use super::entity::Player;
use crate::ws::protocol::LeaderboardEntry;

/// Maximum number of leaderboard entries
pub const LEADERBOARD_SIZE: usize = 10;
/// Wall-clock interval between leaderboard broadcasts
pub const LEADERBOARD_INTERVAL_MS: u64 = 5000;

/// Tracks elapsed simulation time and recomputes the ranking projection when
/// the broadcast interval has passed.
pub struct RankingTracker {
    elapsed_secs: f32,
}

impl RankingTracker {
    pub fn new() -> Self {
        Self { elapsed_secs: 0.0 }
    }

    /// Advance the accumulator by one tick's delta; true when the interval
    /// boundary was crossed and a fresh ranking should be published.
    pub fn should_publish(&mut self, dt: f32) -> bool {
        self.elapsed_secs += dt;
        if self.elapsed_secs >= LEADERBOARD_INTERVAL_MS as f32 / 1000.0 {
            self.elapsed_secs = 0.0;
            true
        } else {
            false
        }
    }

    /// Project players into a descending-score top-10. The sort is stable,
    /// so equal scores keep their relative input order.
    pub fn compute<'a>(players: impl Iterator<Item = &'a Player>) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = players
            .map(|p| LeaderboardEntry {
                name: p.name.clone(),
                score: p.score,
            })
            .collect();

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_SIZE);
        entries
    }
}

impl Default for RankingTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::PlayerId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player_with_score(name: &str, score: u32) -> Player {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut player = Player::spawn(PlayerId::new(), &mut rng);
        player.name = name.to_string();
        player.score = score;
        player
    }

    #[test]
    fn orders_by_descending_score_with_stable_ties() {
        let players = vec![
            player_with_score("a", 50),
            player_with_score("b", 200),
            player_with_score("c", 10),
            player_with_score("d", 200),
        ];

        let entries = RankingTracker::compute(players.iter());

        let named: Vec<(&str, u32)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.score))
            .collect();
        assert_eq!(named, vec![("b", 200), ("d", 200), ("a", 50), ("c", 10)]);
    }

    #[test]
    fn truncates_to_ten_entries() {
        let players: Vec<Player> = (0..15)
            .map(|i| player_with_score(&format!("p{i}"), i))
            .collect();

        let entries = RankingTracker::compute(players.iter());

        assert_eq!(entries.len(), LEADERBOARD_SIZE);
        assert_eq!(entries[0].score, 14);
        assert_eq!(entries[LEADERBOARD_SIZE - 1].score, 5);
    }

    #[test]
    fn publishes_every_five_seconds_of_accumulated_time() {
        let mut tracker = RankingTracker::new();
        let tick = 1.0 / 60.0;

        let mut publishes = 0;
        for _ in 0..(60 * 10) {
            if tracker.should_publish(tick) {
                publishes += 1;
            }
        }

        // Ten simulated seconds cross the 5s boundary twice
        assert_eq!(publishes, 2);
    }

    #[test]
    fn jittered_ticks_still_cross_the_boundary() {
        let mut tracker = RankingTracker::new();

        assert!(!tracker.should_publish(4.9));
        assert!(tracker.should_publish(0.2));
        assert!(!tracker.should_publish(0.1));
    }
}
