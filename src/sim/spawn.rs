//! Spawn director: two independent interval timers and the weighted draws
//! that decide what enters the field next.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::pickup::PowerUpKind;
use crate::tuning::{EnemyWeights, SpawnTuning};

/// One spawn decision; the caller places it at the spawn edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOrder {
    Enemy { kind: EnemyKind, y: f32 },
    PowerUp { kind: PowerUpKind, y: f32 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnDirector {
    /// Seconds accumulated toward the next enemy
    pub enemy_timer: f32,
    /// Seconds accumulated toward the next power-up
    pub powerup_timer: f32,
}

/// Map a roll in [0, 1) onto the weight partition
pub fn pick_enemy(weights: &EnemyWeights, roll: f32) -> EnemyKind {
    let total = weights.total();
    let point = roll * total;
    if point < weights.chaser {
        EnemyKind::Chaser
    } else if point < weights.chaser + weights.cruiser {
        EnemyKind::Cruiser
    } else {
        EnemyKind::Scout
    }
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance both timers. Emits at most one order per timer per call.
    /// `half_height` bounds the uniform y draw.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        tuning: &SpawnTuning,
        half_height: f32,
        rng: &mut R,
    ) -> Vec<SpawnOrder> {
        let mut orders = Vec::new();

        self.enemy_timer += dt;
        if self.enemy_timer >= tuning.enemy_interval {
            self.enemy_timer = 0.0;
            let kind = pick_enemy(&tuning.weights, rng.random::<f32>());
            let y = rng.random_range(-half_height..=half_height);
            orders.push(SpawnOrder::Enemy { kind, y });
        }

        self.powerup_timer += dt;
        if self.powerup_timer >= tuning.powerup_interval {
            self.powerup_timer = 0.0;
            let kind = if rng.random::<f32>() < tuning.triple_shot_bias {
                PowerUpKind::TripleShot
            } else {
                PowerUpKind::Shield
            };
            let y = rng.random_range(-half_height..=half_height);
            orders.push(SpawnOrder::PowerUp { kind, y });
        }

        orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_partition_edges() {
        let w = EnemyWeights {
            chaser: 0.3,
            cruiser: 0.3,
            scout: 0.4,
        };
        assert_eq!(pick_enemy(&w, 0.0), EnemyKind::Chaser);
        assert_eq!(pick_enemy(&w, 0.29), EnemyKind::Chaser);
        assert_eq!(pick_enemy(&w, 0.31), EnemyKind::Cruiser);
        assert_eq!(pick_enemy(&w, 0.61), EnemyKind::Scout);
        assert_eq!(pick_enemy(&w, 0.999), EnemyKind::Scout);
    }

    #[test]
    fn test_weighted_frequencies() {
        let w = EnemyWeights {
            chaser: 0.3,
            cruiser: 0.3,
            scout: 0.4,
        };
        let mut rng = Pcg32::seed_from_u64(12345);
        let n = 100_000;
        let mut counts = [0usize; 3];
        for _ in 0..n {
            match pick_enemy(&w, rng.random::<f32>()) {
                EnemyKind::Chaser => counts[0] += 1,
                EnemyKind::Cruiser => counts[1] += 1,
                EnemyKind::Scout => counts[2] += 1,
            }
        }
        // 5 sigma at p = 0.3..0.4 over 100k draws is about 0.0077
        for (count, expected) in counts.iter().zip([0.3, 0.3, 0.4]) {
            let observed = *count as f64 / n as f64;
            assert!(
                (observed - expected).abs() < 0.008,
                "observed {} expected {}",
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_unnormalized_weights() {
        let w = EnemyWeights {
            chaser: 3.0,
            cruiser: 0.0,
            scout: 1.0,
        };
        assert_eq!(pick_enemy(&w, 0.7), EnemyKind::Chaser);
        assert_eq!(pick_enemy(&w, 0.8), EnemyKind::Scout);
    }

    #[test]
    fn test_timers_fire_on_interval() {
        let tuning = SpawnTuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut director = SpawnDirector::new();

        assert!(director.update(1.0, &tuning, 20.0, &mut rng).is_empty());
        let orders = director.update(0.5, &tuning, 20.0, &mut rng);
        assert_eq!(orders.len(), 1);
        assert!(matches!(orders[0], SpawnOrder::Enemy { y, .. } if y.abs() <= 20.0));
        assert_eq!(director.enemy_timer, 0.0);

        let mut powerups = 0;
        for _ in 0..100 {
            for order in director.update(0.1, &tuning, 20.0, &mut rng) {
                if matches!(order, SpawnOrder::PowerUp { .. }) {
                    powerups += 1;
                }
            }
        }
        assert_eq!(powerups, 1);
    }

    #[test]
    fn test_bias_extremes() {
        let mut rng = Pcg32::seed_from_u64(9);
        let tuning = SpawnTuning {
            powerup_interval: 0.1,
            triple_shot_bias: 1.0,
            ..Default::default()
        };
        let mut director = SpawnDirector::new();
        for _ in 0..20 {
            for order in director.update(0.1, &tuning, 20.0, &mut rng) {
                if let SpawnOrder::PowerUp { kind, .. } = order {
                    assert_eq!(kind, PowerUpKind::TripleShot);
                }
            }
        }
    }
}
