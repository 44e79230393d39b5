//! Game state and core simulation types
//!
//! `GameState` is the explicit simulation context: every live collection,
//! the run RNG, the score and the event queue. Nothing is global; each step
//! receives it by `&mut`.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::area::{AreaEffect, AreaFlavor};
use super::enemy::{Death, DeathCause, Enemy, EnemyKind};
use super::entity::{self, Entity, EntityId};
use super::house::{self, House, Present};
use super::pickup::{PowerUp, PowerUpKind};
use super::player::{DamageOutcome, PlayerState};
use super::projectile::{Owner, Projectile};
use super::snapshot::HudState;
use super::spawn::SpawnDirector;
use crate::platform::{Platform, VisualFactory};
use crate::tuning::Tuning;

pub const GAME_OVER_TITLE: &str = "Game Over!";

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Player died; steps are frozen until reset
    GameOver,
}

/// Things that happened during a step, for the host's cosmetic layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: EntityId, kind: EnemyKind },
    EnemyKilled { id: EntityId, kind: EnemyKind, pos: Vec3, score: u64 },
    EnemyDetonated { id: EntityId, kind: EnemyKind, pos: Vec3 },
    EnemyCrashed { id: EntityId, kind: EnemyKind, pos: Vec3 },
    EnemyEscaped { id: EntityId, kind: EnemyKind },
    PlayerHit { hp_lost: i32, hp: i32 },
    ShieldAbsorbed { absorbed: i32, charge: i32 },
    PowerUpCollected { kind: PowerUpKind },
    PresentDelivered { house: EntityId, pos: Vec3, score: u64 },
    GameOver { score: u64 },
}

/// Complete simulation context
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    /// Simulated seconds since the run started
    pub elapsed: f32,
    pub player: PlayerState,
    /// Player shots
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub areas: Vec<AreaEffect>,
    pub powerups: Vec<PowerUp>,
    pub houses: Vec<House>,
    pub presents: Vec<Present>,
    pub spawner: SpawnDirector,
    /// Drained by the host after each frame. Hosts that never drain keep
    /// only the newest `MAX_PENDING_EVENTS`.
    pub events: Vec<GameEvent>,
    /// Last values pushed to the HUD sink
    pub last_hud: Option<HudState>,
    next_id: EntityId,
}

impl GameState {
    /// Create a new run: player at the left edge, house row laid out
    pub fn new(seed: u64, tuning: &Tuning, platform: &mut Platform<'_>) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            score: 0,
            elapsed: 0.0,
            player: PlayerState::new(1, &tuning.player, &tuning.field),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            enemies: Vec::new(),
            areas: Vec::new(),
            powerups: Vec::new(),
            houses: Vec::new(),
            presents: Vec::new(),
            spawner: SpawnDirector::new(),
            events: Vec::new(),
            last_hud: None,
            next_id: 2,
        };
        state.player.attach_visuals(platform);

        let first = state.next_id;
        state.houses = house::build_row(first, &tuning.house, &tuning.field, platform);
        state.next_id += state.houses.len() as EntityId;

        log::info!("New run (seed {})", seed);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Drop the oldest undrained events beyond `MAX_PENDING_EVENTS`
    pub fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess > 0 {
            log::debug!("Dropping {} undrained events", excess);
            self.events.drain(..excess);
        }
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec3, tuning: &Tuning, platform: &mut Platform<'_>) {
        let id = self.next_entity_id();
        log::debug!("Spawn {:?} #{} at y={:.1}", kind, id, pos.y);
        self.enemies.push(Enemy::spawn(id, kind, pos, &tuning.enemy, platform));
        self.events.push(GameEvent::EnemySpawned { id, kind });
    }

    pub fn spawn_powerup(&mut self, kind: PowerUpKind, pos: Vec3, tuning: &Tuning, platform: &mut Platform<'_>) {
        let id = self.next_entity_id();
        log::debug!("Spawn {:?} power-up #{}", kind, id);
        self.powerups.push(PowerUp::spawn(id, kind, pos, &tuning.pickup, platform));
    }

    pub fn spawn_area(&mut self, flavor: AreaFlavor, at: Vec3, tuning: &Tuning, platform: &mut Platform<'_>) {
        let id = self.next_entity_id();
        self.areas.push(AreaEffect::spawn(id, flavor, at, &tuning.area, platform));
    }

    pub fn spawn_present(&mut self, at: Vec3, tuning: &Tuning, platform: &mut Platform<'_>) {
        let id = self.next_entity_id();
        self.presents.push(Present::spawn(id, at, &tuning.present, &tuning.house, platform));
    }

    /// One player shot per muzzle, flying +x
    pub fn fire_player_volley(&mut self, muzzles: &[Vec3], tuning: &Tuning, platform: &mut Platform<'_>) {
        let p = &tuning.player;
        for &muzzle in muzzles {
            let id = self.next_entity_id();
            self.projectiles.push(Projectile::spawn(
                id,
                Owner::Player,
                muzzle,
                Vec3::X * p.projectile_speed,
                p.projectile_radius,
                p.projectile_damage,
                platform,
            ));
        }
    }

    pub fn fire_enemy_shot(&mut self, from: Vec3, dir: Vec3, tuning: &Tuning, platform: &mut Platform<'_>) {
        let c = &tuning.enemy.cruiser;
        let id = self.next_entity_id();
        self.enemy_projectiles.push(Projectile::spawn(
            id,
            Owner::Enemy,
            from,
            dir * c.projectile_speed,
            c.projectile_radius,
            c.projectile_damage,
            platform,
        ));
    }

    /// Apply the consequences of an enemy's death: score, leftover effect
    /// and event. The enemy itself has already released its visual.
    pub fn record_death(&mut self, death: Death, tuning: &Tuning, platform: &mut Platform<'_>) {
        log::debug!("{:?} #{} gone ({:?})", death.kind, death.id, death.cause);
        let Death { id, kind, pos, cause, score } = death;
        match cause {
            DeathCause::Shot => {
                self.score += score;
                self.spawn_area(AreaFlavor::Kinetic, pos, tuning, platform);
                self.events.push(GameEvent::EnemyKilled { id, kind, pos, score });
            }
            DeathCause::Detonated => {
                self.spawn_area(AreaFlavor::Explosion, pos, tuning, platform);
                self.events.push(GameEvent::EnemyDetonated { id, kind, pos });
            }
            DeathCause::Crashed => self.events.push(GameEvent::EnemyCrashed { id, kind, pos }),
            DeathCause::Escaped => self.events.push(GameEvent::EnemyEscaped { id, kind }),
        }
    }

    /// Route damage through the player's shield/hp policy and handle the
    /// fallout (events, shield indicator, game over)
    pub fn damage_player(&mut self, amount: i32, tuning: &Tuning, platform: &mut Platform<'_>) -> DamageOutcome {
        let outcome = self.player.take_damage(amount, &tuning.player);
        let charge = self.player.shield.charge;
        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Absorbed { absorbed } => {
                self.events.push(GameEvent::ShieldAbsorbed { absorbed, charge });
            }
            DamageOutcome::Hurt { absorbed, hp_lost } => {
                if absorbed > 0 {
                    self.events.push(GameEvent::ShieldAbsorbed { absorbed, charge });
                }
                self.events.push(GameEvent::PlayerHit {
                    hp_lost,
                    hp: self.player.hp,
                });
            }
            DamageOutcome::Died => self.end_run(platform),
        }
        if !self.player.shield.is_up() && self.player.shield.visual.is_held() {
            self.player.shield.visual.release(platform.visuals);
        }
        outcome
    }

    /// Terminal transition; notifies the host exactly once
    fn end_run(&mut self, platform: &mut Platform<'_>) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.player.dispose(platform.visuals);
        self.events.push(GameEvent::GameOver { score: self.score });
        log::info!("Game over, final score {}", self.score);
        let message = format!("Well done, Santa. Your final score is: {}", self.score);
        platform.game_over.game_over(GAME_OVER_TITLE, &message);
    }

    /// Drop and dispose everything that died or expired this step
    pub fn reap(&mut self, factory: &mut dyn VisualFactory) {
        entity::reap(&mut self.projectiles, factory);
        entity::reap(&mut self.enemy_projectiles, factory);
        entity::reap(&mut self.enemies, factory);
        entity::reap(&mut self.areas, factory);
        entity::reap(&mut self.powerups, factory);
        entity::reap(&mut self.presents, factory);
    }

    /// Release every live visual (restart or shutdown)
    pub fn release_all(&mut self, factory: &mut dyn VisualFactory) {
        self.player.dispose(factory);
        entity::release_all(&mut self.projectiles, factory);
        entity::release_all(&mut self.enemy_projectiles, factory);
        entity::release_all(&mut self.enemies, factory);
        entity::release_all(&mut self.areas, factory);
        entity::release_all(&mut self.powerups, factory);
        entity::release_all(&mut self.houses, factory);
        entity::release_all(&mut self.presents, factory);
    }

    /// Current HUD values
    pub fn hud(&self, tuning: &Tuning) -> HudState {
        HudState::from_state(self, tuning)
    }
}
