//! Data-driven game balance
//!
//! Every boundary, speed, radius, damage value and timer the simulation reads
//! lives here. Defaults reproduce the shipped game; a JSON file can override
//! any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration, caught before a simulation is built
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must lie in [0, 1] (got {value})")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("enemy spawn weights must sum to a positive value")]
    EmptyWeights,

    #[error("{field} must be at least {min} (got {value})")]
    TooSmall {
        field: &'static str,
        value: i64,
        min: i64,
    },

    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
}

/// Play-field geometry and step limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    /// Horizontal half-extent of the play field
    pub boundary_x: f32,
    /// Vertical half-extent of the play field
    pub boundary_y: f32,
    /// Enemies and pickups enter here (right side)
    pub spawn_x: f32,
    /// Enemies and pickups leaving past this x are expired (left side)
    pub despawn_x: f32,
    /// Shots are expired this far past the field edges
    pub projectile_exit_margin: f32,
    /// Largest dt a single step may consume (seconds)
    pub max_step_dt: f32,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            boundary_x: 40.0,
            boundary_y: 20.0,
            spawn_x: 50.0,
            despawn_x: -50.0,
            projectile_exit_margin: 5.0,
            max_step_dt: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub hp: i32,
    pub speed: f32,
    pub radius: f32,
    /// Keeps the craft this far inside the vertical boundary
    pub vertical_margin: f32,
    pub fire_cooldown: f32,
    pub burst_cooldown: f32,
    pub present_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_damage: i32,
    /// Vertical offset of the two extra triple-shot projectiles
    pub triple_shot_spread: f32,
    pub triple_shot_duration: f32,
    pub invulnerability: f32,
    /// Charge granted by a shield pickup
    pub shield_charge: i32,
    /// Hurtbox radius while the shield is up
    pub shield_radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            hp: 10,
            speed: 30.0,
            radius: 2.0,
            vertical_margin: 5.0,
            fire_cooldown: 0.25,
            burst_cooldown: 3.0,
            present_cooldown: 0.75,
            projectile_speed: 60.0,
            projectile_radius: 0.5,
            projectile_damage: 1,
            triple_shot_spread: 1.0,
            triple_shot_duration: 5.0,
            invulnerability: 2.0,
            shield_charge: 5,
            // Bounding sphere of the player cone (~3.46) plus the shield offset
            shield_radius: 4.96,
        }
    }
}

/// Stats shared by every enemy archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTuning {
    pub radius: f32,
    pub hp: i32,
    pub score_value: u64,
    /// Leftward drift speed
    pub speed: f32,
    /// One-shot +x impulse applied on a non-lethal hit (0 disables)
    pub knockback: f32,
    pub color: u32,
}

impl Default for ArchetypeTuning {
    fn default() -> Self {
        Self {
            radius: 3.0,
            hp: 3,
            score_value: 100,
            speed: 6.0,
            knockback: 0.0,
            color: 0xff4444,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserTuning {
    pub stats: ArchetypeTuning,
    pub homing_speed: f32,
    /// Distance to the player at which flashing starts
    pub flash_distance: f32,
    pub flash_duration: f32,
    /// Blink is visible while sin(timer * blink_frequency) > 0
    pub blink_frequency: f32,
    pub splash_damage: i32,
    pub splash_range: f32,
}

impl Default for ChaserTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeTuning {
                radius: 3.0,
                hp: 3,
                score_value: 100,
                speed: 6.0,
                knockback: 4.0,
                color: 0xff4444,
            },
            homing_speed: 4.0,
            flash_distance: 10.0,
            flash_duration: 1.5,
            blink_frequency: 20.0,
            splash_damage: 2,
            splash_range: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CruiserTuning {
    pub stats: ArchetypeTuning,
    /// Self-detonation line; `None` lets cruisers fly until they escape
    pub detonate_x: Option<f32>,
    pub flash_duration: f32,
    pub blink_frequency: f32,
    /// Probability per second of firing while cruising
    pub fire_chance_per_sec: f32,
    /// No shots are fired when closer than this to the player
    pub min_fire_distance: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_damage: i32,
    pub splash_damage: i32,
    pub splash_range: f32,
}

impl Default for CruiserTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeTuning {
                radius: 4.0,
                hp: 5,
                score_value: 250,
                speed: 5.0,
                knockback: 8.0,
                color: 0x44ffaa,
            },
            detonate_x: Some(5.0),
            flash_duration: 0.5,
            blink_frequency: 20.0,
            fire_chance_per_sec: 0.6,
            min_fire_distance: 12.0,
            projectile_speed: 25.0,
            projectile_radius: 0.6,
            projectile_damage: 1,
            splash_damage: 2,
            splash_range: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutTuning {
    pub stats: ArchetypeTuning,
    /// Vertical weave speed amplitude (units/sec)
    pub weave_amplitude: f32,
    /// Weave phase per unit of x travelled
    pub weave_frequency: f32,
}

impl Default for ScoutTuning {
    fn default() -> Self {
        Self {
            stats: ArchetypeTuning {
                radius: 2.5,
                hp: 1,
                score_value: 50,
                speed: 6.0,
                knockback: 0.0,
                color: 0x9999ff,
            },
            weave_amplitude: 3.0,
            weave_frequency: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub chaser: ChaserTuning,
    pub cruiser: CruiserTuning,
    pub scout: ScoutTuning,
    /// Damage the player takes when crashing into any enemy
    pub contact_damage: i32,
    /// Damage flash duration (seconds)
    pub flash_time: f32,
    /// Knockback velocity multiplier applied every step
    pub knockback_decay: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            chaser: ChaserTuning::default(),
            cruiser: CruiserTuning::default(),
            scout: ScoutTuning::default(),
            contact_damage: 1,
            flash_time: 0.1,
            knockback_decay: 0.9,
        }
    }
}

/// Constants for one area-effect flavor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaFlavorTuning {
    pub max_radius: f32,
    pub duration: f32,
    pub damage: i32,
    pub color: u32,
}

impl Default for AreaFlavorTuning {
    fn default() -> Self {
        Self {
            max_radius: 15.0,
            duration: 1.5,
            damage: 10,
            color: 0x58a6ff,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaTuning {
    /// The player's burst ability
    pub plasma: AreaFlavorTuning,
    /// Cosmetic burst left behind by a shot-down enemy
    pub shot: AreaFlavorTuning,
    /// Cosmetic burst of a self-detonation
    pub explosion: AreaFlavorTuning,
}

impl Default for AreaTuning {
    fn default() -> Self {
        Self {
            plasma: AreaFlavorTuning::default(),
            shot: AreaFlavorTuning {
                max_radius: 10.0,
                duration: 1.5,
                damage: 0,
                color: 0x58a6ff,
            },
            explosion: AreaFlavorTuning {
                max_radius: 10.0,
                duration: 1.5,
                damage: 0,
                color: 0xff0000,
            },
        }
    }
}

/// Relative weights of the enemy draw (normalized on use)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyWeights {
    pub chaser: f32,
    pub cruiser: f32,
    pub scout: f32,
}

impl Default for EnemyWeights {
    fn default() -> Self {
        Self {
            chaser: 0.6,
            cruiser: 0.25,
            scout: 0.15,
        }
    }
}

impl EnemyWeights {
    pub fn total(&self) -> f32 {
        self.chaser + self.cruiser + self.scout
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub enemy_interval: f32,
    pub powerup_interval: f32,
    pub weights: EnemyWeights,
    /// Probability that a power-up is triple shot (otherwise shield)
    pub triple_shot_bias: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            enemy_interval: 1.5,
            powerup_interval: 10.0,
            weights: EnemyWeights::default(),
            triple_shot_bias: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub radius: f32,
    pub drift_speed: f32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            radius: 2.0,
            drift_speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseTuning {
    pub count: usize,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Ground line the houses sit on
    pub ground_y: f32,
    pub depth_z: f32,
    /// Extra span beyond 2 * boundary_x in the recycle ring
    pub margin: f32,
}

impl Default for HouseTuning {
    fn default() -> Self {
        Self {
            count: 4,
            width: 12.0,
            height: 6.0,
            speed: 5.0,
            ground_y: -17.0,
            depth_z: -5.0,
            margin: 20.0,
        }
    }
}

impl HouseTuning {
    /// Distance a recycled house jumps forward
    pub fn recycle_span(&self, boundary_x: f32) -> f32 {
        2.0 * boundary_x + self.margin
    }

    /// Houses left of this x are recycled
    pub fn despawn_x(&self, boundary_x: f32) -> f32 {
        -(boundary_x + self.margin / 2.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentTuning {
    pub radius: f32,
    pub gravity: f32,
    pub lifetime: f32,
    pub delivery_score: u64,
}

impl Default for PresentTuning {
    fn default() -> Self {
        Self {
            radius: 0.8,
            gravity: 30.0,
            lifetime: 3.0,
            delivery_score: 500,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field: FieldTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub area: AreaTuning,
    pub spawn: SpawnTuning,
    pub pickup: PickupTuning,
    pub house: HouseTuning,
    pub present: PresentTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field: FieldTuning::default(),
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            area: AreaTuning::default(),
            spawn: SpawnTuning::default(),
            pickup: PickupTuning::default(),
            house: HouseTuning::default(),
            present: PresentTuning::default(),
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Negative { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::OutOfUnitRange { field, value })
    }
}

fn at_least(field: &'static str, value: i64, min: i64) -> Result<(), TuningError> {
    if value >= min {
        Ok(())
    } else {
        Err(TuningError::TooSmall { field, value, min })
    }
}

fn check_archetype(prefix: &'static str, stats: &ArchetypeTuning) -> Result<(), TuningError> {
    positive(prefix, stats.radius)?;
    at_least(prefix, stats.hp as i64, 1)?;
    non_negative(prefix, stats.speed)?;
    non_negative(prefix, stats.knockback)
}

fn check_area(prefix: &'static str, area: &AreaFlavorTuning) -> Result<(), TuningError> {
    positive(prefix, area.max_radius)?;
    positive(prefix, area.duration)?;
    at_least(prefix, area.damage as i64, 0)
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance sheet and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON balance sheet from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let f = &self.field;
        positive("field.boundary_x", f.boundary_x)?;
        positive("field.boundary_y", f.boundary_y)?;
        positive("field.max_step_dt", f.max_step_dt)?;
        non_negative("field.projectile_exit_margin", f.projectile_exit_margin)?;
        if f.despawn_x >= f.spawn_x {
            return Err(TuningError::NonPositive {
                field: "field.spawn_x - field.despawn_x",
                value: f.spawn_x - f.despawn_x,
            });
        }

        let p = &self.player;
        at_least("player.hp", p.hp as i64, 1)?;
        positive("player.speed", p.speed)?;
        positive("player.radius", p.radius)?;
        non_negative("player.vertical_margin", p.vertical_margin)?;
        if p.vertical_margin >= f.boundary_y {
            return Err(TuningError::NonPositive {
                field: "field.boundary_y - player.vertical_margin",
                value: f.boundary_y - p.vertical_margin,
            });
        }
        non_negative("player.fire_cooldown", p.fire_cooldown)?;
        non_negative("player.burst_cooldown", p.burst_cooldown)?;
        non_negative("player.present_cooldown", p.present_cooldown)?;
        positive("player.projectile_speed", p.projectile_speed)?;
        positive("player.projectile_radius", p.projectile_radius)?;
        at_least("player.projectile_damage", p.projectile_damage as i64, 0)?;
        positive("player.triple_shot_duration", p.triple_shot_duration)?;
        positive("player.invulnerability", p.invulnerability)?;
        at_least("player.shield_charge", p.shield_charge as i64, 0)?;
        positive("player.shield_radius", p.shield_radius)?;

        let e = &self.enemy;
        check_archetype("enemy.chaser.stats", &e.chaser.stats)?;
        check_archetype("enemy.cruiser.stats", &e.cruiser.stats)?;
        check_archetype("enemy.scout.stats", &e.scout.stats)?;
        non_negative("enemy.chaser.homing_speed", e.chaser.homing_speed)?;
        positive("enemy.chaser.flash_distance", e.chaser.flash_distance)?;
        positive("enemy.chaser.flash_duration", e.chaser.flash_duration)?;
        non_negative("enemy.chaser.splash_range", e.chaser.splash_range)?;
        non_negative("enemy.cruiser.flash_duration", e.cruiser.flash_duration)?;
        non_negative("enemy.cruiser.fire_chance_per_sec", e.cruiser.fire_chance_per_sec)?;
        non_negative("enemy.cruiser.min_fire_distance", e.cruiser.min_fire_distance)?;
        positive("enemy.cruiser.projectile_speed", e.cruiser.projectile_speed)?;
        positive("enemy.cruiser.projectile_radius", e.cruiser.projectile_radius)?;
        non_negative("enemy.cruiser.splash_range", e.cruiser.splash_range)?;
        non_negative("enemy.scout.weave_amplitude", e.scout.weave_amplitude)?;
        at_least("enemy.contact_damage", e.contact_damage as i64, 0)?;
        non_negative("enemy.flash_time", e.flash_time)?;
        unit("enemy.knockback_decay", e.knockback_decay)?;

        check_area("area.plasma", &self.area.plasma)?;
        check_area("area.shot", &self.area.shot)?;
        check_area("area.explosion", &self.area.explosion)?;

        let s = &self.spawn;
        positive("spawn.enemy_interval", s.enemy_interval)?;
        positive("spawn.powerup_interval", s.powerup_interval)?;
        non_negative("spawn.weights.chaser", s.weights.chaser)?;
        non_negative("spawn.weights.cruiser", s.weights.cruiser)?;
        non_negative("spawn.weights.scout", s.weights.scout)?;
        if s.weights.total() <= 0.0 {
            return Err(TuningError::EmptyWeights);
        }
        unit("spawn.triple_shot_bias", s.triple_shot_bias)?;

        positive("pickup.radius", self.pickup.radius)?;
        non_negative("pickup.drift_speed", self.pickup.drift_speed)?;

        let h = &self.house;
        positive("house.width", h.width)?;
        positive("house.height", h.height)?;
        non_negative("house.speed", h.speed)?;
        non_negative("house.margin", h.margin)?;

        positive("present.radius", self.present.radius)?;
        non_negative("present.gravity", self.present.gravity)?;
        positive("present.lifetime", self.present.lifetime)?;

        Ok(())
    }
}
