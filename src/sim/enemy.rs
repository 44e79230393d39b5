//! Enemy archetypes
//!
//! One `Enemy` type covers every archetype; what differs is the tuning block
//! and the behavior branch in `update`:
//! - Chaser: homes in, flashes once close, then detonates
//! - Cruiser: flies straight, takes potshots, detonates at a fixed line
//! - Scout: weaves along a position-locked sine, never detonates
//!
//! Behavior only ever moves forward (Approaching -> Flashing -> Detonating ->
//! Dead). Death goes through `kill`, which succeeds exactly once.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, Visual};
use crate::platform::{Platform, VisualKind};
use crate::tuning::{ArchetypeTuning, EnemyTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Chaser,
    Cruiser,
    Scout,
}

impl EnemyKind {
    pub fn stats<'a>(&self, tuning: &'a EnemyTuning) -> &'a ArchetypeTuning {
        match self {
            EnemyKind::Chaser => &tuning.chaser.stats,
            EnemyKind::Cruiser => &tuning.cruiser.stats,
            EnemyKind::Scout => &tuning.scout.stats,
        }
    }

    pub fn visual_kind(&self) -> VisualKind {
        match self {
            EnemyKind::Chaser => VisualKind::Chaser,
            EnemyKind::Cruiser => VisualKind::Cruiser,
            EnemyKind::Scout => VisualKind::Scout,
        }
    }
}

/// Behavior state, ordered: transitions only ever go to a later variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Behavior {
    Approaching,
    Flashing,
    Detonating,
    Dead,
}

/// How an enemy left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Destroyed by a projectile or area effect: scores, leaves a kinetic burst
    Shot,
    /// Blew itself up: no score, leaves an explosion
    Detonated,
    /// Rammed the player: no score, no effect
    Crashed,
    /// Flew past the despawn edge: no score, no effect
    Escaped,
}

/// Produced exactly once per enemy by `Enemy::kill`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Death {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec3,
    pub cause: DeathCause,
    /// Points to award (zero unless shot down)
    pub score: u64,
}

/// Requests an enemy makes of the step that advanced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    Idle,
    /// Fire one projectile from `from` along unit vector `dir`
    Fire { from: Vec3, dir: Vec3 },
    /// Flash finished: apply splash and remove
    Detonate { at: Vec3, damage: i32, range: f32 },
}

#[derive(Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub body: Body,
    pub hp: i32,
    pub score_value: u64,
    pub speed: f32,
    /// Decaying impulse from the last non-lethal hit
    pub knockback: Vec3,
    pub behavior: Behavior,
    /// Seconds spent flashing
    pub flash_timer: f32,
    /// Remaining seconds of the hit flash
    pub damage_flash: f32,
    /// Blink state while flashing
    pub visible: bool,
    pub visual: Visual,
    alive: bool,
}

impl Enemy {
    pub fn spawn(
        id: EntityId,
        kind: EnemyKind,
        pos: Vec3,
        tuning: &EnemyTuning,
        platform: &mut Platform<'_>,
    ) -> Self {
        let stats = kind.stats(tuning);
        Self {
            id,
            kind,
            body: Body::new(pos, stats.radius),
            hp: stats.hp,
            score_value: stats.score_value,
            speed: stats.speed,
            knockback: Vec3::ZERO,
            behavior: Behavior::Approaching,
            flash_timer: 0.0,
            damage_flash: 0.0,
            visible: true,
            visual: Visual::create(platform, kind.visual_kind(), pos, stats.color),
            alive: true,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.behavior == Behavior::Flashing
    }

    fn advance(&mut self, next: Behavior) {
        debug_assert!(next >= self.behavior, "{:?} -> {:?}", self.behavior, next);
        if next > self.behavior {
            self.behavior = next;
        }
    }

    /// Advance one step. `player` is the player's position while alive.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        player: Option<Vec3>,
        tuning: &EnemyTuning,
        rng: &mut R,
    ) -> EnemyAction {
        if !self.alive || self.behavior >= Behavior::Detonating {
            return EnemyAction::Idle;
        }

        self.damage_flash = (self.damage_flash - dt).max(0.0);
        if self.knockback != Vec3::ZERO {
            self.body.pos += self.knockback * dt;
            self.knockback *= tuning.knockback_decay;
            if self.knockback.length_squared() < 1e-4 {
                self.knockback = Vec3::ZERO;
            }
        }

        match self.kind {
            EnemyKind::Chaser => self.update_chaser(dt, player, tuning),
            EnemyKind::Cruiser => self.update_cruiser(dt, player, tuning, rng),
            EnemyKind::Scout => {
                let scout = &tuning.scout;
                self.body.pos.x -= self.speed * dt;
                // Phase follows x, so the weave is locked to position
                self.body.pos.y +=
                    (self.body.pos.x * scout.weave_frequency).sin() * scout.weave_amplitude * dt;
                EnemyAction::Idle
            }
        }
    }

    fn update_chaser(&mut self, dt: f32, player: Option<Vec3>, tuning: &EnemyTuning) -> EnemyAction {
        let chaser = &tuning.chaser;
        self.body.pos.x -= self.speed * dt;

        if self.behavior == Behavior::Approaching {
            let Some(target) = player else {
                return EnemyAction::Idle;
            };
            if self.body.pos.distance(target) <= chaser.flash_distance {
                self.advance(Behavior::Flashing);
                self.flash_timer = 0.0;
            } else {
                let to_player = target - self.body.pos;
                if to_player.length() > 0.001 {
                    self.body.pos += to_player.normalize() * chaser.homing_speed * dt;
                }
                return EnemyAction::Idle;
            }
        }

        self.flash(dt, chaser.flash_duration, chaser.blink_frequency, chaser.splash_damage, chaser.splash_range)
    }

    fn update_cruiser<R: Rng>(
        &mut self,
        dt: f32,
        player: Option<Vec3>,
        tuning: &EnemyTuning,
        rng: &mut R,
    ) -> EnemyAction {
        let cruiser = &tuning.cruiser;
        self.body.pos.x -= self.speed * dt;

        if self.behavior == Behavior::Approaching {
            let crossed = cruiser.detonate_x.is_some_and(|x| self.body.pos.x <= x);
            if crossed {
                self.advance(Behavior::Flashing);
                self.flash_timer = 0.0;
            } else {
                return match player {
                    Some(target)
                        if self.body.pos.distance(target) >= cruiser.min_fire_distance
                            && rng.random::<f32>() < cruiser.fire_chance_per_sec * dt =>
                    {
                        let mut dir = target - self.body.pos;
                        dir.z = 0.0;
                        EnemyAction::Fire {
                            from: self.body.pos,
                            dir: dir.normalize_or_zero(),
                        }
                    }
                    _ => EnemyAction::Idle,
                };
            }
        }

        self.flash(dt, cruiser.flash_duration, cruiser.blink_frequency, cruiser.splash_damage, cruiser.splash_range)
    }

    /// Shared flashing countdown; detonates once the duration is reached
    fn flash(&mut self, dt: f32, duration: f32, blink: f32, damage: i32, range: f32) -> EnemyAction {
        self.flash_timer += dt;
        self.visible = (self.flash_timer * blink).sin() > 0.0;
        if self.flash_timer >= duration {
            self.visible = true;
            self.advance(Behavior::Detonating);
            return EnemyAction::Detonate {
                at: self.body.pos,
                damage,
                range,
            };
        }
        EnemyAction::Idle
    }

    /// Apply damage. Returns true when hp ran out; the caller must then
    /// `kill` the enemy and drop it from the active set.
    pub fn take_damage(&mut self, amount: i32, tuning: &EnemyTuning) -> bool {
        if !self.alive {
            return false;
        }
        self.hp -= amount;
        self.damage_flash = tuning.flash_time;
        if self.hp <= 0 {
            self.hp = 0;
            return true;
        }
        let impulse = self.kind.stats(tuning).knockback;
        if impulse > 0.0 {
            self.knockback += Vec3::X * impulse;
        }
        false
    }

    /// The single death transition. Later calls return `None`.
    pub fn kill(&mut self, cause: DeathCause) -> Option<Death> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        self.hp = 0;
        self.visible = true;
        self.advance(Behavior::Dead);
        Some(Death {
            id: self.id,
            kind: self.kind,
            pos: self.body.pos,
            cause,
            score: if cause == DeathCause::Shot { self.score_value } else { 0 },
        })
    }
}

impl Entity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn enemy(kind: EnemyKind, pos: Vec3, host: &mut HeadlessPlatform) -> Enemy {
        Enemy::spawn(1, kind, pos, &EnemyTuning::default(), &mut host.platform())
    }

    #[test]
    fn test_chaser_flashes_then_detonates() {
        let mut host = HeadlessPlatform::new();
        let tuning = EnemyTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut chaser = enemy(EnemyKind::Chaser, Vec3::new(8.0, 0.0, 0.0), &mut host);
        let player = Some(Vec3::ZERO);

        assert_eq!(chaser.update(0.01, player, &tuning, &mut rng), EnemyAction::Idle);
        assert_eq!(chaser.behavior, Behavior::Flashing);

        let mut detonated = None;
        for _ in 0..200 {
            match chaser.update(0.01, player, &tuning, &mut rng) {
                EnemyAction::Detonate { damage, .. } => {
                    detonated = Some(damage);
                    break;
                }
                _ => assert_eq!(chaser.behavior, Behavior::Flashing),
            }
        }
        assert_eq!(detonated, Some(tuning.chaser.splash_damage));
        assert_eq!(chaser.behavior, Behavior::Detonating);
        // Nothing further happens once detonating
        assert_eq!(chaser.update(0.01, player, &tuning, &mut rng), EnemyAction::Idle);
    }

    #[test]
    fn test_chaser_homes_toward_player() {
        let mut host = HeadlessPlatform::new();
        let tuning = EnemyTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut chaser = enemy(EnemyKind::Chaser, Vec3::new(30.0, 10.0, 0.0), &mut host);
        chaser.update(0.1, Some(Vec3::new(0.0, 0.0, 0.0)), &tuning, &mut rng);
        assert!(chaser.body.pos.y < 10.0);
        assert!(chaser.body.pos.x < 30.0 - tuning.chaser.stats.speed * 0.1 + 1e-3);
        assert_eq!(chaser.behavior, Behavior::Approaching);
    }

    #[test]
    fn test_flashing_never_regresses() {
        let mut host = HeadlessPlatform::new();
        let tuning = EnemyTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut chaser = enemy(EnemyKind::Chaser, Vec3::new(5.0, 0.0, 0.0), &mut host);
        chaser.update(0.01, Some(Vec3::ZERO), &tuning, &mut rng);
        assert!(chaser.is_flashing());
        // Player runs far away: still flashing
        chaser.update(0.01, Some(Vec3::new(-40.0, 15.0, 0.0)), &tuning, &mut rng);
        assert!(chaser.is_flashing());
    }

    #[test]
    fn test_cruiser_detonates_at_line() {
        let mut host = HeadlessPlatform::new();
        let mut tuning = EnemyTuning::default();
        tuning.cruiser.fire_chance_per_sec = 0.0;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cruiser = enemy(EnemyKind::Cruiser, Vec3::new(5.4, 0.0, 0.0), &mut host);

        cruiser.update(0.1, None, &tuning, &mut rng);
        assert!(cruiser.is_flashing());
        let mut action = EnemyAction::Idle;
        for _ in 0..10 {
            action = cruiser.update(0.1, None, &tuning, &mut rng);
            if action != EnemyAction::Idle {
                break;
            }
        }
        assert!(matches!(action, EnemyAction::Detonate { .. }));
    }

    #[test]
    fn test_cruiser_holds_fire_while_flashing() {
        let mut host = HeadlessPlatform::new();
        let mut tuning = EnemyTuning::default();
        tuning.cruiser.fire_chance_per_sec = 1.0e6;
        let mut rng = Pcg32::seed_from_u64(3);
        let mut cruiser = enemy(EnemyKind::Cruiser, Vec3::new(5.4, 0.0, 0.0), &mut host);
        let player = Some(Vec3::new(-35.0, 0.0, 0.0));

        assert_eq!(cruiser.update(0.1, player, &tuning, &mut rng), EnemyAction::Idle);
        assert!(cruiser.is_flashing());
        let mut detonated = false;
        for _ in 0..20 {
            match cruiser.update(0.1, player, &tuning, &mut rng) {
                EnemyAction::Fire { .. } => panic!("fired while flashing"),
                EnemyAction::Detonate { .. } => {
                    detonated = true;
                    break;
                }
                EnemyAction::Idle => assert!(cruiser.is_flashing()),
            }
        }
        assert!(detonated);
    }

    #[test]
    fn test_cruiser_fires_at_player_from_range() {
        let mut host = HeadlessPlatform::new();
        let mut tuning = EnemyTuning::default();
        tuning.cruiser.fire_chance_per_sec = 1000.0;
        let mut rng = Pcg32::seed_from_u64(7);
        let mut cruiser = enemy(EnemyKind::Cruiser, Vec3::new(40.0, 0.0, 0.0), &mut host);

        match cruiser.update(0.01, Some(Vec3::new(0.0, 0.0, 0.0)), &tuning, &mut rng) {
            EnemyAction::Fire { dir, .. } => {
                assert!(dir.x < -0.99);
                assert!((dir.length() - 1.0).abs() < 1e-4);
            }
            other => panic!("expected a shot, got {:?}", other),
        }

        // Too close: holds fire
        let mut close = enemy(EnemyKind::Cruiser, Vec3::new(30.0, 0.0, 0.0), &mut host);
        let action = close.update(0.01, Some(Vec3::new(25.0, 0.0, 0.0)), &tuning, &mut rng);
        assert_eq!(action, EnemyAction::Idle);
    }

    #[test]
    fn test_scout_weave_is_position_locked() {
        let mut host = HeadlessPlatform::new();
        let tuning = EnemyTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut a = enemy(EnemyKind::Scout, Vec3::new(20.0, 0.0, 0.0), &mut host);
        let mut b = enemy(EnemyKind::Scout, Vec3::new(20.0, 0.0, 0.0), &mut host);
        for _ in 0..50 {
            a.update(0.02, None, &tuning, &mut rng);
        }
        for _ in 0..50 {
            b.update(0.02, Some(Vec3::ZERO), &tuning, &mut rng);
        }
        assert_eq!(a.body.pos, b.body.pos);

        // A stalled scout (no x travel) does not weave
        let mut stalled = enemy(EnemyKind::Scout, Vec3::new(20.0, 3.0, 0.0), &mut host);
        stalled.speed = 0.0;
        let y = stalled.body.pos.y;
        stalled.update(0.02, None, &tuning, &mut rng);
        let dy1 = stalled.body.pos.y - y;
        stalled.update(0.02, None, &tuning, &mut rng);
        let dy2 = stalled.body.pos.y - y - dy1;
        assert!((dy1 - dy2).abs() < 1e-6);
    }

    #[test]
    fn test_damage_knockback_and_death() {
        let mut host = HeadlessPlatform::new();
        let tuning = EnemyTuning::default();
        let mut cruiser = enemy(EnemyKind::Cruiser, Vec3::new(20.0, 0.0, 0.0), &mut host);

        assert!(!cruiser.take_damage(1, &tuning));
        assert_eq!(cruiser.hp, 4);
        assert!(cruiser.knockback.x > 0.0);
        assert!(cruiser.damage_flash > 0.0);

        assert!(cruiser.take_damage(10, &tuning));
        assert_eq!(cruiser.hp, 0);
        let death = cruiser.kill(DeathCause::Shot).unwrap();
        assert_eq!(death.score, tuning.cruiser.stats.score_value);
        assert!(cruiser.kill(DeathCause::Shot).is_none());
        assert!(!cruiser.take_damage(1, &tuning));
    }

    #[test]
    fn test_knockback_decays() {
        let mut host = HeadlessPlatform::new();
        let tuning = EnemyTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut chaser = enemy(EnemyKind::Chaser, Vec3::new(30.0, 0.0, 0.0), &mut host);
        chaser.take_damage(1, &tuning);
        let first = chaser.knockback.x;
        chaser.update(0.016, None, &tuning, &mut rng);
        assert!((chaser.knockback.x - first * tuning.knockback_decay).abs() < 1e-5);
    }

    #[test]
    fn test_non_shot_deaths_score_nothing() {
        let mut host = HeadlessPlatform::new();
        for cause in [DeathCause::Detonated, DeathCause::Crashed, DeathCause::Escaped] {
            let mut e = enemy(EnemyKind::Chaser, Vec3::ZERO, &mut host);
            assert_eq!(e.kill(cause).unwrap().score, 0);
        }
    }
}
