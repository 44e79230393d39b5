//! Discrete projectiles fired by the player or by enemies

use glam::Vec3;

use super::entity::{Body, Entity, EntityId, Visual};
use crate::platform::{Platform, VisualKind};
use crate::tuning::FieldTuning;

/// Who fired the shot decides which collision pass sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: Owner,
    pub body: Body,
    pub vel: Vec3,
    pub damage: i32,
    pub visual: Visual,
    alive: bool,
}

impl Projectile {
    pub fn spawn(
        id: EntityId,
        owner: Owner,
        pos: Vec3,
        vel: Vec3,
        radius: f32,
        damage: i32,
        platform: &mut Platform<'_>,
    ) -> Self {
        let (kind, color) = match owner {
            Owner::Player => (VisualKind::PlayerShot, 0x00ffff),
            Owner::Enemy => (VisualKind::EnemyShot, 0xff6600),
        };
        Self {
            id,
            owner,
            body: Body::new(pos, radius),
            vel,
            damage,
            visual: Visual::create(platform, kind, pos, color),
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.alive {
            self.body.pos += self.vel * dt;
        }
    }

    /// Mark as spent; returns false if it already was
    pub fn consume(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Horizontal extent this shot may travel before it expires. Enemy
    /// shots can start at the spawn line, beyond the visible boundary.
    fn x_range(&self, field: &FieldTuning) -> (f32, f32) {
        let margin = field.projectile_exit_margin;
        match self.owner {
            Owner::Player => (-field.boundary_x - margin, field.boundary_x + margin),
            Owner::Enemy => (field.despawn_x - margin, field.spawn_x + margin),
        }
    }

    /// Expire once it has left the field on any side
    pub fn expire_outside(&mut self, field: &FieldTuning) {
        let (min_x, max_x) = self.x_range(field);
        let p = self.body.pos;
        if p.x < min_x || p.x > max_x || p.y.abs() > field.boundary_y + field.projectile_exit_margin {
            self.alive = false;
        }
    }
}

impl Entity for Projectile {
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

    #[test]
    fn test_moves_and_expires() {
        let mut host = HeadlessPlatform::new();
        let mut p = Projectile::spawn(
            1,
            Owner::Player,
            Vec3::new(40.0, 0.0, 0.0),
            Vec3::new(60.0, 0.0, 0.0),
            0.5,
            1,
            &mut host.platform(),
        );
        let field = FieldTuning::default();
        p.update(0.05);
        assert!((p.body.pos.x - 43.0).abs() < 1e-4);
        p.expire_outside(&field);
        assert!(p.is_alive());
        p.update(0.05);
        p.expire_outside(&field);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_enemy_shot_lives_from_spawn_line() {
        let mut host = HeadlessPlatform::new();
        let field = FieldTuning::default();
        let mut p = Projectile::spawn(
            1,
            Owner::Enemy,
            Vec3::new(48.0, 0.0, 0.0),
            Vec3::new(-25.0, 0.0, 0.0),
            0.6,
            1,
            &mut host.platform(),
        );
        p.update(0.01);
        p.expire_outside(&field);
        assert!(p.is_alive());

        // Past the despawn line plus margin on the far side
        p.body.pos.x = field.despawn_x - field.projectile_exit_margin - 0.1;
        p.expire_outside(&field);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_consume_once() {
        let mut host = HeadlessPlatform::new();
        let mut p = Projectile::spawn(
            1,
            Owner::Enemy,
            Vec3::ZERO,
            Vec3::X,
            0.5,
            1,
            &mut host.platform(),
        );
        assert!(p.consume());
        assert!(!p.consume());
    }
}
