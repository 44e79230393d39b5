//! Power-up pickups

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, Visual};
use crate::platform::{Platform, VisualKind};
use crate::tuning::PickupTuning;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    TripleShot,
    Shield,
}

impl PowerUpKind {
    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::TripleShot => 0x00ff00,
            PowerUpKind::Shield => 0xff0000,
        }
    }
}

/// A pickup drifting across the field toward the despawn edge
#[derive(Debug)]
pub struct PowerUp {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub body: Body,
    pub visual: Visual,
    alive: bool,
}

impl PowerUp {
    pub fn spawn(
        id: EntityId,
        kind: PowerUpKind,
        pos: Vec3,
        tuning: &PickupTuning,
        platform: &mut Platform<'_>,
    ) -> Self {
        Self {
            id,
            kind,
            body: Body::new(pos, tuning.radius),
            visual: Visual::create(platform, VisualKind::PowerUp(kind), pos, kind.color()),
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32, tuning: &PickupTuning, despawn_x: f32) {
        if !self.alive {
            return;
        }
        self.body.pos.x -= tuning.drift_speed * dt;
        if self.body.pos.x <= despawn_x {
            self.alive = false;
        }
    }

    /// One-shot: the first caller gets the kind, later callers get nothing
    pub fn consume(&mut self) -> Option<PowerUpKind> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        Some(self.kind)
    }
}

impl Entity for PowerUp {
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
