//! Expanding area effects
//!
//! Every flavor follows the same law: the collision radius grows linearly
//! from zero to `max_radius` over `duration`, then the effect deactivates.
//! Damaging effects hit every enemy inside the radius on every active step;
//! there is no per-target hit memory.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, Visual};
use crate::platform::{Platform, VisualKind};
use crate::tuning::{AreaFlavorTuning, AreaTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaFlavor {
    /// The player's burst ability (two visual layers)
    Plasma,
    /// Left behind by an enemy that was shot down
    Kinetic,
    /// Left behind by a self-detonation
    Explosion,
}

impl AreaFlavor {
    pub fn tuning<'a>(&self, area: &'a AreaTuning) -> &'a AreaFlavorTuning {
        match self {
            AreaFlavor::Plasma => &area.plasma,
            AreaFlavor::Kinetic => &area.shot,
            AreaFlavor::Explosion => &area.explosion,
        }
    }
}

/// Radius of an effect `elapsed` seconds after it started
#[inline]
pub fn radius_at(elapsed: f32, duration: f32, max_radius: f32) -> f32 {
    (elapsed / duration).clamp(0.0, 1.0) * max_radius
}

#[derive(Debug)]
pub struct AreaEffect {
    pub id: EntityId,
    pub flavor: AreaFlavor,
    /// Center plus current radius
    pub body: Body,
    pub elapsed: f32,
    pub duration: f32,
    pub max_radius: f32,
    pub damage: i32,
    pub visual: Visual,
    active: bool,
}

impl AreaEffect {
    pub fn spawn(
        id: EntityId,
        flavor: AreaFlavor,
        center: Vec3,
        tuning: &AreaTuning,
        platform: &mut Platform<'_>,
    ) -> Self {
        let t = flavor.tuning(tuning);
        let visual = match flavor {
            AreaFlavor::Plasma => {
                let mut v = Visual::create(platform, VisualKind::PlasmaCore, center, t.color);
                v.add_layer(platform, VisualKind::PlasmaArcs, center, t.color);
                v
            }
            AreaFlavor::Kinetic => Visual::create(platform, VisualKind::KineticBurst, center, t.color),
            AreaFlavor::Explosion => Visual::create(platform, VisualKind::Explosion, center, t.color),
        };
        Self {
            id,
            flavor,
            body: Body::new(center, 0.0),
            elapsed: 0.0,
            duration: t.duration,
            max_radius: t.max_radius,
            damage: t.damage,
            visual,
            active: true,
        }
    }

    pub fn current_radius(&self) -> f32 {
        self.body.radius
    }

    /// Whether this effect takes part in the area damage pass
    pub fn is_damaging(&self) -> bool {
        self.active && self.damage > 0
    }

    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.body.radius = self.max_radius;
            self.active = false;
        } else {
            self.body.radius = radius_at(self.elapsed, self.duration, self.max_radius);
        }
    }
}

impl Entity for AreaEffect {
    fn id(&self) -> EntityId {
        self.id
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn is_alive(&self) -> bool {
        self.active
    }

    fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }
}
