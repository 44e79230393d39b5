//! Scrolling houses and the presents dropped onto them
//!
//! Houses form a fixed ring: one that scrolls past the despawn line jumps
//! forward by the ring span and forgets its delivery. Presents are plain
//! entities with an explicit phase advanced by the same step as everything
//! else.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, Visual};
use crate::platform::{Platform, VisualKind};
use crate::tuning::{FieldTuning, HouseTuning, PresentTuning};

const HOUSE_COLOR: u32 = 0x8b4513;
const PRESENT_COLOR: u32 = 0xff0000;

#[derive(Debug)]
pub struct House {
    pub id: EntityId,
    /// Center of the house rectangle
    pub body: Body,
    pub width: f32,
    pub height: f32,
    pub has_received_present: bool,
    pub visual: Visual,
}

impl House {
    pub fn spawn(id: EntityId, x: f32, tuning: &HouseTuning, platform: &mut Platform<'_>) -> Self {
        let pos = Vec3::new(x, tuning.ground_y + tuning.height / 2.0, tuning.depth_z);
        Self {
            id,
            body: Body::new(pos, tuning.width.max(tuning.height) / 2.0),
            width: tuning.width,
            height: tuning.height,
            has_received_present: false,
            visual: Visual::create(platform, VisualKind::House, pos, HOUSE_COLOR),
        }
    }

    /// Whether `p` lies inside the house rectangle (x/y only)
    pub fn contains(&self, p: Vec3) -> bool {
        (p.x - self.body.pos.x).abs() <= self.width / 2.0
            && (p.y - self.body.pos.y).abs() <= self.height / 2.0
    }

    /// Scroll left; returns true if the house wrapped around the ring
    pub fn update(&mut self, dt: f32, tuning: &HouseTuning, field: &FieldTuning) -> bool {
        self.body.pos.x -= tuning.speed * dt;
        if self.body.pos.x < tuning.despawn_x(field.boundary_x) {
            self.body.pos.x += tuning.recycle_span(field.boundary_x);
            self.has_received_present = false;
            return true;
        }
        false
    }
}

impl Entity for House {
    fn id(&self) -> EntityId {
        self.id
    }

    fn body(&self) -> &Body {
        &self.body
    }

    /// Houses are recycled, never removed
    fn is_alive(&self) -> bool {
        true
    }

    fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }
}

/// Lay out `tuning.count` houses evenly across the ring
pub fn build_row(
    first_id: EntityId,
    tuning: &HouseTuning,
    field: &FieldTuning,
    platform: &mut Platform<'_>,
) -> Vec<House> {
    let span = tuning.recycle_span(field.boundary_x);
    let spacing = span / tuning.count.max(1) as f32;
    (0..tuning.count)
        .map(|i| {
            let x = -field.boundary_x + spacing * i as f32;
            House::spawn(first_id + i as EntityId, x, tuning, platform)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentPhase {
    Falling,
    Delivered,
    Lost,
}

#[derive(Debug)]
pub struct Present {
    pub id: EntityId,
    pub body: Body,
    pub vel: Vec3,
    pub elapsed: f32,
    pub phase: PresentPhase,
    pub visual: Visual,
}

impl Present {
    /// Dropped at `pos`, inheriting the houses' scroll so it falls straight
    /// down relative to them
    pub fn spawn(
        id: EntityId,
        pos: Vec3,
        tuning: &PresentTuning,
        house: &HouseTuning,
        platform: &mut Platform<'_>,
    ) -> Self {
        Self {
            id,
            body: Body::new(pos, tuning.radius),
            vel: Vec3::new(-house.speed, 0.0, 0.0),
            elapsed: 0.0,
            phase: PresentPhase::Falling,
            visual: Visual::create(platform, VisualKind::Present, pos, PRESENT_COLOR),
        }
    }

    pub fn update(&mut self, dt: f32, tuning: &PresentTuning, floor_y: f32) {
        if self.phase != PresentPhase::Falling {
            return;
        }
        self.vel.y -= tuning.gravity * dt;
        self.body.pos += self.vel * dt;
        self.elapsed += dt;
        if self.elapsed >= tuning.lifetime || self.body.pos.y < floor_y {
            self.phase = PresentPhase::Lost;
        }
    }

    /// Land on `house` if inside it. Returns the points earned (zero when the
    /// house already had a present), or `None` if nothing happened.
    pub fn try_deliver(&mut self, house: &mut House, tuning: &PresentTuning) -> Option<u64> {
        if self.phase != PresentPhase::Falling || !house.contains(self.body.pos) {
            return None;
        }
        self.phase = PresentPhase::Delivered;
        if house.has_received_present {
            Some(0)
        } else {
            house.has_received_present = true;
            Some(tuning.delivery_score)
        }
    }
}

impl Entity for Present {
    fn id(&self) -> EntityId {
        self.id
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn is_alive(&self) -> bool {
        self.phase == PresentPhase::Falling
    }

    fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }
}
