//! Shared entity plumbing: collision body, exclusively-owned visual handle,
//! and the capability trait every tracked object implements.

use glam::Vec3;

use crate::platform::{Platform, VisualFactory, VisualId, VisualKind};

/// Monotonic id source for entities (stable iteration/tie-break order)
pub type EntityId = u32;

/// Position plus collision extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec3,
    pub radius: f32,
}

impl Body {
    pub fn new(pos: Vec3, radius: f32) -> Self {
        Self { pos, radius }
    }

    /// Uniform proximity test: centers closer than the sum of the radii
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.pos.distance(other.pos) < self.radius + other.radius
    }
}

/// A host visual, possibly made of several layers, owned by exactly one
/// entity. `release` frees every layer and empties the handle, so a second
/// call is a no-op.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Visual {
    layers: Vec<(VisualKind, VisualId)>,
}

impl Visual {
    /// Handle with no host resources (used when the host refused a request)
    pub fn none() -> Self {
        Self { layers: Vec::new() }
    }

    /// Create a single-layer visual
    pub fn create(platform: &mut Platform<'_>, kind: VisualKind, pos: Vec3, color: u32) -> Self {
        let mut visual = Self::none();
        visual.add_layer(platform, kind, pos, color);
        visual
    }

    /// Attach another host object to this handle
    pub fn add_layer(&mut self, platform: &mut Platform<'_>, kind: VisualKind, pos: Vec3, color: u32) {
        if let Some(id) = platform.spawn_visual(kind, pos, color) {
            self.layers.push((kind, id));
        }
    }

    pub fn is_held(&self) -> bool {
        !self.layers.is_empty()
    }

    pub fn layers(&self) -> &[(VisualKind, VisualId)] {
        &self.layers
    }

    /// Dispose every layer. Returns how many host objects were freed.
    pub fn release(&mut self, factory: &mut dyn VisualFactory) -> usize {
        let count = self.layers.len();
        for (_, id) in self.layers.drain(..) {
            factory.dispose(id);
        }
        count
    }
}

/// Capability set shared by everything the simulation tracks
pub trait Entity {
    fn id(&self) -> EntityId;
    fn body(&self) -> &Body;
    fn is_alive(&self) -> bool;
    fn visual_mut(&mut self) -> &mut Visual;

    /// Release the visual handle. Safe to call any number of times.
    fn dispose(&mut self, factory: &mut dyn VisualFactory) {
        self.visual_mut().release(factory);
    }
}

/// Dispose and drop every entity that is no longer alive, keeping order
pub fn reap<E: Entity>(entities: &mut Vec<E>, factory: &mut dyn VisualFactory) {
    entities.retain_mut(|e| {
        if e.is_alive() {
            true
        } else {
            e.dispose(factory);
            false
        }
    });
}

/// Dispose every entity and empty the collection
pub fn release_all<E: Entity>(entities: &mut Vec<E>, factory: &mut dyn VisualFactory) {
    for e in entities.iter_mut() {
        e.dispose(factory);
    }
    entities.clear();
}
