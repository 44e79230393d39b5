//! Platform abstraction layer
//!
//! The simulation never touches a renderer, the DOM or the keyboard directly.
//! It talks to its host through these collaborators:
//! - `VisualFactory`: creates and disposes opaque visual handles
//! - `InputSource`: pressed-state of the logical actions, polled once per step
//! - `HudSink`: told whenever score/hp/shield/cooldowns change
//! - `GameOverNotifier`: told once when the player dies
//! - `Clock`: elapsed time since the previous step
//!
//! `headless` provides in-process implementations for tests and the native
//! demo binary.

pub mod headless;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{GameState, HudState, PowerUpKind, TickInput};

/// Opaque id of a host-side visual object
pub type VisualId = u64;

/// Semantic kind of a visual; the host picks mesh/material/shader from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    Player,
    Shield,
    Chaser,
    Cruiser,
    Scout,
    PlayerShot,
    EnemyShot,
    /// Inner layer of the player's plasma burst
    PlasmaCore,
    /// Outer arc layer of the player's plasma burst
    PlasmaArcs,
    /// Particle burst left by a shot-down enemy
    KineticBurst,
    /// Particle burst of a self-detonation
    Explosion,
    PowerUp(PowerUpKind),
    House,
    Present,
}

/// Everything the host needs to build one visual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualRequest {
    pub kind: VisualKind,
    pub position: Vec3,
    pub color: u32,
    /// Ask for the minimal primitive instead of the loaded template
    pub fallback: bool,
}

/// Failure to produce a visual
#[derive(Debug, Error)]
pub enum VisualError {
    #[error("visual template for {0:?} is not loaded")]
    TemplateMissing(VisualKind),
    #[error("host rejected visual request: {0}")]
    Rejected(String),
}

/// Creates and releases host visuals.
///
/// The core calls `create` once per handle and `dispose` exactly once for
/// every id `create` returned.
pub trait VisualFactory {
    /// Whether the templates required for spawning are available
    fn is_ready(&self) -> bool {
        true
    }

    fn create(&mut self, request: &VisualRequest) -> Result<VisualId, VisualError>;

    fn dispose(&mut self, id: VisualId);
}

/// Polled once per step for the pressed state of every logical action
pub trait InputSource {
    fn poll(&mut self, state: &GameState) -> TickInput;
}

/// Receives the HUD values whenever one of them changed during a step
pub trait HudSink {
    fn refresh(&mut self, hud: &HudState);
}

/// Told once, with a title and summary, when the player's hp reaches zero
pub trait GameOverNotifier {
    fn game_over(&mut self, title: &str, message: &str);
}

/// Elapsed seconds since the previous call
pub trait Clock {
    fn delta_seconds(&mut self) -> f32;
}

/// The host collaborators a step needs, borrowed for its duration
pub struct Platform<'a> {
    pub visuals: &'a mut dyn VisualFactory,
    pub hud: &'a mut dyn HudSink,
    pub game_over: &'a mut dyn GameOverNotifier,
}

impl<'a> Platform<'a> {
    pub fn new(
        visuals: &'a mut dyn VisualFactory,
        hud: &'a mut dyn HudSink,
        game_over: &'a mut dyn GameOverNotifier,
    ) -> Self {
        Self {
            visuals,
            hud,
            game_over,
        }
    }

    /// Create a visual, falling back to the host's primitive stand-in when the
    /// template is missing. Returns `None` only if the host refuses both.
    pub fn spawn_visual(&mut self, kind: VisualKind, position: Vec3, color: u32) -> Option<VisualId> {
        let mut request = VisualRequest {
            kind,
            position,
            color,
            fallback: false,
        };
        match self.visuals.create(&request) {
            Ok(id) => Some(id),
            Err(VisualError::TemplateMissing(_)) => {
                log::warn!("No template for {:?}, using fallback primitive", kind);
                request.fallback = true;
                match self.visuals.create(&request) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        log::error!("Fallback visual for {:?} failed: {}", kind, e);
                        None
                    }
                }
            }
            Err(e) => {
                log::error!("Visual for {:?} failed: {}", kind, e);
                None
            }
        }
    }
}
