//! Simulation module
//!
//! All gameplay logic lives here. It never touches a renderer or the DOM:
//! - Host objects only through `Platform`
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids increase monotonically)
//! - Step delta clamped to `field.max_step_dt`

pub mod area;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod house;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use area::{AreaEffect, AreaFlavor};
pub use enemy::{Behavior, DeathCause, Enemy, EnemyKind};
pub use entity::{Body, Entity, EntityId, Visual};
pub use house::{House, Present, PresentPhase};
pub use pickup::{PowerUp, PowerUpKind};
pub use player::{DamageOutcome, PlayerState};
pub use projectile::{Owner, Projectile};
pub use snapshot::{HudState, Snapshot};
pub use spawn::SpawnDirector;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};

use crate::platform::{Clock, InputSource, Platform};
use crate::tuning::{Tuning, TuningError};

/// Owns the balance sheet and the running game; the host calls `frame`
/// once per display refresh.
#[derive(Debug)]
pub struct Simulation {
    tuning: Tuning,
    state: GameState,
}

impl Simulation {
    /// Validate `tuning` and start a run
    pub fn new(tuning: Tuning, seed: u64, platform: &mut Platform<'_>) -> Result<Self, TuningError> {
        tuning.validate()?;
        let state = GameState::new(seed, &tuning, platform);
        Ok(Self { tuning, state })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Clamp the clock's delta, poll input once and run one step.
    /// Returns the dt actually simulated (zero once the game is over).
    pub fn frame(
        &mut self,
        clock: &mut dyn Clock,
        input: &mut dyn InputSource,
        platform: &mut Platform<'_>,
    ) -> f32 {
        let raw = clock.delta_seconds();
        if self.state.is_over() {
            return 0.0;
        }
        let dt = if raw.is_finite() {
            raw.clamp(0.0, self.tuning.field.max_step_dt)
        } else {
            0.0
        };
        let input = input.poll(&self.state);
        tick(&mut self.state, &input, dt, &self.tuning, platform);
        dt
    }

    /// Release every live visual and start over with a new seed
    pub fn reset(&mut self, seed: u64, platform: &mut Platform<'_>) {
        self.state.release_all(platform.visuals);
        self.state = GameState::new(seed, &self.tuning, platform);
        log::info!("Simulation reset");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.tuning)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}
