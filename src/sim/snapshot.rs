//! Read-only views of the state for the host: HUD values and a render
//! snapshot listing every live visual.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, Visual};
use super::state::{GamePhase, GameState};
use crate::platform::VisualId;
use crate::tuning::Tuning;

/// Values the HUD displays. Timers are whole seconds (rounded up) so the
/// sink is only refreshed when something visible changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudState {
    pub score: u64,
    pub hp: i32,
    pub max_hp: i32,
    /// Remaining shield charge as a percentage of a full pickup
    pub shield_percent: u32,
    /// Seconds until the burst ability is ready (0 = ready)
    pub burst_cooldown: u32,
    /// Seconds of triple shot left
    pub triple_shot: u32,
}

fn whole_seconds(t: f32) -> u32 {
    t.max(0.0).ceil() as u32
}

impl HudState {
    pub fn from_state(state: &GameState, tuning: &Tuning) -> Self {
        let player = &state.player;
        let full = tuning.player.shield_charge.max(1);
        Self {
            score: state.score,
            hp: player.hp,
            max_hp: tuning.player.hp,
            shield_percent: (player.shield.charge.max(0) * 100 / full) as u32,
            burst_cooldown: whole_seconds(player.burst_cooldown),
            triple_shot: whole_seconds(player.triple_shot_timer),
        }
    }
}

/// One drawable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub entity: EntityId,
    pub visuals: Vec<VisualId>,
    pub position: Vec3,
    /// Collision radius (current radius for area effects)
    pub radius: f32,
    pub visible: bool,
    /// Hit-flash tint active
    pub flash: bool,
}

impl VisualState {
    fn of<E: Entity>(entity: &E, visual: &Visual) -> Option<Self> {
        let body = entity.body();
        visual.is_held().then(|| Self {
            entity: entity.id(),
            visuals: visual.layers().iter().map(|&(_, id)| id).collect(),
            position: body.pos,
            radius: body.radius,
            visible: true,
            flash: false,
        })
    }

    fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub elapsed: f32,
    pub hud: HudState,
    pub objects: Vec<VisualState>,
}

impl Snapshot {
    pub fn capture(state: &GameState, tuning: &Tuning) -> Self {
        let mut objects = Vec::new();
        let player = &state.player;

        if let Some(mut v) = VisualState::of(player, &player.visual) {
            v.visible = player.visible;
            objects.push(v);
        }
        objects.extend(
            VisualState::of(player, &player.shield.visual).map(|v| v.with_radius(player.shield.radius)),
        );

        for e in state.enemies.iter().filter(|e| e.is_alive()) {
            if let Some(mut v) = VisualState::of(e, &e.visual) {
                v.visible = e.visible;
                v.flash = e.damage_flash > 0.0;
                objects.push(v);
            }
        }

        let rest = state
            .projectiles
            .iter()
            .chain(state.enemy_projectiles.iter())
            .filter(|p| p.is_alive())
            .filter_map(|p| VisualState::of(p, &p.visual))
            .chain(
                state
                    .areas
                    .iter()
                    .filter(|a| a.is_alive())
                    .filter_map(|a| VisualState::of(a, &a.visual).map(|v| v.with_radius(a.current_radius()))),
            )
            .chain(
                state
                    .powerups
                    .iter()
                    .filter(|p| p.is_alive())
                    .filter_map(|p| VisualState::of(p, &p.visual)),
            )
            .chain(state.houses.iter().filter_map(|h| VisualState::of(h, &h.visual)))
            .chain(
                state
                    .presents
                    .iter()
                    .filter(|p| p.is_alive())
                    .filter_map(|p| VisualState::of(p, &p.visual)),
            );
        objects.extend(rest);

        Self {
            phase: state.phase,
            elapsed: state.elapsed,
            hud: HudState::from_state(state, tuning),
            objects,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
