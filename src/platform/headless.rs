//! In-process collaborators
//!
//! Used by the test suite and by the native demo binary. The visual factory
//! keeps a ledger of live ids so lifecycle bugs (leaks, double disposal) show
//! up as counts instead of silent corruption.

use std::collections::{HashMap, HashSet};

use super::{
    Clock, GameOverNotifier, HudSink, InputSource, Platform, VisualError, VisualFactory, VisualId,
    VisualKind, VisualRequest,
};
use crate::sim::{Entity, GameState, HudState, TickInput};

/// Visual factory that only records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingVisuals {
    next_id: VisualId,
    live: HashMap<VisualId, VisualKind>,
    disposed: HashSet<VisualId>,
    created: usize,
    double_disposals: usize,
    fallbacks: usize,
    /// Kinds whose template is "not loaded yet"
    pub missing_templates: HashSet<VisualKind>,
    /// Gate for the spawning precondition
    pub ready: bool,
}

impl RecordingVisuals {
    pub fn new() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_of(&self, kind: VisualKind) -> usize {
        self.live.values().filter(|&&k| k == kind).count()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn double_disposals(&self) -> usize {
        self.double_disposals
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    pub fn is_live(&self, id: VisualId) -> bool {
        self.live.contains_key(&id)
    }
}

impl VisualFactory for RecordingVisuals {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn create(&mut self, request: &VisualRequest) -> Result<VisualId, VisualError> {
        if !request.fallback && self.missing_templates.contains(&request.kind) {
            return Err(VisualError::TemplateMissing(request.kind));
        }
        if request.fallback {
            self.fallbacks += 1;
        }
        self.next_id += 1;
        self.created += 1;
        self.live.insert(self.next_id, request.kind);
        Ok(self.next_id)
    }

    fn dispose(&mut self, id: VisualId) {
        if self.live.remove(&id).is_none() || !self.disposed.insert(id) {
            log::error!("Visual {} disposed twice or never created", id);
            self.double_disposals += 1;
        }
    }
}

/// Keeps every HUD refresh it receives
#[derive(Debug, Default)]
pub struct RecordingHud {
    pub refreshes: Vec<HudState>,
}

impl RecordingHud {
    pub fn last(&self) -> Option<&HudState> {
        self.refreshes.last()
    }
}

impl HudSink for RecordingHud {
    fn refresh(&mut self, hud: &HudState) {
        self.refreshes.push(hud.clone());
    }
}

/// Keeps every game-over message it receives
#[derive(Debug, Default)]
pub struct RecordingGameOver {
    pub messages: Vec<(String, String)>,
}

impl GameOverNotifier for RecordingGameOver {
    fn game_over(&mut self, title: &str, message: &str) {
        log::info!("{} {}", title, message);
        self.messages.push((title.to_string(), message.to_string()));
    }
}

/// All headless collaborators bundled together
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    pub visuals: RecordingVisuals,
    pub hud: RecordingHud,
    pub notifier: RecordingGameOver,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            visuals: RecordingVisuals::new(),
            hud: RecordingHud::default(),
            notifier: RecordingGameOver::default(),
        }
    }

    pub fn platform(&mut self) -> Platform<'_> {
        Platform::new(&mut self.visuals, &mut self.hud, &mut self.notifier)
    }
}

/// Clock that advances by the same amount every call
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub dt: f32,
}

impl Clock for FixedClock {
    fn delta_seconds(&mut self) -> f32 {
        self.dt
    }
}

/// Replays the same input every step
#[derive(Debug, Clone, Default)]
pub struct ConstantInput(pub TickInput);

impl InputSource for ConstantInput {
    fn poll(&mut self, _state: &GameState) -> TickInput {
        self.0.clone()
    }
}

/// Demo pilot: lines up with the nearest threat, keeps firing, bursts when
/// something gets close and drops presents over undelivered houses.
#[derive(Debug, Clone, Default)]
pub struct Autopilot;

impl InputSource for Autopilot {
    fn poll(&mut self, state: &GameState) -> TickInput {
        let mut input = TickInput {
            fire: true,
            ..Default::default()
        };
        let player = &state.player;
        if !player.is_alive() {
            return input;
        }
        let pos = player.body.pos;

        let target = state
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                a.body
                    .pos
                    .distance(pos)
                    .partial_cmp(&b.body.pos.distance(pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(enemy) = target {
            let dy = enemy.body.pos.y - pos.y;
            input.up = dy > 0.5;
            input.down = dy < -0.5;
            input.burst = enemy.body.pos.distance(pos) < 12.0;
            // Back off from anything about to blow up
            input.left = enemy.is_flashing();
        }

        input.drop_present = state
            .houses
            .iter()
            .any(|h| !h.has_received_present && (h.body.pos.x - pos.x).abs() < h.width / 2.0);

        input
    }
}
