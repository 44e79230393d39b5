//! The player's craft: movement, cooldowns, buffs and the damage policy
//! (shield absorbs first, then hp; invulnerability window after a hit).

use glam::Vec3;

use super::entity::{Body, Entity, EntityId, Visual};
use super::pickup::PowerUpKind;
use super::tick::TickInput;
use crate::platform::{Platform, VisualFactory, VisualKind};
use crate::tuning::{FieldTuning, PlayerTuning};

const PLAYER_COLOR: u32 = 0x58a6ff;
const SHIELD_COLOR: u32 = 0x00ffff;

/// Shield sub-component: a charge pool that soaks damage before hp and
/// enlarges the hurtbox while up.
#[derive(Debug)]
pub struct Shield {
    pub charge: i32,
    pub radius: f32,
    pub visual: Visual,
}

impl Shield {
    pub fn is_up(&self) -> bool {
        self.charge > 0
    }

    /// Soak as much of `amount` as the charge allows, returning the remainder
    pub fn absorb(&mut self, amount: i32) -> i32 {
        let absorbed = amount.min(self.charge).max(0);
        self.charge -= absorbed;
        amount - absorbed
    }
}

/// Result of a single `take_damage` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable (or already dead): nothing changed
    Ignored,
    /// Shield soaked all of it
    Absorbed { absorbed: i32 },
    /// Hp was lost and the invulnerability window opened
    Hurt { absorbed: i32, hp_lost: i32 },
    /// Hp reached zero; fires once per run
    Died,
}

/// Player's mutable combat state
#[derive(Debug)]
pub struct PlayerState {
    pub id: EntityId,
    pub body: Body,
    pub visual: Visual,
    pub shield: Shield,
    pub hp: i32,
    alive: bool,
    /// Remaining seconds of the invulnerability window
    pub invulnerable_timer: f32,
    pub fire_cooldown: f32,
    pub burst_cooldown: f32,
    pub present_cooldown: f32,
    /// Remaining seconds of triple shot
    pub triple_shot_timer: f32,
    /// Blink state during invulnerability
    pub visible: bool,
}

impl PlayerState {
    pub fn new(id: EntityId, tuning: &PlayerTuning, field: &FieldTuning) -> Self {
        Self {
            id,
            body: Body::new(Vec3::new(-field.boundary_x + 5.0, 0.0, 0.0), tuning.radius),
            visual: Visual::none(),
            shield: Shield {
                charge: 0,
                radius: tuning.shield_radius,
                visual: Visual::none(),
            },
            hp: tuning.hp,
            alive: true,
            invulnerable_timer: 0.0,
            fire_cooldown: 0.0,
            burst_cooldown: 0.0,
            present_cooldown: 0.0,
            triple_shot_timer: 0.0,
            visible: true,
        }
    }

    /// Create the craft's visual
    pub fn attach_visuals(&mut self, platform: &mut Platform<'_>) {
        self.visual = Visual::create(platform, VisualKind::Player, self.body.pos, PLAYER_COLOR);
    }

    /// Show the shield bubble if it is up and not already shown
    pub fn show_shield(&mut self, platform: &mut Platform<'_>) {
        if self.shield_visible() && !self.shield.visual.is_held() {
            self.shield.visual = Visual::create(platform, VisualKind::Shield, self.body.pos, SHIELD_COLOR);
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    pub fn is_triple_shot_active(&self) -> bool {
        self.triple_shot_timer > 0.0
    }

    /// Hurtbox radius; the shield supersedes the base radius while up
    pub fn effective_radius(&self) -> f32 {
        if self.shield.is_up() {
            self.shield.radius
        } else {
            self.body.radius
        }
    }

    /// Body used for every hostile collision check
    pub fn hurtbox(&self) -> Body {
        Body::new(self.body.pos, self.effective_radius())
    }

    /// Move by input, clamping each axis to the play field independently
    pub fn steer(&mut self, input: &TickInput, dt: f32, tuning: &PlayerTuning, field: &FieldTuning) {
        let step = tuning.speed * dt;
        let mut delta = Vec3::ZERO;
        if input.left {
            delta.x -= step;
        }
        if input.right {
            delta.x += step;
        }
        if input.up {
            delta.y += step;
        }
        if input.down {
            delta.y -= step;
        }

        let max_y = field.boundary_y - tuning.vertical_margin;
        self.body.pos.x = (self.body.pos.x + delta.x).clamp(-field.boundary_x, field.boundary_x);
        self.body.pos.y = (self.body.pos.y + delta.y).clamp(-max_y, max_y);
    }

    /// Count every timer down toward zero
    pub fn tick_timers(&mut self, dt: f32) {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.burst_cooldown = (self.burst_cooldown - dt).max(0.0);
        self.present_cooldown = (self.present_cooldown - dt).max(0.0);
        self.triple_shot_timer = (self.triple_shot_timer - dt).max(0.0);

        if self.is_invulnerable() {
            self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
            self.visible = (self.invulnerable_timer * 10.0).floor() as i32 % 2 == 0;
        } else {
            self.visible = true;
        }
    }

    /// Spawn points for this volley, if the gun is ready
    pub fn try_fire(&mut self, tuning: &PlayerTuning) -> Option<Vec<Vec3>> {
        if self.fire_cooldown > 0.0 {
            return None;
        }
        self.fire_cooldown = tuning.fire_cooldown;

        let muzzle = self.body.pos - Vec3::Z * 2.0;
        let mut shots = vec![muzzle];
        if self.is_triple_shot_active() {
            shots.push(muzzle + Vec3::Y * tuning.triple_shot_spread);
            shots.push(muzzle - Vec3::Y * tuning.triple_shot_spread);
        }
        Some(shots)
    }

    /// Whether the burst ability fired (and its cooldown restarted)
    pub fn try_burst(&mut self, tuning: &PlayerTuning) -> bool {
        if self.burst_cooldown > 0.0 {
            return false;
        }
        self.burst_cooldown = tuning.burst_cooldown;
        true
    }

    pub fn try_drop_present(&mut self, tuning: &PlayerTuning) -> bool {
        if self.present_cooldown > 0.0 {
            return false;
        }
        self.present_cooldown = tuning.present_cooldown;
        true
    }

    /// Shield absorbs first; any remainder hits hp. Surviving a hit opens the
    /// invulnerability window, during which damage is ignored entirely.
    pub fn take_damage(&mut self, amount: i32, tuning: &PlayerTuning) -> DamageOutcome {
        if !self.alive || self.is_invulnerable() || amount <= 0 {
            return DamageOutcome::Ignored;
        }

        let remaining = self.shield.absorb(amount);
        let absorbed = amount - remaining;
        if remaining <= 0 {
            return DamageOutcome::Absorbed { absorbed };
        }

        self.hp -= remaining;
        if self.hp <= 0 {
            self.hp = 0;
            self.alive = false;
            DamageOutcome::Died
        } else {
            self.invulnerable_timer = tuning.invulnerability;
            DamageOutcome::Hurt {
                absorbed,
                hp_lost: remaining,
            }
        }
    }

    pub fn apply_power_up(&mut self, kind: PowerUpKind, tuning: &PlayerTuning) {
        match kind {
            PowerUpKind::TripleShot => self.triple_shot_timer = tuning.triple_shot_duration,
            PowerUpKind::Shield => self.shield.charge = tuning.shield_charge,
        }
    }

    /// Whether the shield bubble should be drawn
    pub fn shield_visible(&self) -> bool {
        self.alive && self.shield.is_up()
    }
}

impl Entity for PlayerState {
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

    fn dispose(&mut self, factory: &mut dyn VisualFactory) {
        self.visual.release(factory);
        self.shield.visual.release(factory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player() -> (PlayerState, PlayerTuning) {
        let tuning = PlayerTuning::default();
        (PlayerState::new(1, &tuning, &FieldTuning::default()), tuning)
    }

    #[test]
    fn test_shield_absorbs_before_hp() {
        let (mut p, tuning) = player();
        p.shield.charge = 3;

        let outcome = p.take_damage(5, &tuning);
        assert_eq!(outcome, DamageOutcome::Hurt { absorbed: 3, hp_lost: 2 });
        assert_eq!(p.shield.charge, 0);
        assert_eq!(p.hp, 8);
        assert!(p.is_invulnerable());
        assert!(!p.shield_visible());
    }

    #[test]
    fn test_fully_absorbed_hit_skips_invulnerability() {
        let (mut p, tuning) = player();
        p.shield.charge = 5;

        assert_eq!(p.take_damage(2, &tuning), DamageOutcome::Absorbed { absorbed: 2 });
        assert_eq!(p.hp, 10);
        assert_eq!(p.shield.charge, 3);
        assert!(!p.is_invulnerable());
    }

    #[test]
    fn test_invulnerability_ignores_damage() {
        let (mut p, tuning) = player();
        p.take_damage(1, &tuning);
        assert_eq!(p.hp, 9);

        p.shield.charge = 2;
        p.tick_timers(1.9);
        assert_eq!(p.take_damage(4, &tuning), DamageOutcome::Ignored);
        assert_eq!(p.hp, 9);
        assert_eq!(p.shield.charge, 2);

        p.tick_timers(0.2);
        assert!(!p.is_invulnerable());
        assert!(p.take_damage(1, &tuning) != DamageOutcome::Ignored);
    }

    #[test]
    fn test_death_fires_once_and_clamps() {
        let (mut p, tuning) = player();
        p.hp = 1;
        assert_eq!(p.take_damage(5, &tuning), DamageOutcome::Died);
        assert_eq!(p.hp, 0);
        assert!(!p.is_alive());
        assert_eq!(p.take_damage(5, &tuning), DamageOutcome::Ignored);
    }

    #[test]
    fn test_cooldown_gates_fire() {
        let (mut p, tuning) = player();
        assert_eq!(p.try_fire(&tuning).map(|s| s.len()), Some(1));
        assert!(p.try_fire(&tuning).is_none());
        p.tick_timers(0.25);
        assert_eq!(p.fire_cooldown, 0.0);
        assert!(p.try_fire(&tuning).is_some());
    }

    #[test]
    fn test_triple_shot_spreads_and_expires() {
        let (mut p, tuning) = player();
        p.apply_power_up(PowerUpKind::TripleShot, &tuning);
        let shots = p.try_fire(&tuning).unwrap();
        assert_eq!(shots.len(), 3);
        assert_eq!(shots[1].y - shots[0].y, tuning.triple_shot_spread);

        p.tick_timers(tuning.triple_shot_duration);
        assert!(!p.is_triple_shot_active());
    }

    #[test]
    fn test_shield_enlarges_hurtbox() {
        let (mut p, tuning) = player();
        assert_eq!(p.effective_radius(), tuning.radius);
        p.apply_power_up(PowerUpKind::Shield, &tuning);
        assert_eq!(p.shield.charge, tuning.shield_charge);
        assert_eq!(p.effective_radius(), tuning.shield_radius);
    }

    #[test]
    fn test_invulnerability_blinks() {
        let (mut p, tuning) = player();
        p.take_damage(1, &tuning);
        p.tick_timers(0.05); // 1.95 -> floor(19.5) = 19, odd
        assert!(!p.visible);
        p.tick_timers(0.1); // 1.85 -> 18, even
        assert!(p.visible);
    }

    proptest! {
        #[test]
        fn prop_steering_stays_in_bounds(
            moves in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..200)
        ) {
            let (mut p, tuning) = player();
            let field = FieldTuning::default();
            for (left, right, up, down) in moves {
                let input = TickInput { left, right, up, down, ..Default::default() };
                p.steer(&input, 0.05, &tuning, &field);
                prop_assert!(p.body.pos.x.abs() <= field.boundary_x);
                prop_assert!(p.body.pos.y.abs() <= field.boundary_y - tuning.vertical_margin);
            }
        }
    }
}
