//! Simulation step
//!
//! One call advances the whole world by `dt` in a fixed order:
//! player -> spawning -> entity updates -> collision passes -> reaping -> HUD.

use glam::Vec3;

use super::area::AreaFlavor;
use super::collision;
use super::enemy::{DeathCause, EnemyAction};
use super::entity::Entity;
use super::spawn::SpawnOrder;
use super::state::GameState;
use crate::platform::Platform;
use crate::tuning::Tuning;

/// Pressed state of every logical action for a single step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    /// Plasma burst ability
    pub burst: bool,
    pub drop_present: bool,
}

/// Advance the game state by one step of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, tuning: &Tuning, platform: &mut Platform<'_>) {
    if state.is_over() {
        return;
    }
    state.elapsed += dt;
    state.trim_events();

    update_player(state, input, dt, tuning, platform);

    if platform.visuals.is_ready() {
        let orders = state
            .spawner
            .update(dt, &tuning.spawn, tuning.field.boundary_y, &mut state.rng);
        for order in orders {
            match order {
                SpawnOrder::Enemy { kind, y } => {
                    let pos = Vec3::new(tuning.field.spawn_x, y, 0.0);
                    state.spawn_enemy(kind, pos, tuning, platform);
                }
                SpawnOrder::PowerUp { kind, y } => {
                    let pos = Vec3::new(tuning.field.spawn_x, y, 0.0);
                    state.spawn_powerup(kind, pos, tuning, platform);
                }
            }
        }
    }

    update_projectiles(state, dt, tuning);
    update_enemies(state, dt, tuning, platform);

    for area in state.areas.iter_mut() {
        area.update(dt);
    }
    for powerup in state.powerups.iter_mut() {
        powerup.update(dt, &tuning.pickup, tuning.field.despawn_x);
    }
    for house in state.houses.iter_mut() {
        house.update(dt, &tuning.house, &tuning.field);
    }
    for present in state.presents.iter_mut() {
        present.update(dt, &tuning.present, tuning.house.ground_y);
    }

    collision::resolve(state, tuning, platform);

    state.reap(platform.visuals);

    let hud = state.hud(tuning);
    if state.last_hud.as_ref() != Some(&hud) {
        platform.hud.refresh(&hud);
        state.last_hud = Some(hud);
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32, tuning: &Tuning, platform: &mut Platform<'_>) {
    let player = &mut state.player;
    if !player.is_alive() {
        return;
    }
    player.tick_timers(dt);
    player.steer(input, dt, &tuning.player, &tuning.field);
    let pos = player.body.pos;

    if input.fire {
        if let Some(muzzles) = state.player.try_fire(&tuning.player) {
            state.fire_player_volley(&muzzles, tuning, platform);
        }
    }
    if input.burst && state.player.try_burst(&tuning.player) {
        log::debug!("Plasma burst at ({:.1}, {:.1})", pos.x, pos.y);
        state.spawn_area(AreaFlavor::Plasma, pos, tuning, platform);
    }
    if input.drop_present && state.player.try_drop_present(&tuning.player) {
        state.spawn_present(pos, tuning, platform);
    }
}

fn update_projectiles(state: &mut GameState, dt: f32, tuning: &Tuning) {
    for shot in state
        .projectiles
        .iter_mut()
        .chain(state.enemy_projectiles.iter_mut())
    {
        shot.update(dt);
        shot.expire_outside(&tuning.field);
    }
}

fn update_enemies(state: &mut GameState, dt: f32, tuning: &Tuning, platform: &mut Platform<'_>) {
    let target = state.player.is_alive().then_some(state.player.body.pos);
    let mut actions = Vec::new();
    let mut deaths = Vec::new();

    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        let action = enemy.update(dt, target, &tuning.enemy, &mut state.rng);
        match action {
            EnemyAction::Detonate { .. } => {
                if let Some(death) = enemy.kill(DeathCause::Detonated) {
                    enemy.dispose(platform.visuals);
                    deaths.push(death);
                    actions.push(action);
                }
            }
            // A shot requested on the way out is dropped with the enemy
            _ if enemy.body.pos.x < tuning.field.despawn_x => {
                if let Some(death) = enemy.kill(DeathCause::Escaped) {
                    enemy.dispose(platform.visuals);
                    deaths.push(death);
                }
            }
            EnemyAction::Fire { .. } => actions.push(action),
            EnemyAction::Idle => {}
        }
    }

    for death in deaths {
        state.record_death(death, tuning, platform);
    }

    for action in actions {
        match action {
            EnemyAction::Fire { from, dir } => state.fire_enemy_shot(from, dir, tuning, platform),
            EnemyAction::Detonate { at, damage, range } => {
                if state.player.is_alive() && state.player.body.pos.distance(at) < range {
                    state.damage_player(damage, tuning, platform);
                }
            }
            EnemyAction::Idle => {}
        }
    }
}
