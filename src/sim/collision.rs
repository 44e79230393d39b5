//! Collision passes
//!
//! Every check is the same proximity test (`Body::overlaps`) over a full
//! scan of the pair lists; entity counts stay in the dozens so there is no
//! broad phase. Passes run in a fixed order and each skips anything a
//! previous pass already killed or consumed.

use super::enemy::{Death, DeathCause, Enemy};
use super::entity::Entity;
use super::pickup::PowerUpKind;
use super::state::{GameEvent, GameState};
use crate::platform::Platform;
use crate::tuning::Tuning;

/// Kill an enemy and release its visual; `None` if it was already dead
fn kill(enemy: &mut Enemy, cause: DeathCause, platform: &mut Platform<'_>) -> Option<Death> {
    let death = enemy.kill(cause)?;
    enemy.dispose(platform.visuals);
    Some(death)
}

/// Run every pass in order
pub fn resolve(state: &mut GameState, tuning: &Tuning, platform: &mut Platform<'_>) {
    projectiles_vs_enemies(state, tuning, platform);
    areas_vs_enemies(state, tuning, platform);
    enemy_projectiles_vs_player(state, tuning, platform);
    player_vs_enemies(state, tuning, platform);
    player_vs_powerups(state, tuning, platform);
    presents_vs_houses(state, tuning);
}

/// Pass 1: each player shot hits at most the first live enemy it overlaps
/// (collection order) and is consumed.
pub fn projectiles_vs_enemies(state: &mut GameState, tuning: &Tuning, platform: &mut Platform<'_>) {
    let mut deaths = Vec::new();
    for shot in state.projectiles.iter_mut().filter(|p| p.is_alive()) {
        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| e.is_alive() && shot.body.overlaps(&e.body))
        else {
            continue;
        };
        shot.consume();
        shot.dispose(platform.visuals);
        if enemy.take_damage(shot.damage, &tuning.enemy) {
            deaths.extend(kill(enemy, DeathCause::Shot, platform));
        }
    }
    for death in deaths {
        state.record_death(death, tuning, platform);
    }
}

/// Pass 2: every damaging area effect hits every live enemy inside its
/// current radius, again on every step it stays active.
pub fn areas_vs_enemies(state: &mut GameState, tuning: &Tuning, platform: &mut Platform<'_>) {
    let mut deaths = Vec::new();
    for area in state.areas.iter().filter(|a| a.is_damaging()) {
        for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
            if area.body.overlaps(&enemy.body) && enemy.take_damage(area.damage, &tuning.enemy) {
                deaths.extend(kill(enemy, DeathCause::Shot, platform));
            }
        }
    }
    for death in deaths {
        state.record_death(death, tuning, platform);
    }
}

/// Pass 3: enemy shots against the shield-aware hurtbox
pub fn enemy_projectiles_vs_player(state: &mut GameState, tuning: &Tuning, platform: &mut Platform<'_>) {
    for i in 0..state.enemy_projectiles.len() {
        if !state.player.is_alive() {
            return;
        }
        let hurtbox = state.player.hurtbox();
        let shot = &mut state.enemy_projectiles[i];
        if !shot.is_alive() || !shot.body.overlaps(&hurtbox) {
            continue;
        }
        shot.consume();
        shot.dispose(platform.visuals);
        let damage = shot.damage;
        state.damage_player(damage, tuning, platform);
    }
}

/// Pass 4: ramming. The enemy dies without scoring; the player takes
/// contact damage (ignored while invulnerable).
pub fn player_vs_enemies(state: &mut GameState, tuning: &Tuning, platform: &mut Platform<'_>) {
    for i in 0..state.enemies.len() {
        if !state.player.is_alive() {
            return;
        }
        let hurtbox = state.player.hurtbox();
        let enemy = &mut state.enemies[i];
        if !enemy.is_alive() || !enemy.body.overlaps(&hurtbox) {
            continue;
        }
        if let Some(death) = kill(enemy, DeathCause::Crashed, platform) {
            state.record_death(death, tuning, platform);
        }
        state.damage_player(tuning.enemy.contact_damage, tuning, platform);
    }
}

/// Pass 5: pickups touched by the craft itself (the shield does not collect)
pub fn player_vs_powerups(state: &mut GameState, tuning: &Tuning, platform: &mut Platform<'_>) {
    if !state.player.is_alive() {
        return;
    }
    let body = state.player.body;
    for powerup in state.powerups.iter_mut() {
        if !powerup.is_alive() || !powerup.body.overlaps(&body) {
            continue;
        }
        let Some(kind) = powerup.consume() else {
            continue;
        };
        powerup.dispose(platform.visuals);
        state.player.apply_power_up(kind, &tuning.player);
        if kind == PowerUpKind::Shield {
            state.player.show_shield(platform);
        }
        log::debug!("Collected {:?}", kind);
        state.events.push(GameEvent::PowerUpCollected { kind });
    }
}

/// Pass 6: falling presents landing on houses
pub fn presents_vs_houses(state: &mut GameState, tuning: &Tuning) {
    for present in state.presents.iter_mut().filter(|p| p.is_alive()) {
        for house in state.houses.iter_mut() {
            if let Some(score) = present.try_deliver(house, &tuning.present) {
                state.score += score;
                if score > 0 {
                    state.events.push(GameEvent::PresentDelivered {
                        house: house.id,
                        pos: present.body.pos,
                        score,
                    });
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessPlatform;
    use crate::sim::area::AreaFlavor;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::player::DamageOutcome;
    use glam::Vec3;

    fn setup(host: &mut HeadlessPlatform) -> (GameState, Tuning) {
        let tuning = Tuning::default();
        let state = GameState::new(42, &tuning, &mut host.platform());
        (state, tuning)
    }

    #[test]
    fn test_projectile_hits_only_first_enemy() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let at = Vec3::new(20.0, 0.0, 0.0);
        state.spawn_enemy(EnemyKind::Cruiser, at, &tuning, &mut host.platform());
        state.spawn_enemy(EnemyKind::Cruiser, at, &tuning, &mut host.platform());
        state.fire_player_volley(&[at], &tuning, &mut host.platform());

        projectiles_vs_enemies(&mut state, &tuning, &mut host.platform());

        let hp = tuning.enemy.cruiser.stats.hp;
        assert_eq!(state.enemies[0].hp, hp - tuning.player.projectile_damage);
        assert_eq!(state.enemies[1].hp, hp);
        assert!(!state.projectiles[0].is_alive());
        assert!(!state.projectiles[0].visual.is_held());

        // Consumed shots do nothing on a second pass
        projectiles_vs_enemies(&mut state, &tuning, &mut host.platform());
        assert_eq!(state.enemies[0].hp, hp - tuning.player.projectile_damage);
    }

    #[test]
    fn test_projectile_kill_scores_once() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let at = Vec3::new(20.0, 0.0, 0.0);
        state.spawn_enemy(EnemyKind::Scout, at, &tuning, &mut host.platform());
        state.fire_player_volley(&[at, at], &tuning, &mut host.platform());

        projectiles_vs_enemies(&mut state, &tuning, &mut host.platform());

        assert_eq!(state.score, tuning.enemy.scout.stats.score_value);
        assert!(!state.enemies[0].is_alive());
        // The second shot found nothing alive and flies on
        assert!(state.projectiles[1].is_alive());
        assert_eq!(host.visuals.double_disposals(), 0);
    }

    #[test]
    fn test_area_hits_every_step() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        state.spawn_enemy(EnemyKind::Cruiser, Vec3::new(20.0, 0.0, 0.0), &tuning, &mut host.platform());
        state.spawn_enemy(EnemyKind::Cruiser, Vec3::new(21.0, 1.0, 0.0), &tuning, &mut host.platform());
        for e in state.enemies.iter_mut() {
            e.hp = 100;
        }
        state.spawn_area(AreaFlavor::Plasma, Vec3::new(20.0, 0.0, 0.0), &tuning, &mut host.platform());
        state.areas[0].update(0.1);

        let damage = tuning.area.plasma.damage;
        areas_vs_enemies(&mut state, &tuning, &mut host.platform());
        areas_vs_enemies(&mut state, &tuning, &mut host.platform());
        assert_eq!(state.enemies[0].hp, 100 - 2 * damage);
        assert_eq!(state.enemies[1].hp, 100 - 2 * damage);
    }

    #[test]
    fn test_cosmetic_area_never_damages() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        state.spawn_enemy(EnemyKind::Scout, Vec3::new(20.0, 0.0, 0.0), &tuning, &mut host.platform());
        state.spawn_area(AreaFlavor::Explosion, Vec3::new(20.0, 0.0, 0.0), &tuning, &mut host.platform());
        state.areas[0].update(0.5);
        areas_vs_enemies(&mut state, &tuning, &mut host.platform());
        assert!(state.enemies[0].is_alive());
    }

    #[test]
    fn test_enemy_shot_uses_shield_radius() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let p = state.player.body.pos;
        // Outside the bare hurtbox, inside the shield
        let from = p + Vec3::X * 4.0;
        state.fire_enemy_shot(from, Vec3::ZERO, &tuning, &mut host.platform());

        enemy_projectiles_vs_player(&mut state, &tuning, &mut host.platform());
        assert!(state.enemy_projectiles[0].is_alive());

        state.player.apply_power_up(PowerUpKind::Shield, &tuning.player);
        enemy_projectiles_vs_player(&mut state, &tuning, &mut host.platform());
        assert!(!state.enemy_projectiles[0].is_alive());
        assert_eq!(state.player.hp, tuning.player.hp);
        assert_eq!(
            state.player.shield.charge,
            tuning.player.shield_charge - tuning.enemy.cruiser.projectile_damage
        );
    }

    #[test]
    fn test_crash_uses_shield_radius() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let p = state.player.body.pos;
        let scout = tuning.enemy.scout.stats.radius;
        // Between the bare reach and the shielded reach
        let gap = (tuning.player.radius + tuning.player.shield_radius) / 2.0 + scout;
        state.spawn_enemy(EnemyKind::Scout, p + Vec3::X * gap, &tuning, &mut host.platform());

        player_vs_enemies(&mut state, &tuning, &mut host.platform());
        assert!(state.enemies[0].is_alive());

        state.player.apply_power_up(PowerUpKind::Shield, &tuning.player);
        player_vs_enemies(&mut state, &tuning, &mut host.platform());
        assert!(!state.enemies[0].is_alive());
        assert_eq!(state.player.hp, tuning.player.hp);
        assert_eq!(
            state.player.shield.charge,
            tuning.player.shield_charge - tuning.enemy.contact_damage
        );
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyCrashed { .. }))
        );
    }

    #[test]
    fn test_crash_kills_without_score() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let p = state.player.body.pos;
        state.spawn_enemy(EnemyKind::Chaser, p, &tuning, &mut host.platform());
        state.spawn_enemy(EnemyKind::Scout, p, &tuning, &mut host.platform());

        player_vs_enemies(&mut state, &tuning, &mut host.platform());

        assert!(state.enemies.iter().all(|e| !e.is_alive()));
        assert_eq!(state.score, 0);
        // Second contact landed inside the invulnerability window
        assert_eq!(state.player.hp, tuning.player.hp - tuning.enemy.contact_damage);
        assert!(state.player.is_invulnerable());
        assert!(state.areas.is_empty());
    }

    #[test]
    fn test_dead_player_skips_remaining_passes() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let p = state.player.body.pos;
        state.player.hp = 1;
        state.spawn_enemy(EnemyKind::Chaser, p, &tuning, &mut host.platform());
        state.spawn_enemy(EnemyKind::Chaser, p, &tuning, &mut host.platform());

        player_vs_enemies(&mut state, &tuning, &mut host.platform());
        assert!(state.is_over());
        assert!(!state.enemies[0].is_alive());
        assert!(state.enemies[1].is_alive());
        assert_eq!(host.notifier.messages.len(), 1);
        assert_eq!(
            state.damage_player(1, &tuning, &mut host.platform()),
            DamageOutcome::Ignored
        );
    }

    #[test]
    fn test_powerup_collected_once() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let p = state.player.body.pos;
        state.spawn_powerup(PowerUpKind::Shield, p, &tuning, &mut host.platform());

        player_vs_powerups(&mut state, &tuning, &mut host.platform());
        player_vs_powerups(&mut state, &tuning, &mut host.platform());

        assert_eq!(state.player.shield.charge, tuning.player.shield_charge);
        assert!(state.player.shield.visual.is_held());
        let collected = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerUpCollected { .. }))
            .count();
        assert_eq!(collected, 1);
    }

    #[test]
    fn test_present_delivery_scores() {
        let mut host = HeadlessPlatform::new();
        let (mut state, tuning) = setup(&mut host);
        let roof = state.houses[1].body.pos;
        state.spawn_present(roof, &tuning, &mut host.platform());
        state.spawn_present(roof, &tuning, &mut host.platform());

        presents_vs_houses(&mut state, &tuning);

        assert_eq!(state.score, tuning.present.delivery_score);
        assert!(state.houses[1].has_received_present);
        assert!(state.presents.iter().all(|p| !p.is_alive()));
    }
}
