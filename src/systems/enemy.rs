// =============================================================================
// Enemy Agent
// =============================================================================
//
// Walks enemies along the path, applies damage, and settles the economy when
// an enemy dies or reaches the village.
//
// =============================================================================

use crate::components::{Enemy, EntityId};
use crate::constants::WAYPOINT_TOLERANCE;
use crate::events::GameEvent;
use crate::map::Waypoints;
use crate::session::GameSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target is not alive (already dead, arrived, or never existed)
    Ignored,
    Wounded { health: i32 },
    Killed,
}

pub fn spawn_enemy(session: &mut GameSession) -> EntityId {
    let at = session.clock;
    spawn_enemy_at(session, at)
}

/// Spawn an enemy that was due at session time `at`. A late spawn is walked
/// forward by the lag so enemies of one wave keep their spacing on the road.
pub fn spawn_enemy_at(session: &mut GameSession, at: f64) -> EntityId {
    let id = session.allocate_id();
    let template = &session.config.enemy;
    let mut enemy = Enemy {
        position: session.config.spawner.spawn_point,
        health: template.health,
        max_health: template.health,
        speed: template.speed,
        bounty: template.bounty,
        current_waypoint: 0,
    };
    let lag = (session.clock - at).max(0.0) as f32;
    let arrived = walk(&mut enemy, &session.waypoints, lag);

    session.world.enemies.insert(id, enemy);
    session.spawner.enemies_alive += 1;
    session.emit(GameEvent::EnemySpawned { enemy: id, at });
    log::debug!(
        "Spawned {} {:?} at t={:.2} (lag {:.2})",
        session.config.enemy.name,
        id,
        at,
        lag
    );

    if arrived {
        reach_end(session, id);
    }
    id
}

/// Move along the path for `dt` seconds, carrying leftover distance past
/// reached waypoints. Returns true once the last waypoint is reached.
fn walk(enemy: &mut Enemy, waypoints: &Waypoints, dt: f32) -> bool {
    let mut budget = enemy.speed * dt;
    for _ in 0..=waypoints.len() {
        let target = waypoints.point(enemy.current_waypoint);
        let offset = target - enemy.position;
        let step = budget.min(offset.length());
        enemy.position += offset.normalize_or_zero() * step;
        budget -= step;

        if enemy.position.distance(target) > WAYPOINT_TOLERANCE {
            return false;
        }
        if waypoints.is_last(enemy.current_waypoint) {
            return true;
        }
        enemy.current_waypoint += 1;
        if budget <= 0.0 {
            return false;
        }
    }
    false
}

pub fn move_enemies(session: &mut GameSession, dt: f32) {
    let mut arrived = Vec::new();

    for (id, enemy) in session.world.enemies.iter_mut() {
        if walk(enemy, &session.waypoints, dt) {
            arrived.push(*id);
        }
    }

    for id in arrived {
        reach_end(session, id);
    }
}

fn reach_end(session: &mut GameSession, id: EntityId) {
    if remove_enemy(session, id).is_none() {
        return;
    }
    session.stats.lives -= 1;
    session.emit(GameEvent::EnemyReachedEnd { enemy: id });
    log::debug!(
        "Enemy {:?} reached the village, {} lives left",
        id,
        session.stats.lives
    );
}

fn remove_enemy(session: &mut GameSession, id: EntityId) -> Option<Enemy> {
    let enemy = session.world.enemies.remove(&id)?;
    session.spawner.enemies_alive = session.spawner.enemies_alive.saturating_sub(1);
    Some(enemy)
}

pub fn damage_enemy(session: &mut GameSession, id: EntityId, amount: u32) -> DamageOutcome {
    if session.controller.is_ended() {
        return DamageOutcome::Ignored;
    }
    let Some(enemy) = session.world.enemies.get_mut(&id) else {
        return DamageOutcome::Ignored;
    };

    let amount = i32::try_from(amount).unwrap_or(i32::MAX);
    enemy.health = enemy.health.saturating_sub(amount);
    if enemy.health > 0 {
        return DamageOutcome::Wounded {
            health: enemy.health,
        };
    }

    // Overkill counts as a kill
    if let Some(enemy) = remove_enemy(session, id) {
        session.stats.earn(enemy.bounty);
        session.stats.enemies_killed += 1;
        session.emit(GameEvent::EnemyKilled {
            enemy: id,
            bounty: enemy.bounty,
        });
        log::debug!("Enemy {:?} killed, +{} cash", id, enemy.bounty);
    }
    DamageOutcome::Killed
}

impl GameSession {
    /// Apply damage from an outside source such as a host physics callback.
    pub fn damage_enemy(&mut self, id: EntityId, amount: u32) -> DamageOutcome {
        damage_enemy(self, id, amount)
    }
}
