// =============================================================================
// Trigger Collisions
// =============================================================================
//
// Enemies are tested against arrows and obstacles every tick. Only the first
// tick of an overlap counts as a trigger enter, so a moat slows an enemy once
// per entry rather than every frame it spends inside.
//
// What a collider is comes from its ColliderKind, fixed when the entity is
// created, not from a name or tag lookup.
//
// =============================================================================

use std::collections::HashSet;

use crate::components::{Collider, ColliderKind, EntityId, ObstacleKind};
use crate::events::GameEvent;
use crate::session::GameSession;
use crate::systems::enemy;

pub fn resolve_triggers(session: &mut GameSession) {
    let world = &session.world;
    let enemies: Vec<Collider> = world
        .enemies
        .iter()
        .map(|(id, enemy)| enemy.collider(*id))
        .collect();
    let others: Vec<Collider> = world
        .arrows
        .iter()
        .map(|(id, arrow)| arrow.collider(*id))
        .chain(world.obstacles.iter().map(|(id, o)| o.collider(*id)))
        .collect();

    let mut overlapping = HashSet::new();
    let mut entered = Vec::new();
    for enemy in &enemies {
        for other in &others {
            if !enemy.overlaps(other) {
                continue;
            }
            let pair = (enemy.id, other.id);
            if !session.overlaps.contains(&pair) {
                entered.push((enemy.id, other.id, other.kind));
            }
            overlapping.insert(pair);
        }
    }
    session.overlaps = overlapping;

    for (enemy, other, kind) in entered {
        on_enemy_trigger(session, enemy, other, kind);
    }
}

fn on_enemy_trigger(session: &mut GameSession, enemy: EntityId, other: EntityId, kind: ColliderKind) {
    if !session.world.enemies.contains_key(&enemy) {
        return;
    }

    match kind {
        ColliderKind::Projectile => {
            let Some(arrow) = session.world.arrows.remove(&other) else {
                return;
            };
            log::debug!("Arrow {:?} hit enemy {:?}", other, enemy);
            enemy::damage_enemy(session, enemy, arrow.damage.max(0) as u32);
        }
        ColliderKind::Obstacle => {
            if session.world.obstacles.remove(&other).is_some() {
                session.emit(GameEvent::ObstacleDestroyed {
                    obstacle: other,
                    kind: ObstacleKind::Barricade,
                });
                log::info!("Enemy hit barricade");
            }
        }
        ColliderKind::SlowZone => {
            if let Some(target) = session.world.enemies.get_mut(&enemy) {
                target.speed /= 2.0;
                let speed = target.speed;
                session.emit(GameEvent::EnemySlowed { enemy, speed });
            }
        }
        ColliderKind::Enemy => {}
    }
}

impl GameSession {
    pub fn collider_kind(&self, id: EntityId) -> Option<ColliderKind> {
        if self.world.enemies.contains_key(&id) {
            return Some(ColliderKind::Enemy);
        }
        if self.world.arrows.contains_key(&id) {
            return Some(ColliderKind::Projectile);
        }
        self.world.obstacles.get(&id).map(|o| o.collider(id).kind)
    }

    /// Trigger-enter notification from an outside physics step.
    pub fn trigger_enter(&mut self, a: EntityId, b: EntityId) {
        if self.controller.is_ended() {
            return;
        }
        match (self.collider_kind(a), self.collider_kind(b)) {
            (Some(ColliderKind::Enemy), Some(kind)) => on_enemy_trigger(self, a, b, kind),
            (Some(kind), Some(ColliderKind::Enemy)) => on_enemy_trigger(self, b, a, kind),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Arrow, Obstacle};
    use crate::config::GameConfig;
    use crate::systems::enemy::spawn_enemy;
    use glam::Vec3;

    fn session() -> GameSession {
        let mut config = GameConfig::default();
        config.obstacles.clear();
        config.spawner.spawn_point = Vec3::ZERO;
        GameSession::new(config).unwrap()
    }

    fn add_arrow(session: &mut GameSession, position: Vec3, damage: i32) -> EntityId {
        let id = session.allocate_id();
        session.world.arrows.insert(
            id,
            Arrow {
                position,
                velocity: Vec3::X,
                damage,
                lifetime: 4.0,
            },
        );
        id
    }

    #[test]
    fn arrow_damages_the_enemy_and_is_consumed() {
        let mut session = session();
        let enemy = spawn_enemy(&mut session);
        let arrow = add_arrow(&mut session, Vec3::new(0.5, 0.0, 0.0), 30);

        resolve_triggers(&mut session);

        assert_eq!(session.world().enemies[&enemy].health, 70);
        assert!(!session.world().arrows.contains_key(&arrow));
    }

    #[test]
    fn one_arrow_hits_only_one_enemy() {
        let mut session = session();
        let first = spawn_enemy(&mut session);
        let second = spawn_enemy(&mut session);
        add_arrow(&mut session, Vec3::ZERO, 30);

        resolve_triggers(&mut session);

        let wounded = [first, second]
            .iter()
            .filter(|id| session.world().enemies[*id].is_wounded())
            .count();
        assert_eq!(wounded, 1);
    }

    #[test]
    fn lethal_arrow_kills() {
        let mut session = session();
        let enemy = spawn_enemy(&mut session);
        add_arrow(&mut session, Vec3::ZERO, 100);

        resolve_triggers(&mut session);

        assert!(!session.world().enemies.contains_key(&enemy));
        assert_eq!(session.stats().enemies_killed, 1);
    }

    #[test]
    fn barricade_breaks_on_first_contact() {
        let mut session = session();
        let barricade = session.add_obstacle(Obstacle {
            kind: ObstacleKind::Barricade,
            position: Vec3::new(1.0, 0.0, 0.0),
            radius: 1.0,
        });
        let enemy = spawn_enemy(&mut session);

        resolve_triggers(&mut session);

        assert!(!session.world().obstacles.contains_key(&barricade));
        assert!(session.world().enemies.contains_key(&enemy));
    }

    #[test]
    fn moat_halves_speed_once_per_entry() {
        let mut session = session();
        session.add_obstacle(Obstacle {
            kind: ObstacleKind::Moat,
            position: Vec3::ZERO,
            radius: 2.0,
        });
        let enemy = spawn_enemy(&mut session);
        let speed = session.world().enemies[&enemy].speed;

        resolve_triggers(&mut session);
        resolve_triggers(&mut session);
        assert_eq!(session.world().enemies[&enemy].speed, speed / 2.0);

        // Leave and come back
        session.world.enemies.get_mut(&enemy).unwrap().position = Vec3::new(50.0, 0.0, 0.0);
        resolve_triggers(&mut session);
        session.world.enemies.get_mut(&enemy).unwrap().position = Vec3::ZERO;
        resolve_triggers(&mut session);
        assert_eq!(session.world().enemies[&enemy].speed, speed / 4.0);
    }

    #[test]
    fn external_notifications_use_collider_kinds() {
        let mut session = session();
        let enemy = spawn_enemy(&mut session);
        let arrow = add_arrow(&mut session, Vec3::new(100.0, 0.0, 0.0), 10);

        session.trigger_enter(arrow, enemy);
        assert_eq!(session.world().enemies[&enemy].health, 90);

        // Two enemies touching is not an interaction
        let other = spawn_enemy(&mut session);
        session.trigger_enter(enemy, other);
        assert_eq!(session.world().enemies[&other].health, 100);
    }
}
