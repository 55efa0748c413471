use crate::components::{Arrow, EntityId};
use crate::constants::ARROW_LIFETIME;
use crate::events::GameEvent;
use crate::session::GameSession;

/// Count down every building's fire timer and loose an arrow when it runs out.
pub fn fire_buildings(session: &mut GameSession, dt: f32) {
    let mut shots: Vec<(EntityId, Arrow)> = Vec::new();

    for (id, building) in session.world.buildings.iter_mut() {
        building.fire_countdown -= dt;
        if building.fire_countdown <= 0.0 {
            shots.push((
                *id,
                Arrow {
                    position: building.position,
                    velocity: building.facing.direction() * building.arrow_speed,
                    damage: building.arrow_damage,
                    lifetime: ARROW_LIFETIME,
                },
            ));
            building.fire_countdown = 1.0 / building.fire_rate;
        }
    }

    for (building, arrow) in shots {
        let id = session.allocate_id();
        session.world.arrows.insert(id, arrow);
        session.stats.arrows_fired += 1;
        session.emit(GameEvent::ArrowFired {
            building,
            arrow: id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SiteId;
    use crate::config::GameConfig;

    #[test]
    fn new_building_fires_at_once_then_per_fire_rate() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        session.select_blueprint(Some("archer")).unwrap();
        session.build_on(SiteId(0)).unwrap();

        fire_buildings(&mut session, 0.25);
        assert_eq!(session.stats().arrows_fired, 1);

        // Archers shoot once a second
        for _ in 0..3 {
            fire_buildings(&mut session, 0.25);
        }
        assert_eq!(session.stats().arrows_fired, 1);
        fire_buildings(&mut session, 0.25);
        assert_eq!(session.stats().arrows_fired, 2);
        assert_eq!(session.world().arrows.len(), 2);
    }

    #[test]
    fn arrows_fly_along_the_site_facing() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        session.select_blueprint(Some("archer")).unwrap();
        session.build_on(SiteId(0)).unwrap();
        let facing = session.site(SiteId(0)).unwrap().facing;

        fire_buildings(&mut session, 0.1);
        let arrow = session.world().arrows.values().next().unwrap();
        assert_eq!(arrow.velocity, facing.direction() * 20.0);
    }

    #[test]
    fn buildings_hold_fire_while_buying() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        session.select_blueprint(Some("archer")).unwrap();
        session.build_on(SiteId(0)).unwrap();

        session.tick(1.0);
        assert_eq!(session.stats().arrows_fired, 0);
    }
}
