use glam::Vec3;
use rand::Rng;

use crate::components::{EntityId, MoneyBag};
use crate::events::GameEvent;
use crate::session::GameSession;

pub fn place_money_bag(session: &mut GameSession) -> EntityId {
    let volume = &session.config.powerup;
    let half = volume.size / 2.0;
    let (center, value, lifespan) = (volume.center, volume.value, volume.lifespan);

    let offset = Vec3::new(
        random_in(&mut session.rng, half.x),
        random_in(&mut session.rng, half.y),
        random_in(&mut session.rng, half.z),
    );
    let position = center + offset;

    let id = session.allocate_id();
    session.world.pickups.insert(
        id,
        MoneyBag {
            position,
            value,
            lifespan,
        },
    );
    session.emit(GameEvent::PickupSpawned {
        pickup: id,
        position,
    });
    log::debug!("Spawning money bag {:?} at {}", id, position);
    id
}

// Uniform in [-half, half); a flat axis stays at zero
fn random_in(rng: &mut impl Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

pub fn age_pickups(session: &mut GameSession, dt: f32) {
    let mut expired = Vec::new();
    for (id, bag) in session.world.pickups.iter_mut() {
        bag.lifespan -= dt;
        if bag.lifespan <= 0.0 {
            expired.push(*id);
        }
    }
    for id in expired {
        session.world.pickups.remove(&id);
        session.emit(GameEvent::PickupExpired { pickup: id });
    }
}

impl GameSession {
    pub fn collect_pickup(&mut self, id: EntityId) -> Result<i32, String> {
        if self.controller.is_ended() {
            return Err("The round is over".to_string());
        }
        let bag = self
            .world
            .pickups
            .remove(&id)
            .ok_or_else(|| format!("No money bag {:?}", id))?;

        self.stats.earn(bag.value);
        self.stats.powerups_gained += 1;
        self.emit(GameEvent::PickupCollected {
            pickup: id,
            value: bag.value,
        });
        log::info!("Collected money bag worth {}, {} cash", bag.value, self.stats.cash);
        Ok(bag.value)
    }
}
