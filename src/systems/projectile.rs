use crate::session::GameSession;

/// Move arrows in a straight line and drop the ones that outlived their range.
pub fn move_arrows(session: &mut GameSession, dt: f32) {
    session.world.arrows.retain(|_, arrow| {
        arrow.position += arrow.velocity * dt;
        arrow.lifetime -= dt;
        arrow.lifetime > 0.0
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Arrow;
    use crate::config::GameConfig;
    use glam::Vec3;

    #[test]
    fn arrows_travel_then_expire() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        let id = session.allocate_id();
        session.world.arrows.insert(
            id,
            Arrow {
                position: Vec3::ZERO,
                velocity: Vec3::new(4.0, 0.0, 0.0),
                damage: 100,
                lifetime: 1.0,
            },
        );

        move_arrows(&mut session, 0.5);
        assert_eq!(session.world().arrows[&id].position, Vec3::new(2.0, 0.0, 0.0));

        move_arrows(&mut session, 0.5);
        assert!(session.world().arrows.is_empty());
    }
}
