// =============================================================================
// Wave Spawner
// =============================================================================
//
// Three countdowns driven by the session tick while defending:
// - round timer  : surviving it wins the round
// - wave timer   : starts wave N, which spawns N enemies one per unit delay
// - pickup timer : drops a money bag somewhere inside the spawn volume
//
// A wave's spawn sequence is scheduled against the session clock. Spawns
// that fall due inside a long tick keep their scheduled time and are walked
// forward by their lag. The wave timer is frozen while a sequence is running
// and restarts once the last enemy of the wave is out, so two sequences
// never overlap.
//
// =============================================================================

use crate::events::GameEvent;
use crate::resources::Outcome;
use crate::session::GameSession;
use crate::systems::{enemy, game_state, powerup};

pub fn tick_round_timer(session: &mut GameSession, dt: f32) {
    session.spawner.round_time_left -= dt;
    if session.spawner.round_time_left <= 0.0 {
        session.spawner.round_time_left = 0.0;
        game_state::end_game(session, Outcome::Won);
    }
}

pub fn tick_wave_spawner(session: &mut GameSession, dt: f32) {
    if session.spawner.is_spawning() {
        spawn_due_enemies(session);
        return;
    }

    session.spawner.countdown -= dt;
    if session.spawner.countdown <= 0.0 {
        start_next_wave(session);
    }
}

fn start_next_wave(session: &mut GameSession) {
    let spawner = &mut session.spawner;
    spawner.wave_index += 1;
    spawner.remaining_in_wave = spawner.wave_index;
    spawner.next_spawn_at = session.clock;

    let wave = spawner.wave_index;
    session.emit(GameEvent::WaveStarted {
        wave,
        enemies: wave,
    });
    log::info!("Spawning wave: {}", wave);

    spawn_due_enemies(session);
}

fn spawn_due_enemies(session: &mut GameSession) {
    let unit_delay = f64::from(session.config.spawner.unit_delay);

    while session.spawner.remaining_in_wave > 0 && session.clock >= session.spawner.next_spawn_at {
        let due = session.spawner.next_spawn_at;
        enemy::spawn_enemy_at(session, due);
        session.spawner.remaining_in_wave -= 1;
        session.spawner.next_spawn_at += unit_delay;
    }

    if session.spawner.remaining_in_wave == 0 {
        finish_wave(session);
    }
}

fn finish_wave(session: &mut GameSession) {
    session.spawner.countdown = session.config.spawner.wave_cooldown;
    let wave = session.spawner.wave_index;
    session.emit(GameEvent::WaveSpawned { wave });
    log::debug!("Wave {} fully spawned", wave);
}

pub fn tick_powerup_timer(session: &mut GameSession, dt: f32) {
    session.spawner.powerup_countdown -= dt;
    if session.spawner.powerup_countdown <= 0.0 {
        powerup::place_money_bag(session);
        session.spawner.powerup_countdown = session.config.powerup.cooldown;
    }
}

impl GameSession {
    /// Stop the running spawn sequence. Returns how many enemies were skipped.
    pub fn cancel_wave(&mut self) -> u32 {
        let skipped = self.spawner.remaining_in_wave;
        if skipped == 0 {
            return 0;
        }
        self.spawner.remaining_in_wave = 0;
        let wave = self.spawner.wave_index;
        self.emit(GameEvent::WaveCancelled { wave, skipped });
        log::info!("Wave {} cancelled, {} enemies not spawned", wave, skipped);
        finish_wave(self);
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn defending_session() -> GameSession {
        let mut config = GameConfig::default();
        config.spawner.wave_time = 1_000.0;
        // Keep money bags out of the way
        config.powerup.first_delay_min = 900.0;
        config.powerup.first_delay_max = 950.0;
        let mut session = GameSession::new(config).unwrap();
        session.start_wave();
        session
    }

    fn spawn_times(events: &[GameEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::EnemySpawned { at, .. } => Some(*at),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_wave_starts_after_the_initial_delay() {
        let mut session = defending_session();
        for _ in 0..7 {
            session.tick(0.25);
        }
        assert_eq!(session.spawner().wave_index, 0);
        session.tick(0.25);
        assert_eq!(session.spawner().wave_index, 1);
        assert_eq!(session.spawner().enemies_alive, 1);
    }

    #[test]
    fn wave_n_spawns_n_enemies_one_delay_apart() {
        let mut session = defending_session();
        let mut events = Vec::new();
        let mut wave_starts = Vec::new();

        // Three waves: 2s delay, 1 enemy, 5s cooldown, 2 enemies, 5s cooldown, 3 enemies
        while session.spawner().wave_index < 3 || session.spawner().is_spawning() {
            session.tick(0.25);
            for event in session.drain_events() {
                if let GameEvent::WaveStarted { wave, enemies } = event {
                    assert_eq!(wave, enemies);
                    wave_starts.push(session.clock());
                }
                events.push(event);
            }
        }

        let times = spawn_times(&events);
        assert_eq!(times.len(), 1 + 2 + 3);

        // Within a wave every enemy is exactly one unit delay after the previous one
        assert_eq!(times[2] - times[1], 0.5);
        assert_eq!(times[4] - times[3], 0.5);
        assert_eq!(times[5] - times[4], 0.5);

        // The next wave only begins a full cooldown after the previous one finished
        assert!(wave_starts[1] >= times[0] + 5.0);
        assert!(wave_starts[2] >= times[2] + 5.0);
    }

    #[test]
    fn long_ticks_keep_the_spawn_spacing() {
        let mut session = defending_session();
        let mut spawned = Vec::new();

        // 1.5 s frames: the last two enemies of wave 3 fall due inside one tick
        while session.spawner().wave_index < 3 || session.spawner().is_spawning() {
            session.tick(1.5);
            for event in session.drain_events() {
                if let GameEvent::EnemySpawned { enemy, at } = event {
                    spawned.push((enemy, at));
                }
            }
        }

        let wave_three = &spawned[spawned.len() - 3..];
        assert!((wave_three[1].1 - wave_three[0].1 - 0.5).abs() < 1e-9);
        assert!((wave_three[2].1 - wave_three[1].1 - 0.5).abs() < 1e-9);

        let enemies = &session.world().enemies;
        let second = enemies[&wave_three[1].0].position;
        let third = enemies[&wave_three[2].0].position;
        assert!(second.distance(third) > 2.0 * crate::constants::ENEMY_RADIUS);
    }

    #[test]
    fn countdown_is_frozen_while_spawning() {
        let mut session = defending_session();
        while session.spawner().wave_index < 2 {
            session.tick(0.25);
        }
        assert!(session.spawner().is_spawning());
        let countdown = session.spawner().countdown;
        session.tick(0.25);
        assert_eq!(session.spawner().countdown, countdown);
    }

    #[test]
    fn cancelling_clears_the_remaining_spawns() {
        let mut session = defending_session();
        while session.spawner().wave_index < 2 {
            session.tick(0.25);
        }
        let alive = session.spawner().enemies_alive;

        assert_eq!(session.cancel_wave(), 1);
        assert!(!session.spawner().is_spawning());
        assert_eq!(session.spawner().countdown, session.config().spawner.wave_cooldown);

        session.tick(0.25);
        assert_eq!(session.spawner().enemies_alive, alive);
        assert_eq!(session.cancel_wave(), 0);
    }

    #[test]
    fn surviving_the_round_timer_wins() {
        let mut config = GameConfig::default();
        config.spawner.wave_time = 1.0;
        let mut session = GameSession::new(config).unwrap();
        session.start_wave();

        for _ in 0..4 {
            session.tick(0.25);
        }
        assert_eq!(session.controller().outcome, Some(Outcome::Won));
        assert_eq!(session.spawner().round_time_left, 0.0);
    }

    #[test]
    fn pickup_timer_drops_a_money_bag_and_resets() {
        let mut config = GameConfig::default();
        config.powerup.first_delay_min = 1.0;
        config.powerup.first_delay_max = 1.1;
        config.powerup.lifespan = 100.0;
        let mut session = GameSession::new(config).unwrap();
        session.start_wave();

        for _ in 0..5 {
            session.tick(0.25);
        }
        assert_eq!(session.world().pickups.len(), 1);
        assert!(session.spawner().powerup_countdown > 9.0);
    }
}
