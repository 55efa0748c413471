// =============================================================================
// Game Session
// =============================================================================
//
// Owns every piece of state of one round: the path, player stats, the game
// controller, the wave spawner, the build manager, build sites and all live
// entities. Systems receive `&mut GameSession` and nothing is global, so any
// number of sessions can run side by side.
//
// =============================================================================

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{
    Arrow, BuildEffect, BuildSite, Building, Enemy, EntityId, MoneyBag, Obstacle, SiteId,
};
use crate::config::{ConfigResult, GameConfig};
use crate::events::GameEvent;
use crate::map::Waypoints;
use crate::resources::{
    BuildManager, GameController, GameMode, PlayerStats, RoundSummary, WaveSpawner,
};
use crate::systems::{build, collision, enemy, game_state, powerup, projectile, tower, wave};

/// Live entities, keyed by id so iteration order is stable.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub enemies: BTreeMap<EntityId, Enemy>,
    pub buildings: BTreeMap<EntityId, Building>,
    pub arrows: BTreeMap<EntityId, Arrow>,
    pub pickups: BTreeMap<EntityId, MoneyBag>,
    pub obstacles: BTreeMap<EntityId, Obstacle>,
    pub effects: BTreeMap<EntityId, BuildEffect>,
}

pub struct GameSession {
    pub(crate) config: GameConfig,
    /// Monotonic simulated time in seconds
    pub(crate) clock: f64,
    pub(crate) rng: StdRng,
    next_entity_id: u64,
    pub(crate) waypoints: Waypoints,
    pub(crate) stats: PlayerStats,
    pub(crate) controller: GameController,
    pub(crate) spawner: WaveSpawner,
    pub(crate) build: BuildManager,
    pub(crate) sites: Vec<BuildSite>,
    pub(crate) world: World,
    /// Collider pairs that overlapped at the end of the previous tick
    pub(crate) overlaps: HashSet<(EntityId, EntityId)>,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> ConfigResult<Self> {
        config.validate()?;
        let waypoints = Waypoints::new(config.path.waypoints.clone())?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let powerup_countdown =
            rng.gen_range(config.powerup.first_delay_min..config.powerup.first_delay_max);

        let sites = config
            .sites
            .iter()
            .map(|site| BuildSite::new(site.position, site.offset, site.facing))
            .collect();

        let mut session = Self {
            stats: PlayerStats::new(&config.player),
            spawner: WaveSpawner::new(&config, powerup_countdown),
            clock: 0.0,
            rng,
            next_entity_id: 1,
            waypoints,
            controller: GameController::default(),
            build: BuildManager::default(),
            sites,
            world: World::default(),
            overlaps: HashSet::new(),
            events: Vec::new(),
            config,
        };

        let obstacles: Vec<Obstacle> = session
            .config
            .obstacles
            .iter()
            .map(|o| Obstacle {
                kind: o.kind,
                position: o.position,
                radius: o.radius,
            })
            .collect();
        for obstacle in obstacles {
            session.add_obstacle(obstacle);
        }

        log::info!(
            "Round started: {} cash, {} lives, {} sites, {} waypoints",
            session.stats.cash,
            session.stats.lives,
            session.sites.len(),
            session.waypoints.len()
        );
        Ok(session)
    }

    /// Advance the simulation by `dt` seconds of real time.
    pub fn tick(&mut self, dt: f32) {
        if self.controller.is_ended() {
            return;
        }

        let dt = dt.max(0.0) * self.controller.time_scale;
        if dt > 0.0 {
            self.clock += f64::from(dt);

            if self.controller.mode == GameMode::Defending {
                wave::tick_round_timer(self, dt);
                if self.controller.is_ended() {
                    return;
                }
                wave::tick_wave_spawner(self, dt);
                wave::tick_powerup_timer(self, dt);
                enemy::move_enemies(self, dt);
                tower::fire_buildings(self, dt);
                projectile::move_arrows(self, dt);
                collision::resolve_triggers(self);
            }

            powerup::age_pickups(self, dt);
            build::age_effects(self, dt);
        }

        game_state::update_controller(self);
    }

    /// Start over with the same configuration and seed.
    pub fn retry(&mut self) -> ConfigResult<()> {
        log::info!("Retrying round");
        *self = Self::new(self.config.clone())?;
        Ok(())
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> EntityId {
        let id = self.allocate_id();
        self.world.obstacles.insert(id, obstacle);
        id
    }

    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    pub fn spawner(&self) -> &WaveSpawner {
        &self.spawner
    }

    pub fn build_manager(&self) -> &BuildManager {
        &self.build
    }

    pub fn waypoints(&self) -> &Waypoints {
        &self.waypoints
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn sites(&self) -> &[BuildSite] {
        &self.sites
    }

    pub fn site(&self, site: SiteId) -> Option<&BuildSite> {
        self.sites.get(site.0)
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            outcome: self.controller.outcome,
            waves_started: self.spawner.wave_index,
            elapsed_seconds: self.clock,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Outcome;

    #[test]
    fn sessions_do_not_share_state() {
        let mut first = GameSession::new(GameConfig::default()).unwrap();
        let second = GameSession::new(GameConfig::default()).unwrap();

        first.stats.cash = 1;
        first.start_wave();
        first.tick(3.0);

        assert_eq!(second.stats().cash, GameConfig::default().player.start_cash);
        assert_eq!(second.spawner().wave_index, 0);
        assert_eq!(first.spawner().wave_index, 1);
    }

    #[test]
    fn buying_mode_does_not_spawn() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        for _ in 0..40 {
            session.tick(0.25);
        }
        assert_eq!(session.spawner().wave_index, 0);
        assert!(session.world().enemies.is_empty());
        assert_eq!(session.spawner().round_time_left, session.config().spawner.wave_time);
    }

    #[test]
    fn retry_restores_the_starting_state() {
        let mut session = GameSession::new(GameConfig::default()).unwrap();
        session.start_wave();
        session.stats.lives = 0;
        session.tick(0.25);
        assert_eq!(session.controller().outcome, Some(Outcome::Lost));

        session.retry().unwrap();
        assert_eq!(session.controller().outcome, None);
        assert_eq!(session.stats().lives, GameConfig::default().player.start_lives);
        assert_eq!(session.clock(), 0.0);
    }

    #[test]
    fn configured_obstacles_are_spawned() {
        let session = GameSession::new(GameConfig::default()).unwrap();
        assert_eq!(
            session.world().obstacles.len(),
            GameConfig::default().obstacles.len()
        );
    }
}
