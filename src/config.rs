use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::{Facing, ObstacleKind};
use crate::constants::*;
use crate::map::{create_build_sites, create_path_waypoints, tile_to_world};

pub type ConfigResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_cash: i32,
    pub start_lives: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_cash: START_CASH,
            start_lives: START_LIVES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyType {
    pub name: String,
    pub speed: f32,
    pub health: i32,
    pub bounty: i32,
}

impl Default for EnemyType {
    fn default() -> Self {
        Self {
            name: "Raider".to_string(),
            speed: ENEMY_SPEED,
            health: ENEMY_HEALTH,
            bounty: ENEMY_BOUNTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub spawn_point: Vec3,
    /// Delay before the first wave once defending starts
    pub first_wave_delay: f32,
    /// Delay between the end of one spawn sequence and the next wave
    pub wave_cooldown: f32,
    /// Delay between two enemies of the same wave
    pub unit_delay: f32,
    /// Length of the round; surviving it wins the game
    pub wave_time: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_point: tile_to_world(0, 10),
            first_wave_delay: FIRST_WAVE_DELAY,
            wave_cooldown: WAVE_COOLDOWN,
            unit_delay: SPAWN_UNIT_DELAY,
            wave_time: WAVE_TIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    /// Center of the box money bags are dropped into
    pub center: Vec3,
    pub size: Vec3,
    pub value: i32,
    pub lifespan: f32,
    pub first_delay_min: f32,
    pub first_delay_max: f32,
    pub cooldown: f32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        let extent = Vec3::new(MAP_WIDTH as f32 * TILE_SIZE, 0.0, MAP_HEIGHT as f32 * TILE_SIZE);
        Self {
            center: extent / 2.0,
            size: extent * 0.8,
            value: POWERUP_VALUE,
            lifespan: POWERUP_LIFESPAN,
            first_delay_min: POWERUP_FIRST_DELAY_MIN,
            first_delay_max: POWERUP_FIRST_DELAY_MAX,
            cooldown: POWERUP_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingStats {
    /// Shots per second
    pub fire_rate: f32,
    pub arrow_speed: f32,
    pub arrow_damage: i32,
}

impl Default for BuildingStats {
    fn default() -> Self {
        Self {
            fire_rate: FIRE_RATE,
            arrow_speed: ARROW_SPEED,
            arrow_damage: ARROW_DAMAGE,
        }
    }
}

/// A buildable defense the shop offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: String,
    pub name: String,
    pub cost: i32,
    pub upgrade_cost: i32,
    #[serde(default)]
    pub base: BuildingStats,
    #[serde(default)]
    pub upgraded: BuildingStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub position: Vec3,
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default)]
    pub facing: Facing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub kind: ObstacleKind,
    pub position: Vec3,
    #[serde(default = "default_obstacle_radius")]
    pub radius: f32,
}

fn default_obstacle_radius() -> f32 {
    OBSTACLE_RADIUS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub waypoints: Vec<Vec3>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            waypoints: create_path_waypoints(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub player: PlayerConfig,
    pub enemy: EnemyType,
    pub spawner: SpawnerConfig,
    pub powerup: PowerupConfig,
    pub blueprints: Vec<Blueprint>,
    pub sites: Vec<SiteConfig>,
    pub obstacles: Vec<ObstacleConfig>,
    pub path: PathConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x7e57_0a1c,
            player: PlayerConfig::default(),
            enemy: EnemyType::default(),
            spawner: SpawnerConfig::default(),
            powerup: PowerupConfig::default(),
            blueprints: default_blueprints(),
            sites: create_build_sites()
                .into_iter()
                .map(|(position, facing)| SiteConfig {
                    position,
                    offset: Vec3::ZERO,
                    facing,
                })
                .collect(),
            obstacles: vec![
                ObstacleConfig {
                    kind: ObstacleKind::Moat,
                    position: tile_to_world(11, 10),
                    radius: OBSTACLE_RADIUS,
                },
                ObstacleConfig {
                    kind: ObstacleKind::Barricade,
                    position: tile_to_world(17, 10),
                    radius: OBSTACLE_RADIUS,
                },
            ],
            path: PathConfig::default(),
        }
    }
}

fn default_blueprints() -> Vec<Blueprint> {
    vec![
        Blueprint {
            id: "archer".to_string(),
            name: "Archer".to_string(),
            cost: 100,
            upgrade_cost: 60,
            base: BuildingStats::default(),
            upgraded: BuildingStats {
                fire_rate: 1.5,
                ..BuildingStats::default()
            },
        },
        Blueprint {
            id: "crossbow".to_string(),
            name: "Crossbowman".to_string(),
            cost: 150,
            upgrade_cost: 90,
            base: BuildingStats {
                fire_rate: 0.5,
                arrow_speed: 30.0,
                arrow_damage: 200,
            },
            upgraded: BuildingStats {
                fire_rate: 0.75,
                arrow_speed: 30.0,
                arrow_damage: 300,
            },
        },
    ]
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn blueprint(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|b| b.id == id)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.path.waypoints.is_empty() {
            return Err("Path must contain at least one waypoint".into());
        }
        if !self.path.waypoints.iter().all(|p| p.is_finite()) {
            return Err("Path waypoints must be finite".into());
        }
        if self.player.start_lives <= 0 {
            return Err("start_lives must be positive".into());
        }
        if self.enemy.health <= 0 || !positive(self.enemy.speed) {
            return Err("Enemy health and speed must be positive".into());
        }

        let spawner = &self.spawner;
        finite_vec("spawner.spawn_point", spawner.spawn_point)?;
        for (name, value) in [
            ("spawner.first_wave_delay", spawner.first_wave_delay),
            ("spawner.wave_cooldown", spawner.wave_cooldown),
            ("spawner.unit_delay", spawner.unit_delay),
            ("spawner.wave_time", spawner.wave_time),
        ] {
            finite(name, value)?;
        }
        if spawner.unit_delay < 0.0 || spawner.wave_cooldown < 0.0 {
            return Err("Spawner delays cannot be negative".into());
        }

        let powerup = &self.powerup;
        finite_vec("powerup.center", powerup.center)?;
        finite_vec("powerup.size", powerup.size)?;
        for (name, value) in [
            ("powerup.lifespan", powerup.lifespan),
            ("powerup.first_delay_min", powerup.first_delay_min),
            ("powerup.first_delay_max", powerup.first_delay_max),
        ] {
            finite(name, value)?;
        }
        if powerup.first_delay_min >= powerup.first_delay_max {
            return Err("powerup first_delay_min must be below first_delay_max".into());
        }
        if !positive(powerup.cooldown) {
            return Err("powerup cooldown must be positive".into());
        }

        for (index, blueprint) in self.blueprints.iter().enumerate() {
            if blueprint.cost <= 0 || blueprint.upgrade_cost <= 0 {
                return Err(format!("Blueprint {} must have positive costs", blueprint.id).into());
            }
            for stats in [&blueprint.base, &blueprint.upgraded] {
                if !positive(stats.fire_rate) {
                    return Err(format!("Blueprint {} must have a positive fire rate", blueprint.id).into());
                }
                finite("arrow_speed", stats.arrow_speed)?;
            }
            if self.blueprints[..index].iter().any(|b| b.id == blueprint.id) {
                return Err(format!("Duplicate blueprint id: {}", blueprint.id).into());
            }
        }
        for site in &self.sites {
            finite_vec("sites.position", site.position)?;
            finite_vec("sites.offset", site.offset)?;
        }
        for obstacle in &self.obstacles {
            finite_vec("obstacles.position", obstacle.position)?;
            if !(obstacle.radius.is_finite() && obstacle.radius >= 0.0) {
                return Err("Obstacle radius must be finite and not negative".into());
            }
        }
        Ok(())
    }
}

/// Finite and above zero; NaN fails.
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn finite(name: &str, value: f32) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{name} must be a finite number, got {value}").into())
    }
}

fn finite_vec(name: &str, value: Vec3) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{name} must be finite, got {value}").into())
    }
}
