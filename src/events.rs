use glam::Vec3;

use crate::components::{EntityId, ObstacleKind, SiteId};
use crate::resources::{GameMode, Outcome};

/// Everything observable that happened during a tick or a player action.
/// The session queues these until the front-end drains them.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Fired when a wave's spawn sequence begins
    WaveStarted { wave: u32, enemies: u32 },
    /// Fired when the last enemy of a wave has been spawned
    WaveSpawned { wave: u32 },
    /// Fired when a spawn sequence is cleared before it finished
    WaveCancelled { wave: u32, skipped: u32 },
    EnemySpawned { enemy: EntityId, at: f64 },
    EnemyKilled { enemy: EntityId, bounty: i32 },
    /// Fired when an enemy walks off the last waypoint
    EnemyReachedEnd { enemy: EntityId },
    EnemySlowed { enemy: EntityId, speed: f32 },
    ObstacleDestroyed { obstacle: EntityId, kind: ObstacleKind },
    ArrowFired { building: EntityId, arrow: EntityId },
    BuildingPlaced { site: SiteId, building: EntityId, blueprint: String },
    BuildingUpgraded { site: SiteId, building: EntityId },
    BuildingSold { site: SiteId, refund: i32 },
    SiteRotated { site: SiteId },
    PickupSpawned { pickup: EntityId, position: Vec3 },
    PickupCollected { pickup: EntityId, value: i32 },
    PickupExpired { pickup: EntityId },
    ModeChanged { mode: GameMode },
    Paused { paused: bool },
    GameEnded { outcome: Outcome },
}
