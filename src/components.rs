use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{ARROW_RADIUS, ENEMY_RADIUS};

/// Identifier shared by every spawned game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Index of a build site; sites are fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub usize);

/// Quarter-turn facing on the ground plane. South points along +Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    East,
    South,
    West,
    North,
}

impl Facing {
    pub fn direction(self) -> Vec3 {
        match self {
            Facing::East => Vec3::X,
            Facing::South => Vec3::Z,
            Facing::West => Vec3::NEG_X,
            Facing::North => Vec3::NEG_Z,
        }
    }

    /// Rotate 90 degrees clockwise when seen from above.
    pub fn rotated(self) -> Self {
        match self {
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
            Facing::North => Facing::East,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub position: Vec3,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    pub bounty: i32,
    pub current_waypoint: usize,
}

impl Enemy {
    pub fn is_wounded(&self) -> bool {
        self.health < self.max_health
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub site: SiteId,
    pub blueprint_id: String,
    pub position: Vec3,
    pub facing: Facing,
    pub fire_rate: f32,
    pub arrow_speed: f32,
    pub arrow_damage: i32,
    /// Seconds until the next shot, starts at zero so a new building fires at once
    pub fire_countdown: f32,
    pub upgraded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: i32,
    pub lifetime: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoneyBag {
    pub position: Vec3,
    pub value: i32,
    pub lifespan: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Destroyed by the first enemy that walks into it
    Barricade,
    /// Halves the speed of every enemy that enters it
    Moat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildEffect {
    pub position: Vec3,
    pub lifetime: f32,
}

/// Hover feedback while a blueprint is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteHighlight {
    #[default]
    None,
    Affordable,
    TooPoor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildSite {
    pub position: Vec3,
    pub offset: Vec3,
    pub facing: Facing,
    pub building: Option<EntityId>,
    pub blueprint_id: Option<String>,
    pub upgraded: bool,
    pub highlight: SiteHighlight,
}

impl BuildSite {
    pub fn new(position: Vec3, offset: Vec3, facing: Facing) -> Self {
        Self {
            position,
            offset,
            facing,
            building: None,
            blueprint_id: None,
            upgraded: false,
            highlight: SiteHighlight::None,
        }
    }

    pub fn build_position(&self) -> Vec3 {
        self.position + self.offset
    }

    pub fn is_occupied(&self) -> bool {
        self.building.is_some()
    }
}

/// What a trigger volume is, resolved when the object is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Enemy,
    Projectile,
    Obstacle,
    SlowZone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: EntityId,
    pub kind: ColliderKind,
    pub position: Vec3,
    pub radius: f32,
}

impl Collider {
    pub fn overlaps(&self, other: &Collider) -> bool {
        self.position.distance(other.position) <= self.radius + other.radius
    }
}

impl Enemy {
    pub fn collider(&self, id: EntityId) -> Collider {
        Collider {
            id,
            kind: ColliderKind::Enemy,
            position: self.position,
            radius: ENEMY_RADIUS,
        }
    }
}

impl Arrow {
    pub fn collider(&self, id: EntityId) -> Collider {
        Collider {
            id,
            kind: ColliderKind::Projectile,
            position: self.position,
            radius: ARROW_RADIUS,
        }
    }
}

impl Obstacle {
    pub fn collider(&self, id: EntityId) -> Collider {
        let kind = match self.kind {
            ObstacleKind::Barricade => ColliderKind::Obstacle,
            ObstacleKind::Moat => ColliderKind::SlowZone,
        };
        Collider {
            id,
            kind,
            position: self.position,
            radius: self.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_rotations_return_to_the_start() {
        let facing = Facing::North;
        assert_eq!(facing.rotated().rotated().rotated().rotated(), facing);
        assert_eq!(Facing::East.rotated(), Facing::South);
        assert_eq!(Facing::South.direction(), Vec3::Z);
    }

    #[test]
    fn obstacle_kind_maps_to_collider_kind() {
        let moat = Obstacle {
            kind: ObstacleKind::Moat,
            position: Vec3::ZERO,
            radius: 1.0,
        };
        assert_eq!(moat.collider(EntityId(3)).kind, ColliderKind::SlowZone);
    }
}
