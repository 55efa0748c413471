use glam::Vec3;

use crate::components::Facing;
use crate::constants::TILE_SIZE;

pub fn tile_to_world(tile_x: i32, tile_y: i32) -> Vec3 {
    // Tiles lie on the XZ plane, tile (0, 0) is centered at (TILE_SIZE / 2, 0, TILE_SIZE / 2)
    Vec3::new(
        tile_x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        0.0,
        tile_y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

pub fn world_to_tile(world_pos: Vec3) -> (i32, i32) {
    let tile_x = (world_pos.x / TILE_SIZE).floor() as i32;
    let tile_y = (world_pos.z / TILE_SIZE).floor() as i32;
    (tile_x, tile_y)
}

pub fn create_path_waypoints() -> Vec<Vec3> {
    // Road tiles from the village gate on the left to the village on the right
    let waypoints = [
        (0, 10),  // Start left side, row 10
        (5, 10),  // Move right
        (5, 4),   // Turn up
        (11, 4),  // Move right
        (11, 16), // Move down
        (17, 16), // Move right
        (17, 4),  // Move up
        (23, 4),  // Move right
        (23, 11), // Move down
        (26, 11), // End at the village
    ];

    waypoints
        .iter()
        .map(|(x, y)| tile_to_world(*x, *y))
        .collect()
}

/// Build sites placed beside the road, each facing the stretch it covers.
pub fn create_build_sites() -> Vec<(Vec3, Facing)> {
    let sites = [
        ((2, 8), Facing::South),
        ((7, 7), Facing::West),
        ((8, 2), Facing::South),
        ((9, 12), Facing::East),
        ((14, 14), Facing::South),
        ((15, 8), Facing::East),
        ((20, 2), Facing::South),
        ((25, 8), Facing::West),
    ];

    sites
        .iter()
        .map(|((x, y), facing)| (tile_to_world(*x, *y), *facing))
        .collect()
}

/// Ordered path the enemies walk. Built once per session and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoints {
    points: Vec<Vec3>,
}

impl Waypoints {
    pub fn new(points: Vec<Vec3>) -> Result<Self, String> {
        if points.is_empty() {
            return Err("Path must contain at least one waypoint".to_string());
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    // Always false once constructed
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index.min(self.points.len() - 1)]
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.points.len()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Tiles covered by the road between consecutive waypoints.
    pub fn road_tiles(&self) -> Vec<(i32, i32)> {
        let mut tiles = Vec::new();
        for pair in self.points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let steps = ((to - from).length() / (TILE_SIZE / 4.0)).ceil().max(1.0) as usize;
            for step in 0..=steps {
                let tile = world_to_tile(from.lerp(to, step as f32 / steps as f32));
                if !tiles.contains(&tile) {
                    tiles.push(tile);
                }
            }
        }
        if self.points.len() == 1 {
            tiles.push(world_to_tile(self.points[0]));
        }
        tiles
    }
}
