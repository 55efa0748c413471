// Tile and map scaling
pub const TILE_SIZE: f32 = 2.0;
pub const MAP_WIDTH: i32 = 30;
pub const MAP_HEIGHT: i32 = 20;

// Path following
pub const WAYPOINT_TOLERANCE: f32 = 0.5;

// Player economy
pub const START_CASH: i32 = 500;
pub const START_LIVES: i32 = 5;
pub const SELL_REFUND_PERCENT: f32 = 0.5;

// Enemies
pub const ENEMY_SPEED: f32 = 10.0;
pub const ENEMY_HEALTH: i32 = 100;
pub const ENEMY_BOUNTY: i32 = 10;
pub const ENEMY_RADIUS: f32 = 0.5;

// Waves
pub const FIRST_WAVE_DELAY: f32 = 2.0;
pub const WAVE_COOLDOWN: f32 = 5.0;
pub const SPAWN_UNIT_DELAY: f32 = 0.5;
pub const WAVE_TIME: f32 = 100.0;

// Money bags
pub const POWERUP_VALUE: i32 = 50;
pub const POWERUP_LIFESPAN: f32 = 5.0;
pub const POWERUP_FIRST_DELAY_MIN: f32 = 20.0;
pub const POWERUP_FIRST_DELAY_MAX: f32 = 40.0;
pub const POWERUP_COOLDOWN: f32 = 10.0;

// Buildings and arrows
pub const FIRE_RATE: f32 = 1.0;
pub const ARROW_SPEED: f32 = 20.0;
pub const ARROW_DAMAGE: i32 = 100;
pub const ARROW_LIFETIME: f32 = 4.0;
pub const ARROW_RADIUS: f32 = 0.25;
pub const BUILD_EFFECT_LIFETIME: f32 = 4.0;

// Obstacles
pub const OBSTACLE_RADIUS: f32 = 1.0;
