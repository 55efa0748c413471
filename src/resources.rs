use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::SiteId;
use crate::config::{GameConfig, PlayerConfig};

/// Cash, lives and the running counters of one round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub cash: i32,
    pub lives: i32,
    pub enemies_killed: u32,
    pub buildings_purchased: u32,
    pub arrows_fired: u32,
    pub cash_earned: i32,
    pub powerups_gained: u32,
}

impl PlayerStats {
    pub fn new(player: &PlayerConfig) -> Self {
        Self {
            cash: player.start_cash,
            lives: player.start_lives,
            ..Self::default()
        }
    }

    pub fn earn(&mut self, amount: i32) {
        self.cash += amount;
        self.cash_earned += amount;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Building allowed, spawning paused
    #[default]
    Buying,
    Defending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

/// Which on-screen panels are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub buying: bool,
    pub defense: bool,
    pub game_over: bool,
}

impl Panels {
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            buying: mode == GameMode::Buying,
            defense: mode == GameMode::Defending,
            game_over: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameController {
    pub mode: GameMode,
    /// Latched once the round is over
    pub outcome: Option<Outcome>,
    /// 1.0 while running, 0.0 while paused or after the round ended
    pub time_scale: f32,
    pub panels: Panels,
}

impl GameController {
    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0 && !self.is_ended()
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self {
            mode: GameMode::Buying,
            outcome: None,
            time_scale: 1.0,
            panels: Panels::for_mode(GameMode::Buying),
        }
    }
}

/// Countdowns and the spawn schedule of the current wave.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSpawner {
    pub wave_index: u32,
    /// Seconds until the next wave begins; frozen while a spawn sequence runs
    pub countdown: f32,
    /// Enemies of the current wave still to be spawned
    pub remaining_in_wave: u32,
    /// Session clock time of the next spawn
    pub next_spawn_at: f64,
    pub round_time_left: f32,
    pub powerup_countdown: f32,
    pub enemies_alive: u32,
}

impl WaveSpawner {
    pub fn new(config: &GameConfig, powerup_countdown: f32) -> Self {
        Self {
            wave_index: 0,
            countdown: config.spawner.first_wave_delay,
            remaining_in_wave: 0,
            next_spawn_at: 0.0,
            round_time_left: config.spawner.wave_time,
            powerup_countdown,
            enemies_alive: 0,
        }
    }

    pub fn is_spawning(&self) -> bool {
        self.remaining_in_wave > 0
    }
}

/// The single pending choice of the build manager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Blueprint(String),
    Site(SiteId),
}

/// Action panel shown over a selected site (upgrade, sell, rotate).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteUi {
    pub target: Option<SiteId>,
    pub position: Vec3,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildManager {
    pub selection: Selection,
    pub site_ui: SiteUi,
}

impl BuildManager {
    pub fn pending_blueprint(&self) -> Option<&str> {
        match &self.selection {
            Selection::Blueprint(id) => Some(id),
            _ => None,
        }
    }

    pub fn selected_site(&self) -> Option<SiteId> {
        match self.selection {
            Selection::Site(site) => Some(site),
            _ => None,
        }
    }

    pub fn can_build(&self) -> bool {
        self.pending_blueprint().is_some()
    }
}

/// End-of-round report written by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub outcome: Option<Outcome>,
    pub waves_started: u32,
    pub elapsed_seconds: f64,
    pub stats: PlayerStats,
}
