use crate::components::SiteId;
use crate::map::world_to_tile;
use crate::resources::{GameMode, Outcome};
use crate::session::GameSession;

/// Snapshot of what the HUD shows: top bar texts, active panels and the
/// site action panel.
#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub cash_text: String,
    pub lives_text: String,
    pub timer_text: String,
    pub wave: u32,
    pub enemies_alive: u32,
    pub mode: GameMode,
    pub buying_panel: bool,
    pub defense_panel: bool,
    pub game_over: bool,
    pub outcome: Option<Outcome>,
    pub paused: bool,
    pub site_ui_target: Option<SiteId>,
    pub site_ui_visible: bool,
    /// Map tile the site action panel is anchored to
    pub site_ui_tile: Option<(i32, i32)>,
    pub pending_blueprint: Option<String>,
}

impl GameSession {
    pub fn hud(&self) -> HudView {
        let panels = self.controller.panels;
        let pending_blueprint = self
            .build
            .pending_blueprint()
            .and_then(|id| self.config.blueprint(id))
            .map(|blueprint| blueprint.name.clone());

        HudView {
            cash_text: self.stats.cash.to_string(),
            lives_text: self.stats.lives.to_string(),
            timer_text: format!("{:.0}", self.spawner.round_time_left.max(0.0)),
            wave: self.spawner.wave_index,
            enemies_alive: self.spawner.enemies_alive,
            mode: self.controller.mode,
            buying_panel: panels.buying,
            defense_panel: panels.defense,
            game_over: panels.game_over,
            outcome: self.controller.outcome,
            paused: self.controller.is_paused(),
            site_ui_target: self.build.site_ui.target,
            site_ui_visible: self.build.site_ui.visible,
            site_ui_tile: self
                .build
                .site_ui
                .visible
                .then(|| world_to_tile(self.build.site_ui.position)),
            pending_blueprint,
        }
    }
}
