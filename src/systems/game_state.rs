use crate::events::GameEvent;
use crate::resources::{GameMode, Outcome, Panels};
use crate::session::GameSession;

/// Runs at the end of every tick: loss check, then panels follow the mode.
pub fn update_controller(session: &mut GameSession) {
    if session.controller.is_ended() {
        return;
    }
    if session.stats.lives <= 0 {
        end_game(session, Outcome::Lost);
        return;
    }
    session.controller.panels = Panels::for_mode(session.controller.mode);
}

/// Latch the end of the round. Later calls are ignored.
pub fn end_game(session: &mut GameSession, outcome: Outcome) {
    if session.controller.is_ended() {
        return;
    }
    session.controller.outcome = Some(outcome);
    session.controller.time_scale = 0.0;
    session.controller.panels.game_over = true;
    session.build.site_ui.visible = false;

    session.emit(GameEvent::GameEnded { outcome });
    match outcome {
        Outcome::Won => log::info!("Level won"),
        Outcome::Lost => log::info!("Game over"),
    }
}

impl GameSession {
    fn set_mode(&mut self, mode: GameMode) {
        if self.controller.is_ended() || self.controller.mode == mode {
            return;
        }
        self.controller.mode = mode;
        self.emit(GameEvent::ModeChanged { mode });
        log::info!("Mode changed to {:?}", mode);
    }

    /// Shop's start button: leave buying mode and let the waves come.
    pub fn start_wave(&mut self) {
        self.set_mode(GameMode::Defending);
    }

    pub fn toggle_mode(&mut self) {
        let mode = match self.controller.mode {
            GameMode::Buying => GameMode::Defending,
            GameMode::Defending => GameMode::Buying,
        };
        self.set_mode(mode);
    }

    pub fn toggle_pause(&mut self) {
        if self.controller.is_ended() {
            return;
        }
        let paused = !self.controller.is_paused();
        self.controller.time_scale = if paused { 0.0 } else { 1.0 };
        self.emit(GameEvent::Paused { paused });
    }
}
