use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use teutonic_warfare::components::{BuildSite, ObstacleKind, SiteHighlight};
use teutonic_warfare::constants::{MAP_HEIGHT, MAP_WIDTH, SELL_REFUND_PERCENT};
use teutonic_warfare::map::world_to_tile;
use teutonic_warfare::{GameEvent, GameMode, GameSession, HudView, Outcome, SiteId};

const FRAME_TIME: Duration = Duration::from_millis(33);
/// Longest step fed to the simulation after a stall
const MAX_FRAME_DT: f32 = 0.25;
const EVENT_LOG_LEN: usize = 64;

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub struct App<'a> {
    pub session: &'a mut GameSession,
    /// Site under the keyboard cursor
    pub hover: usize,
    pub event_log: VecDeque<String>,
    pub status: String,
    pub quit: bool,
}

impl<'a> App<'a> {
    pub fn new(session: &'a mut GameSession) -> Self {
        let mut app = Self {
            session,
            hover: 0,
            event_log: VecDeque::new(),
            status: String::new(),
            quit: false,
        };
        app.session.pointer_enter(SiteId(0));
        app
    }

    fn report<T>(&mut self, result: Result<T, String>) {
        if let Err(err) = result {
            self.status = err;
        }
    }

    fn collect_events(&mut self) {
        for event in self.session.drain_events() {
            if matches!(event, GameEvent::ArrowFired { .. }) {
                continue;
            }
            log::debug!("{:?}", event);
            let line = describe(&event, &self.session.config().enemy.name);
            self.event_log.push_back(line);
            if self.event_log.len() > EVENT_LOG_LEN {
                self.event_log.pop_front();
            }
        }
    }

    fn move_hover(&mut self, step: isize) {
        let count = self.session.sites().len();
        if count == 0 {
            return;
        }
        self.session.pointer_exit(SiteId(self.hover));
        self.hover = (self.hover as isize + step).rem_euclid(count as isize) as usize;
        self.session.pointer_enter(SiteId(self.hover));
    }

    fn click(&mut self, site: usize) {
        self.status.clear();
        let result = self.session.pointer_down(SiteId(site));
        self.report(result);
        self.session.pointer_enter(SiteId(self.hover));
    }

    fn cycle_blueprint(&mut self) {
        let blueprints = &self.session.config().blueprints;
        let next = match self.session.build_manager().pending_blueprint() {
            None => blueprints.first(),
            Some(current) => blueprints
                .iter()
                .skip_while(|b| b.id != current)
                .nth(1),
        }
        .map(|b| b.id.clone());

        let result = self.session.select_blueprint(next.as_deref());
        self.report(result);
        self.session.pointer_enter(SiteId(self.hover));
    }

    fn collect_oldest_pickup(&mut self) {
        let oldest = self.session.world().pickups.keys().next().copied();
        match oldest {
            Some(id) => {
                let result = self.session.collect_pickup(id);
                self.report(result);
            }
            None => self.status = "No money bag to pick up".to_string(),
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char(c @ '1'..='9') => {
                let site = c as usize - '1' as usize;
                if site < self.session.sites().len() {
                    self.session.pointer_exit(SiteId(self.hover));
                    self.hover = site;
                    self.click(site);
                }
            }
            KeyCode::Left => self.move_hover(-1),
            KeyCode::Right => self.move_hover(1),
            KeyCode::Char(' ') => self.click(self.hover),
            KeyCode::Char('b') => self.cycle_blueprint(),
            KeyCode::Esc => {
                let result = self.session.select_blueprint(None);
                self.report(result);
                self.session.deselect_site();
            }
            KeyCode::Char('u') => {
                let result = self.session.upgrade_selected();
                self.report(result);
            }
            KeyCode::Char('s') => {
                let result = self.session.sell_selected();
                self.report(result);
            }
            KeyCode::Char('r') => {
                let result = self.session.rotate_selected();
                self.report(result);
            }
            KeyCode::Char('w') | KeyCode::Enter => self.session.start_wave(),
            KeyCode::Char('m') => self.session.toggle_mode(),
            KeyCode::Char('p') => self.session.toggle_pause(),
            KeyCode::Char('c') => self.collect_oldest_pickup(),
            KeyCode::Char('n') => match self.session.retry() {
                Ok(()) => {
                    self.event_log.clear();
                    self.status.clear();
                    self.session.pointer_enter(SiteId(self.hover));
                }
                Err(err) => self.status = err.to_string(),
            },
            _ => {}
        }
    }
}

pub fn run_tui(session: &mut GameSession) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Tui, app: &mut App) -> io::Result<()> {
    let mut last_frame = Instant::now();
    while !app.quit {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32().min(MAX_FRAME_DT);
        app.session.tick(dt);
        last_frame = now;
        app.collect_events();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(FRAME_TIME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }
    log::info!("Quit after {:.1}s", app.session.clock());
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let hud = app.session.hud();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(MAP_HEIGHT as u16 + 2),
            Constraint::Length(1),
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(MAP_WIDTH as u16 * 2 + 2),
            Constraint::Min(30),
        ])
        .split(chunks[1]);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(3)])
        .split(main_chunks[1]);

    render_top_bar(f, &hud, chunks[0]);
    render_board(f, app, main_chunks[0]);
    if hud.site_ui_visible {
        render_site_panel(f, app, &hud, side_chunks[0]);
    } else if hud.buying_panel {
        render_shop(f, app, &hud, side_chunks[0]);
    } else {
        render_defense(f, &hud, side_chunks[0]);
    }
    render_events(f, app, side_chunks[1]);
    render_help(f, app, chunks[2]);

    if hud.game_over {
        render_game_over(f, app, &hud, main_chunks[0]);
    }
}

fn render_top_bar(f: &mut Frame, hud: &HudView, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("Gold ", Style::default().fg(Color::Yellow)),
        Span::styled(hud.cash_text.clone(), bold),
        Span::raw("   "),
        Span::styled("Lives ", Style::default().fg(Color::Red)),
        Span::styled(hud.lives_text.clone(), bold),
        Span::raw("   "),
        Span::styled("Time ", Style::default().fg(Color::Cyan)),
        Span::styled(hud.timer_text.clone(), bold),
        Span::raw(format!("   Wave {}   Enemies {}", hud.wave, hud.enemies_alive)),
    ];
    if hud.paused {
        spans.push(Span::styled(
            "   PAUSED",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
    }

    let title = match hud.mode {
        GameMode::Buying => "Teutonic Warfare - buying",
        GameMode::Defending => "Teutonic Warfare - defending",
    };
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(bar, area);
}

/// One character cell per tile, drawn twice as wide so the map is not squashed.
fn render_board(f: &mut Frame, app: &App, area: Rect) {
    let width = MAP_WIDTH as usize;
    let height = MAP_HEIGHT as usize;
    let mut grid = vec![vec![('.', Style::default().fg(Color::DarkGray)); width]; height];

    let mut put = |pos: (i32, i32), glyph: char, style: Style| {
        if pos.0 >= 0 && pos.1 >= 0 && (pos.0 as usize) < width && (pos.1 as usize) < height {
            grid[pos.1 as usize][pos.0 as usize] = (glyph, style);
        }
    };

    let session = &app.session;
    for tile in session.waypoints().road_tiles() {
        put(tile, '#', Style::default().fg(Color::Rgb(150, 110, 60)));
    }
    for obstacle in session.world().obstacles.values() {
        let (glyph, color) = match obstacle.kind {
            ObstacleKind::Barricade => ('B', Color::Rgb(170, 120, 40)),
            ObstacleKind::Moat => ('~', Color::Blue),
        };
        put(world_to_tile(obstacle.position), glyph, Style::default().fg(color));
    }
    let selected = session.build_manager().selected_site();
    for (index, site) in session.sites().iter().enumerate() {
        let (glyph, style) = site_glyph(app, index, site, selected == Some(SiteId(index)));
        put(world_to_tile(site.position), glyph, style);
    }
    for pickup in session.world().pickups.values() {
        put(
            world_to_tile(pickup.position),
            '$',
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
    }
    for arrow in session.world().arrows.values() {
        put(world_to_tile(arrow.position), '*', Style::default().fg(Color::White));
    }
    for enemy in session.world().enemies.values() {
        let color = if enemy.is_wounded() { Color::LightRed } else { Color::Red };
        put(
            world_to_tile(enemy.position),
            'e',
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }

    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(glyph, style)| Span::styled(format!("{glyph} "), style))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let board = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Map"));
    f.render_widget(board, area);
}

fn site_glyph(app: &App, index: usize, site: &BuildSite, selected: bool) -> (char, Style) {
    let glyph = match &site.blueprint_id {
        Some(id) => {
            let letter = id.chars().next().unwrap_or('?');
            if site.upgraded {
                letter.to_ascii_uppercase()
            } else {
                letter
            }
        }
        None => char::from_digit(index as u32 + 1, 10).unwrap_or('o'),
    };

    let mut style = match site.highlight {
        SiteHighlight::Affordable => Style::default().fg(Color::Green),
        SiteHighlight::TooPoor => Style::default().fg(Color::Red),
        SiteHighlight::None if site.is_occupied() => Style::default().fg(Color::Cyan),
        SiteHighlight::None => Style::default().fg(Color::Gray),
    };
    if selected {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if index == app.hover {
        style = style.add_modifier(Modifier::REVERSED);
    }
    (glyph, style)
}

fn render_shop(f: &mut Frame, app: &App, hud: &HudView, area: Rect) {
    let cash = app.session.stats().cash;
    let pending = app.session.build_manager().pending_blueprint();

    let mut items: Vec<ListItem> = app
        .session
        .config()
        .blueprints
        .iter()
        .map(|blueprint| {
            let marker = if pending == Some(blueprint.id.as_str()) { "> " } else { "  " };
            let style = if blueprint.cost > cash {
                Style::default().fg(Color::DarkGray)
            } else if pending == Some(blueprint.id.as_str()) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(
                format!("{marker}{} ${}", blueprint.name, blueprint.cost),
                style,
            )))
        })
        .collect();

    items.push(ListItem::new(""));
    items.push(ListItem::new(match &hud.pending_blueprint {
        Some(name) => format!("Place {name}: pick a site"),
        None => "b: choose a building".to_string(),
    }));
    items.push(ListItem::new("w: start the waves"));

    let shop = List::new(items).block(Block::default().borders(Borders::ALL).title("Shop"));
    f.render_widget(shop, area);
}

fn render_defense(f: &mut Frame, hud: &HudView, area: Rect) {
    let lines = vec![
        Line::from(format!("Wave {}", hud.wave)),
        Line::from(format!("Enemies alive {}", hud.enemies_alive)),
        Line::from(format!("Time left {}", hud.timer_text)),
        Line::from(""),
        Line::from("c: pick up money   m: back to the shop"),
    ];
    let panel =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Defense"));
    f.render_widget(panel, area);
}

fn render_site_panel(f: &mut Frame, app: &App, hud: &HudView, area: Rect) {
    let Some(site_id) = hud.site_ui_target else {
        return;
    };
    let Some(site) = app.session.site(site_id) else {
        return;
    };
    let blueprint = site
        .blueprint_id
        .as_deref()
        .and_then(|id| app.session.config().blueprint(id));

    let title = match hud.site_ui_tile {
        Some((x, y)) => format!("Site {} at tile {x},{y}", site_id.0 + 1),
        None => format!("Site {}", site_id.0 + 1),
    };
    let mut lines = vec![Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(blueprint) = blueprint {
        let spent = blueprint.cost + if site.upgraded { blueprint.upgrade_cost } else { 0 };
        lines.push(Line::from(format!(
            "{}{}",
            blueprint.name,
            if site.upgraded { " (upgraded)" } else { "" }
        )));
        lines.push(Line::from(format!("Facing {:?}", site.facing)));
        lines.push(Line::from(""));
        if !site.upgraded {
            lines.push(Line::from(format!("u: upgrade ${}", blueprint.upgrade_cost)));
        }
        lines.push(Line::from(format!(
            "s: sell for ${}",
            (spent as f32 * SELL_REFUND_PERCENT) as i32
        )));
        lines.push(Line::from("r: rotate   Esc: close"));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Building")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(panel, area);
}

fn render_events(f: &mut Frame, app: &App, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let start_idx = app.event_log.len().saturating_sub(visible_height);

    let items: Vec<ListItem> = app
        .event_log
        .iter()
        .skip(start_idx)
        .map(|line| ListItem::new(line.as_str()))
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Events"));
    f.render_widget(list, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.status.is_empty() {
        Line::from(
            "1-9/Space: click site  \u{2190}\u{2192}: move  b: building  u/s/r: upgrade/sell/rotate  p: pause  n: retry  q: quit",
        )
    } else {
        Line::from(Span::styled(app.status.clone(), Style::default().fg(Color::Red)))
    };
    f.render_widget(Paragraph::new(text), area);
}

fn render_game_over(f: &mut Frame, app: &App, hud: &HudView, board: Rect) {
    let width = 34.min(board.width);
    let height = 7.min(board.height);
    let area = Rect {
        x: board.x + (board.width - width) / 2,
        y: board.y + (board.height - height) / 2,
        width,
        height,
    };

    let (title, color) = match hud.outcome {
        Some(Outcome::Won) => ("Victory", Color::Green),
        _ => ("Game Over", Color::Red),
    };
    let stats = app.session.stats();
    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Waves {}   Kills {}", hud.wave, stats.enemies_killed)),
        Line::from(format!("Gold earned {}", stats.cash_earned)),
        Line::from(""),
        Line::from("n: retry   q: quit"),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn describe(event: &GameEvent, enemy_name: &str) -> String {
    match event {
        GameEvent::WaveStarted { wave, enemies } => format!("Wave {wave}: {enemies} x {enemy_name}"),
        GameEvent::WaveSpawned { wave } => format!("Wave {wave} fully spawned"),
        GameEvent::WaveCancelled { wave, skipped } => {
            format!("Wave {wave} cancelled, {skipped} skipped")
        }
        GameEvent::EnemySpawned { enemy, .. } => format!("{enemy_name} {} appears", enemy.0),
        GameEvent::EnemyKilled { enemy, bounty } => format!("{enemy_name} {} slain (+{bounty})", enemy.0),
        GameEvent::EnemyReachedEnd { enemy } => format!("{enemy_name} {} broke through!", enemy.0),
        GameEvent::EnemySlowed { enemy, .. } => format!("{enemy_name} {} wades the moat", enemy.0),
        GameEvent::ObstacleDestroyed { .. } => "A barricade was smashed".to_string(),
        GameEvent::ArrowFired { .. } => "Arrow loosed".to_string(),
        GameEvent::BuildingPlaced { site, blueprint, .. } => {
            format!("{blueprint} built on site {}", site.0 + 1)
        }
        GameEvent::BuildingUpgraded { site, .. } => format!("Site {} upgraded", site.0 + 1),
        GameEvent::BuildingSold { site, refund } => {
            format!("Site {} sold for {refund}", site.0 + 1)
        }
        GameEvent::SiteRotated { site } => format!("Site {} rotated", site.0 + 1),
        GameEvent::PickupSpawned { .. } => "A money bag dropped".to_string(),
        GameEvent::PickupCollected { value, .. } => format!("Picked up {value} gold"),
        GameEvent::PickupExpired { .. } => "A money bag vanished".to_string(),
        GameEvent::ModeChanged { mode } => format!("Mode: {mode:?}"),
        GameEvent::Paused { paused: true } => "Paused".to_string(),
        GameEvent::Paused { paused: false } => "Resumed".to_string(),
        GameEvent::GameEnded { outcome } => format!("Round over: {outcome:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teutonic_warfare::components::EntityId;

    #[test]
    fn event_log_names_the_configured_enemy() {
        let started = GameEvent::WaveStarted { wave: 2, enemies: 2 };
        assert_eq!(describe(&started, "Knight"), "Wave 2: 2 x Knight");
        let killed = GameEvent::EnemyKilled { enemy: EntityId(4), bounty: 10 };
        assert_eq!(describe(&killed, "Knight"), "Knight 4 slain (+10)");
    }
}
