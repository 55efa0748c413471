mod logging;
mod tui;

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use teutonic_warfare::{GameConfig, GameSession};

/// Fixed step of the headless run
const HEADLESS_DT: f32 = 1.0 / 30.0;

#[derive(Parser)]
#[clap(name = "teutonic-warfare", about = "Tower defense on a single road")]
pub struct Opt {
    /// Game configuration; built-in defaults are used when the file is missing
    #[clap(short, long, default_value = "teutonic.toml")]
    pub config: PathBuf,
    /// Override the configured random seed
    #[clap(long)]
    pub seed: Option<u64>,
    #[clap(long, default_value = "logs")]
    pub log_dir: PathBuf,
    /// Write the round summary as JSON to this file on exit
    #[clap(long)]
    pub summary: Option<PathBuf>,
    /// Simulate this many seconds without a terminal UI and print the summary
    #[clap(long)]
    pub headless: Option<f32>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let opt = Opt::parse();
    let _guard = logging::setup_logging(&opt.log_dir)?;

    let mut config = if opt.config.exists() {
        GameConfig::load(&opt.config)?
    } else {
        log::warn!("{:?} not found, using built-in configuration", opt.config);
        GameConfig::default()
    };
    if let Some(seed) = opt.seed {
        config.seed = seed;
    }

    let mut session = GameSession::new(config)?;

    match opt.headless {
        Some(seconds) => {
            run_headless(&mut session, seconds);
            println!("{}", serde_json::to_string_pretty(&session.summary())?);
        }
        None => tui::run_tui(&mut session)?,
    }

    if let Some(path) = &opt.summary {
        fs::write(path, serde_json::to_string_pretty(&session.summary())?)?;
        log::info!("Round summary written to {:?}", path);
    }
    Ok(())
}

/// Start defending at once and step until the time runs out or the round ends.
fn run_headless(session: &mut GameSession, seconds: f32) {
    session.start_wave();
    let mut elapsed = 0.0;
    while elapsed < seconds && !session.controller().is_ended() {
        session.tick(HEADLESS_DT);
        elapsed += HEADLESS_DT;
        for event in session.drain_events() {
            log::debug!("{:?}", event);
        }
    }
    log::info!(
        "Headless run finished after {:.1}s: {:?}",
        session.clock(),
        session.controller().outcome
    );
}
