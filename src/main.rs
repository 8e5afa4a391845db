use crate::core::audio::AudioEngine;
use crate::core::clock::{self, SystemClock};
use crate::core::effects::{LogConfetti, LogHaptics};
use crate::game::session::Session;
use clap::Parser;
use log::{LevelFilter, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::PathBuf;

mod app;
mod config;
mod core;
mod game;
mod headless;
mod screens;
mod ui;
mod utils;

#[derive(Parser)]
#[command(name = "campanadas")]
#[command(about = "New Year's Eve countdown: the twelve chimes, twelve grapes and fireworks")]
#[command(version)]
struct Cli {
    /// Run without a window, logging a status line every second
    #[arg(long)]
    headless: bool,

    /// Jump to 40 seconds before midnight and play the whole sequence
    #[arg(long)]
    rehearse: bool,

    /// Options file (created with defaults when missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Year whose first instant is the target, overriding the options file
    #[arg(long)]
    target_year: Option<i32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("campanadas::game", LevelFilter::Debug)
        .filter_module("campanadas::core::audio", LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    info!("Application starting...");

    let config_path = cli.config.unwrap_or_else(config::default_path);
    config::load(&config_path);
    if let Some(year) = cli.target_year {
        config::override_target_year(year);
    }
    let config = config::get();

    let Some(target_ms) = clock::new_year_target_ms(config.target_year) else {
        let msg = format!("no local midnight for 1 January {}", config.target_year);
        error!("{}", msg);
        return Err(msg.into());
    };
    info!("Counting down to 1 January {} 00:00 local time.", config.target_year);

    let session = Session::new(
        SystemClock::new(),
        config.target_year,
        target_ms,
        config.tap_window_ms,
        StdRng::from_os_rng(),
    );

    if cli.headless {
        let mut session = session;
        let mut audio = AudioEngine::new(config.enable_audio, config.master_volume);
        let mut haptics = LogHaptics { enabled: config.vibration };
        headless::run_with(&mut session, &mut audio, &mut haptics, &mut LogConfetti, cli.rehearse);
        audio.dispose();
    } else if let Err(e) = app::run(session, &config, cli.rehearse) {
        error!("Application exited with error: {}", e);
        return Err(e);
    }

    info!("Application exited gracefully.");
    Ok(())
}
