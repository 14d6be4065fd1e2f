use log::{error, info, warn, LevelFilter};
use std::error::Error;

mod app;
mod config;
mod core;
mod game;
mod screens;
mod ui;
mod utils;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("keyfall::game", LevelFilter::Info)
        .filter_module("keyfall::core::audio", LevelFilter::Info)
        .filter_module("gilrs", LevelFilter::Warn)
        .init();

    info!("Application starting...");

    config::load();

    // Audio is optional: without it the game runs silently.
    if let Err(e) = crate::core::audio::init() {
        warn!("Failed to initialize audio engine: {}", e);
    }

    if let Err(e) = app::run() {
        error!("Application exited with error: {}", e);
        return Err(e);
    }

    info!("Application exited gracefully.");
    Ok(())
}
