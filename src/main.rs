// src/main.rs
// Entry point for the Labyrinth navigation server: load configuration,
// set up logging, then accept simulator connections until Ctrl-C.

use clap::Parser;
use labyrinth_nav::{LabyrinthConfig, Server};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Camera-driven maze navigation controller for a simulated agent
#[derive(Parser, Debug)]
#[command(name = "labyrinth-nav", version, about)]
struct Args {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 0.0.0.0:5000
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the default log level (RUST_LOG still wins)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Configuration is read before the logger so its level can apply
    let mut config = match &args.config {
        Some(path) => LabyrinthConfig::load(path)?,
        None => LabyrinthConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .format_timestamp_millis()
        .init();

    info!("Labyrinth v{} starting", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => info!("Using configuration {}", path.display()),
        None => info!("No configuration file given, using defaults"),
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })?;

    let server = Server::bind(&config)?;
    if let Err(e) = server.run(running) {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Labyrinth stopped");
    Ok(())
}
