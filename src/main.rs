mod app;
mod config;
mod context;
mod engine;
mod error;
mod geometry;
mod hotkeys;
mod planner;
mod pointer;
mod random;
mod screen;
mod timing;

use anyhow::Context as _;
use clap::Parser;
use std::{path::PathBuf, sync::mpsc, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    config::{GridConfig, DEFAULT_CONFIG_PATH},
    context::RunContext,
    engine::RunOptions,
    pointer::{ClickButton, EnigoPointer},
    timing::{secs, DEFAULT_JITTER_PX, DEFAULT_START_DELAY_SECS},
};

/// Clicks the center of every cell in a calibrated on-screen grid with
/// human-like pacing.
#[derive(Parser, Debug)]
#[command(name = "grid_clicker", version, about)]
struct Cli {
    /// Grid config file (created with defaults when missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seconds to wait after a start request before the first click
    #[arg(long, default_value_t = DEFAULT_START_DELAY_SECS)]
    start_delay: f64,

    /// Maximum random offset in pixels applied to each click
    #[arg(long, default_value_t = DEFAULT_JITTER_PX)]
    jitter: i32,

    #[arg(long, value_enum, default_value_t = ClickButton::Left)]
    button: ClickButton,

    /// Do not abort when the pointer is parked in the top-left screen corner
    #[arg(long)]
    no_failsafe: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = GridConfig::load_or_create(&cli.config, &GridConfig::default())
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let displays = screen::displays();
    for d in &displays {
        info!(
            "Display at ({}, {}) {}x{}{}",
            d.x,
            d.y,
            d.width,
            d.height,
            if d.primary { " [primary]" } else { "" }
        );
    }
    if let Some((min_x, min_y, max_x, max_y)) = screen::total_bounds(&displays) {
        info!("Screen area x=[{}..{}], y=[{}..{}]", min_x, max_x, min_y, max_y);
    }

    let options = RunOptions {
        start_delay: secs(cli.start_delay),
        jitter: cli.jitter.abs(),
        button: cli.button,
        failsafe: !cli.no_failsafe,
    };
    print_banner(&config, &options);

    let ctx = Arc::new(RunContext::new(config));
    let (tx, rx) = mpsc::channel();
    hotkeys::spawn_console(tx.clone());
    #[cfg(feature = "hooks")]
    hotkeys::spawn_hotkeys(tx.clone());
    drop(tx);

    let mut app = App::new(ctx, cli.config, options, displays);
    let mut pointer = EnigoPointer;
    while let Ok(cmd) = rx.recv() {
        if app.handle(cmd, &mut pointer).is_break() {
            break;
        }
    }

    app.shutdown();
    info!("Exiting");
    Ok(())
}

fn print_banner(config: &GridConfig, options: &RunOptions) {
    let keys = if cfg!(feature = "hooks") { "Ctrl+Alt+" } else { "" };
    println!(
        "
================ Grid Clicker ================
Commands ({keys}<key>, or type the key + Enter):
  {keys}1  -> Save p00 (top-left of the first cell)
  {keys}2  -> Save pTR (top-right of the top-right cell)
  {keys}3  -> Save pBL (bottom-left of the bottom-left cell)
  {keys}0  -> Start clicking (waits {delay:.1} seconds)
  {keys}9  -> Emergency stop
  {keys}R  -> Reload config
  q      -> Quit
Fail-safe: park the pointer at the top-left screen corner to abort ({failsafe}).
Current config:
  columns={columns}  rows={rows}  speed={speed}  scan_order={order}
==============================================
",
        delay = options.start_delay.as_secs_f64(),
        failsafe = if options.failsafe { "on" } else { "off" },
        columns = config.columns,
        rows = config.rows,
        speed = config.speed as u8,
        order = config.scan_order as u8,
    );
}
