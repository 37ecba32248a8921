//! Robot Eyes for Raspberry Pi OLED displays
//!
//! A Rust-based service that:
//! - Animates a pair of robot eyes on an SSD1306/SH1106 SPI OLED
//! - Cycles moods and plays random confused/laugh animations
//! - Provides a web interface for live control and configuration
//! - Runs as a systemd service with graceful shutdown

mod behaviour;
mod config;
mod display;
mod eyes;
mod render;
mod scheduler;
mod web;

use anyhow::Context;
use behaviour::Behaviour;
use clap::Parser;
use config::Config;
use display::{FrameSink, HeadlessSink, Oled};
use eyes::{EyeAnimator, EyeSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use render::Orientation;
use scheduler::FrameScheduler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "robo-eyes")]
#[command(about = "Animated robot eyes for Raspberry Pi OLED displays")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Web server port (overrides config, default: 8888)
    #[arg(long = "http-port")]
    http_port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run without a panel
    #[arg(long)]
    headless: bool,

    /// Disable the web interface
    #[arg(long)]
    no_web: bool,

    /// Show test pattern with a contrast sweep and exit
    #[arg(long)]
    test: bool,

    /// Clear display and exit
    #[arg(long)]
    clear: bool,

    /// Render frames without a panel and write the last one as PNG
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Number of frames to render for --snapshot
    #[arg(long, default_value_t = 50)]
    frames: u32,
}

/// Using current_thread runtime for single-core Pi Zero W
/// This reduces memory overhead and avoids thread synchronization costs
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config);
    let verbose = args.verbose
        || config.as_ref().map(|c| c.verbose).unwrap_or(false);

    // Initialize logging
    init_logging(verbose);

    tracing::info!("Starting Robo Eyes");

    let config = config.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from {}: {}", args.config, e);
        tracing::info!("Using default configuration");
        Config::default()
    });

    // Handle one-shot commands
    if args.test || args.clear {
        let mut oled = Oled::new(&config.display).context("Failed to open display")?;
        if args.test {
            tracing::info!("Running test pattern...");
            oled.test_pattern()?;
            for contrast in [0xFF, 0x40, 0x01, config.display.contrast] {
                tracing::info!("Contrast {:#04x}", contrast);
                oled.set_contrast(contrast)?;
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
            tracing::info!("Test pattern complete");
        } else {
            tracing::info!("Clearing display...");
            oled.clear()?;
            oled.sleep()?;
            tracing::info!("Display cleared");
        }
        return Ok(());
    }

    let rng = StdRng::from_os_rng();
    let animator = EyeAnimator::with_config(
        config.display.width,
        config.display.height,
        &config.eyes,
        rng,
    );
    let behaviour = Behaviour::new(config.behaviour.clone());
    let orientation = Orientation::from(&config.display);

    let (command_tx, command_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(EyeSnapshot::default());

    if let Some(path) = &args.snapshot {
        let sink = HeadlessSink::with_size(config.display.width, config.display.height);
        let mut scheduler = FrameScheduler::new(
            animator,
            sink,
            behaviour,
            command_rx,
            snapshot_tx,
            orientation,
        );
        render_snapshot(&mut scheduler, args.frames, path)?;
        return Ok(());
    }

    let sink = display::open_sink(&config.display, args.headless)
        .context("Failed to open display (use --headless to run without one)")?;
    let mut scheduler = FrameScheduler::new(
        animator,
        sink,
        behaviour,
        command_rx,
        snapshot_tx,
        orientation,
    );

    // Setup shutdown signal handling
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Spawn scheduler task
    let scheduler_shutdown = shutdown_tx.subscribe();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_shutdown).await;
    });

    // Spawn web server task
    let web_handle = if args.no_web || !config.web_enabled {
        tracing::info!("Web interface disabled");
        None
    } else {
        let port = args.http_port.unwrap_or(config.web_port);
        let web_server = web::WebServer::new(
            Arc::new(RwLock::new(config)),
            command_tx.clone(),
            snapshot_rx,
            args.config.clone(),
        );
        let web_shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = web_server.run_with_shutdown(port, web_shutdown).await {
                tracing::error!("Web server error: {}", e);
            }
        }))
    };

    // Wait for shutdown signal
    wait_for_shutdown().await?;
    tracing::info!("Shutdown signal received");

    // Send shutdown to all tasks
    let _ = shutdown_tx.send(());

    // Wait for tasks to complete with timeout
    tokio::select! {
        _ = scheduler_handle => {},
        _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => {
            tracing::warn!("Scheduler shutdown timeout");
        }
    }

    if let Some(web_handle) = web_handle {
        tokio::select! {
            _ = web_handle => {},
            _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => {
                tracing::warn!("Web server shutdown timeout");
            }
        }
    }

    drop(command_tx);
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Render frames on a simulated clock and write the last one
fn render_snapshot<S: FrameSink>(
    scheduler: &mut FrameScheduler<S>,
    frames: u32,
    path: &Path,
) -> anyhow::Result<()> {
    let step = scheduler.eyes().frame_interval_ms();
    for frame in 0..u64::from(frames.max(1)) {
        scheduler.render_frame(frame * step);
    }

    if scheduler.present_errors() > 0 {
        tracing::warn!("{} frames failed to render", scheduler.present_errors());
    }

    scheduler
        .save_snapshot(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {} after {} frames", path.display(), frames);
    println!("{}", path.display());
    Ok(())
}

/// Initialize tracing/logging
///
/// Default level is "warn" to minimize SD card wear from log writes.
/// Use --verbose flag for "debug" level during development/troubleshooting.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("robo_eyes={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
async fn wait_for_shutdown() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT");
        }
    }

    Ok(())
}
