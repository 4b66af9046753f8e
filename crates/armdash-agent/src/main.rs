//! Armdash Agent - Main entry point
//!
//! Connects to the arm control service, runs the state synchronizer and
//! logs state changes until interrupted.

mod config;

use anyhow::{bail, Context, Result};
use armdash_core::SyncEvent;
use armdash_sync::{ArmClient, Session};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "armdash")]
#[command(about = "Dashboard state synchronizer for an HTTP-connected robotic arm")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "armdash.toml")]
    config: PathBuf,

    /// Base URL of the control service
    #[arg(short, long)]
    base_url: Option<String>,

    /// Serial port to connect to
    #[arg(short, long)]
    port: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print a single status snapshot and exit
    #[arg(long)]
    status_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Armdash v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::load_config(&args.config)?;
    if let Some(base_url) = args.base_url {
        config.service.base_url = base_url;
    }

    info!(base_url = %config.service.base_url, "Configuration loaded");

    if args.status_once {
        // Single status snapshot mode
        let client = ArmClient::new(&config.service)?;
        let status = client.status().await.context("Status query failed")?;
        match status.port {
            Some(port) if status.connected => println!("Connected: {}", port),
            _ => println!("Disconnected"),
        }
        let ports = client.ports().await.context("Port listing failed")?;
        println!("Available ports:");
        for port in ports {
            println!("  - {}", port);
        }
        return Ok(());
    }

    let Some(port) = args.port.or_else(|| config.agent.port.clone()) else {
        let client = ArmClient::new(&config.service)?;
        let ports = client.ports().await.unwrap_or_default();
        bail!(
            "no port selected (use --port); available ports: {}",
            if ports.is_empty() {
                "none".to_string()
            } else {
                ports.join(", ")
            }
        );
    };

    let session = Session::connect(config.service.clone(), &port)
        .await
        .with_context(|| format!("Failed to connect on {}", port))?;

    // Forward synchronizer events to the log
    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SyncEvent::Connected { port } => info!(port = %port, "Connected"),
                SyncEvent::Disconnected => info!("Disconnected"),
                SyncEvent::ServosLoaded { count } => info!(count, "Servo descriptors loaded"),
                SyncEvent::PositionUpdated { frame, position } => {
                    info!(frame = %frame, position = %position, "Position updated (mm)")
                }
                SyncEvent::AngleUpdated { servo_id, angle } => {
                    info!(servo = servo_id, angle, "Servo angle confirmed")
                }
                SyncEvent::BoxesUpdated { count } => info!(count, "Detected boxes updated"),
                SyncEvent::ImageReceived { bytes } => debug!(bytes, "Camera frame received"),
                SyncEvent::ModeChanged(mode) => info!(mode = %mode, "Transport mode changed"),
                SyncEvent::SerialLine(line) => info!(line = %line, "Serial"),
                SyncEvent::Notice(message) => info!("{}", message),
                SyncEvent::Error(message) => warn!("{}", message),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    if let Err(e) = session.disconnect().await {
        warn!(error = %e, "Disconnect failed");
    }

    Ok(())
}
