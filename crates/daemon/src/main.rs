#![forbid(unsafe_code)]

//! Monitor daemon: polls producers' deliverable artifacts, persists a
//! status snapshot, escalates on stalled progress, and serves a read-only
//! status endpoint.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod http;
mod probe;
mod scheduler;
mod store;

use crate::config::MonitorConfig;
use crate::http::AppState;
use crate::probe::FsProbe;
use crate::scheduler::{LogEscalation, SchedulerConfig};
use crate::store::StatusStore;

#[derive(Parser, Debug)]
#[command(name = "monitor-daemon", version, about = "Deliverable progress monitor")]
struct Cli {
    /// Producer/artifact config (TOML).
    #[arg(long, default_value = "monitor.toml")]
    config: PathBuf,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll artifact presence and serve the status endpoint
    Run {
        /// Listen address for the read-only status API.
        #[arg(long, default_value = "127.0.0.1:3000")]
        listen: SocketAddr,

        /// Root directory artifact locators are resolved against.
        #[arg(long, default_value = ".")]
        artifact_root: PathBuf,

        /// Status snapshot file.
        #[arg(long, default_value = ".monitor/status.json")]
        status_file: PathBuf,

        /// Polling interval in seconds.
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,

        /// Total evaluation budget before escalation.
        #[arg(long, default_value_t = 12)]
        max_cycles: u32,
    },

    /// Validate config and environment, then exit
    Check {
        /// Root directory artifact locators are resolved against.
        #[arg(long, default_value = ".")]
        artifact_root: PathBuf,
    },

    /// Print the persisted snapshot once
    Status {
        /// Status snapshot file.
        #[arg(long, default_value = ".monitor/status.json")]
        status_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cli.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.cmd {
        Command::Run {
            listen,
            artifact_root,
            status_file,
            interval_secs,
            max_cycles,
        } => run(&cli.config, listen, artifact_root, status_file, interval_secs, max_cycles).await,
        Command::Check { artifact_root } => check(&cli.config, &artifact_root),
        Command::Status { status_file } => status(&status_file),
    }
}

async fn run(
    config: &Path,
    listen: SocketAddr,
    artifact_root: PathBuf,
    status_file: PathBuf,
    interval_secs: u64,
    max_cycles: u32,
) -> anyhow::Result<()> {
    anyhow::ensure!(max_cycles > 0, "--max-cycles must be at least 1");
    anyhow::ensure!(interval_secs > 0, "--interval-secs must be at least 1");

    // Setup errors (bad config, duplicate producers) surface here, before
    // any polling starts.
    let cfg = MonitorConfig::load_from(config)?;
    let registry = Arc::new(cfg.build_registry()?);
    let artifact_root = std::fs::canonicalize(&artifact_root)
        .with_context(|| format!("canonicalize {}", artifact_root.display()))?;

    let store = StatusStore::new(status_file);

    let scheduler = scheduler::start(
        Arc::clone(&registry),
        Arc::new(FsProbe::new(artifact_root)),
        store.clone(),
        Arc::new(LogEscalation),
        SchedulerConfig {
            interval: Duration::from_secs(interval_secs),
            max_cycles,
        },
    );

    let app = http::router(AppState {
        store,
        registry: Arc::clone(&registry),
    });

    tracing::info!(listen = %listen, producers = registry.len(), "monitor starting");
    axum::serve(tokio::net::TcpListener::bind(listen).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    Ok(())
}

fn check(config: &Path, artifact_root: &Path) -> anyhow::Result<()> {
    let cfg = MonitorConfig::load_from(config)?;
    let registry = cfg.build_registry()?;

    let root = std::fs::canonicalize(artifact_root)
        .with_context(|| format!("canonicalize {}", artifact_root.display()))?;
    std::fs::read_dir(&root)
        .with_context(|| format!("artifact root {} is not readable", root.display()))?;

    let artifacts: usize = registry.list().iter().map(|p| p.artifacts.len()).sum();
    println!(
        "OK: {} producers, {} artifacts expected under {}",
        registry.len(),
        artifacts,
        root.display()
    );
    Ok(())
}

fn status(status_file: &Path) -> anyhow::Result<()> {
    let store = StatusStore::new(status_file.to_path_buf());
    match store.load()? {
        None => println!("no status recorded yet"),
        Some(snap) => {
            println!("Phase: {:?} (cycle {})", snap.phase, snap.cycles_elapsed);
            println!("Overall: {}%", snap.overall_percentage);
            for p in &snap.per_producer {
                println!("- {}: {}/{} ({}%)", p.producer, p.completed, p.total, p.percentage);
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
