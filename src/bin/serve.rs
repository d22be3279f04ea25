use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use orbit_engine::config::{self, Settings};
use orbit_engine::server;
use orbit_engine::sim::{journal, Engine};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Launch the Orbit Engine simulation server.
#[derive(Parser, Debug)]
#[command(author, version, about = "Orbit Engine simulation and planning server")]
struct Cli {
    /// Listen port
    #[arg(long)]
    port: Option<u16>,

    /// Tick cadence in Hz
    #[arg(long = "tick-hz")]
    tick_hz: Option<f64>,

    /// Journal output directory
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// Disable the tick journal entirely
    #[arg(long = "no-log", default_value_t = false)]
    no_log: bool,

    /// Optional TOML settings file (CLI flags win over file values)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "configuration rejected");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to build runtime");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server terminated with error");
            ExitCode::from(1)
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, config::ConfigError> {
    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(tick_hz) = cli.tick_hz {
        settings.simulation.tick_hz = tick_hz;
    }
    if let Some(dir) = &cli.log_dir {
        settings.journal.dir = dir.clone();
    }
    if cli.no_log {
        settings.journal.enabled = false;
    }
    settings.validate()?;
    Ok(settings)
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let settings = Arc::new(settings);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (journal_handle, journal_task) = if settings.journal.enabled {
        let (handle, task) =
            journal::spawn(&settings.journal).context("creating journal directory")?;
        (Some(handle), Some(task))
    } else {
        (None, None)
    };

    let (engine, engine_handle) = Engine::new(&settings.simulation, journal_handle, shutdown_rx.clone());
    let engine_task = tokio::spawn(engine.run());

    let mut server_task = tokio::spawn(server::serve(
        settings.clone(),
        engine_handle,
        shutdown_rx,
    ));

    let server_outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for shutdown signal")?;
            tracing::info!("shutdown signal received");
            shutdown_tx.send(true).ok();
            server_task.await.context("joining server task")?
        }
        joined = &mut server_task => {
            // The listener ended on its own (bind failure or fatal I/O).
            shutdown_tx.send(true).ok();
            joined.context("joining server task")?
        }
    };

    engine_task.await.context("joining engine task")?;
    // The engine held the last journal handle; awaiting the writer gives
    // the final partial batch time to reach disk.
    if let Some(task) = journal_task {
        task.await.context("joining journal writer")?;
    }
    server_outcome?;
    Ok(())
}
