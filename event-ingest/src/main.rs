//! Poll the event source for the configured city and upsert what it returns.
use std::process::ExitCode;

use envconfig::Envconfig;
use eyre::Result;
use tokio::signal::unix::SignalKind;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use event_ingest::app::{bootstrap, telemetry_from};
use event_ingest::config::Config;
use event_ingest::error::IngestError;

fn setup_tracing() {
    let log_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(log_layer).init();
}

async fn wait_for_shutdown_signal() -> Result<()> {
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = sigterm.recv() => info!("received SIGTERM"),
    }

    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let telemetry = telemetry_from(&config);
    let scheduler = bootstrap(&config, telemetry).await?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => shutdown.cancel(),
            Err(e) => error!("failed to install signal handlers, only SIGKILL stops the loop: {e}"),
        }
    });

    let ticks = scheduler.run(cancel).await?;
    info!(ticks, "shut down cleanly");

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_tracing();
    info!("Starting up...");

    let config = match Config::init_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration from env: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("exiting: {e:?}");
            match e.downcast_ref::<IngestError>() {
                Some(error) => ExitCode::from(error.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}
