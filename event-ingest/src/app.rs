use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{Config, StoreKind};
use crate::error::IngestError;
use crate::pipeline::Pipeline;
use crate::scheduler::{Scheduler, CITY, TICK_INTERVAL};
use crate::source::TicketmasterClient;
use crate::store::{KeyValueStore, MemoryStore, PgStore, StoreError};
use crate::telemetry::{Level, LogglySink, TelemetryReporter};
use crate::writer::EventWriter;

/// Loggly when a token is configured, otherwise tracing output only.
pub fn telemetry_from(config: &Config) -> TelemetryReporter {
    let Some(token) = config.loggly_token.as_deref() else {
        info!("no LOGGLY_TOKEN set, telemetry is local only");
        return TelemetryReporter::local();
    };

    match LogglySink::new(
        &config.loggly_url,
        token,
        &config.loggly_tag,
        config.request_timeout.0,
    ) {
        Ok(sink) => TelemetryReporter::new(Arc::new(sink)),
        Err(e) => {
            warn!("failed to set up loggly sink, telemetry is local only: {e}");
            TelemetryReporter::local()
        }
    }
}

async fn store_from(config: &Config) -> Result<Box<dyn KeyValueStore>, StoreError> {
    match config.store {
        StoreKind::Memory => {
            warn!("using the in-memory store, nothing will be persisted");
            Ok(Box::new(MemoryStore::new()))
        }
        StoreKind::Postgres => {
            let store = PgStore::new(&config.database_url, config.max_pg_connections)?;
            store.run_migrations().await?;
            Ok(Box::new(store))
        }
    }
}

async fn wire(config: &Config, telemetry: TelemetryReporter) -> Result<Scheduler, IngestError> {
    // Resolved once, before anything touches the network.
    let api_key = config.api_key()?;

    let source = TicketmasterClient::new(
        &config.ticketmaster_url,
        api_key,
        config.request_timeout.0,
    )?;
    let store = store_from(config).await.map_err(IngestError::StoreSetup)?;
    let pipeline = Pipeline::new(Box::new(source), EventWriter::new(store), telemetry);

    Ok(Scheduler::new(pipeline, CITY, TICK_INTERVAL, config.fail_fast))
}

/// Build the scheduler from `config`. A startup failure is reported to
/// `telemetry` before it is returned; nothing is fetched in that case.
pub async fn bootstrap(
    config: &Config,
    telemetry: TelemetryReporter,
) -> Result<Scheduler, IngestError> {
    match wire(config, telemetry.clone()).await {
        Ok(scheduler) => Ok(scheduler),
        Err(error) => {
            telemetry.report(Level::Error, &error.to_string()).await;
            Err(error)
        }
    }
}
