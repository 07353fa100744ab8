use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::IngestError;
use crate::normalize::normalize;
use crate::source::EventSource;
use crate::telemetry::{Level, TelemetryReporter};
use crate::writer::EventWriter;

/// Counts from one successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub written: usize,
}

/// One full ingest pass: fetch, normalize, persist, report.
pub struct Pipeline {
    source: Box<dyn EventSource>,
    writer: EventWriter,
    telemetry: TelemetryReporter,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn EventSource>,
        writer: EventWriter,
        telemetry: TelemetryReporter,
    ) -> Self {
        Self {
            source,
            writer,
            telemetry,
        }
    }

    /// Run the pipeline once for `city`. Any failure is reported to telemetry
    /// before it is returned.
    pub async fn run_once(
        &self,
        city: &str,
        as_of: DateTime<Utc>,
    ) -> Result<RunReport, IngestError> {
        match self.ingest(city, as_of).await {
            Ok(report) => Ok(report),
            Err(error) => {
                self.telemetry.report(Level::Error, &error.to_string()).await;
                Err(error)
            }
        }
    }

    async fn ingest(&self, city: &str, as_of: DateTime<Utc>) -> Result<RunReport, IngestError> {
        let result = self.source.fetch_events(city, as_of).await?;
        info!(city, events = result.events().len(), "fetched events");

        let records = normalize(&result, city);
        let written = self.writer.persist(&records).await?;

        let message = format!(
            "Events in {city}\n{}\nAdded {written} items to {}",
            result.summary(),
            self.writer.table()
        );
        self.telemetry.report(Level::Info, &message).await;

        Ok(RunReport {
            fetched: records.len(),
            written,
        })
    }
}
