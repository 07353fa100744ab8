//! Best-effort human-readable reporting to an external log sink.
//!
//! Reports are always echoed through `tracing` first. Sink failures are logged
//! locally and swallowed: telemetry never fails a run.
use std::sync::Arc;
use std::time;

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Error,
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid telemetry sink url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("telemetry sink request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send(&self, level: Level, message: &str) -> Result<(), TelemetryError>;
}

/// Sink used when no external sink is configured; the local echo is all there is.
pub struct LocalSink;

#[async_trait]
impl TelemetrySink for LocalSink {
    async fn send(&self, _level: Level, _message: &str) -> Result<(), TelemetryError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct LogglyEntry<'a> {
    level: Level,
    message: &'a str,
}

/// Ships entries to a Loggly HTTP input, tagged with a fixed tag.
pub struct LogglySink {
    endpoint: Url,
    client: reqwest::Client,
}

impl LogglySink {
    pub fn new(
        base_url: &str,
        token: &str,
        tag: &str,
        request_timeout: time::Duration,
    ) -> Result<Self, TelemetryError> {
        let endpoint = Url::parse(base_url)?.join(&format!("/inputs/{token}/tag/{tag}/"))?;
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl TelemetrySink for LogglySink {
    async fn send(&self, level: Level, message: &str) -> Result<(), TelemetryError> {
        // The endpoint embeds the customer token, keep it out of errors.
        self.client
            .post(self.endpoint.clone())
            .json(&LogglyEntry { level, message })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| TelemetryError::Request(e.without_url()))?;

        Ok(())
    }
}

/// Cheap to clone; every clone reports to the same sink.
#[derive(Clone)]
pub struct TelemetryReporter {
    sink: Arc<dyn TelemetrySink>,
}

impl TelemetryReporter {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    pub fn local() -> Self {
        Self::new(Arc::new(LocalSink))
    }

    pub async fn report(&self, level: Level, message: &str) {
        match level {
            Level::Info => info!(target: "telemetry", "{message}"),
            Level::Error => error!(target: "telemetry", "{message}"),
        }

        if let Err(e) = self.sink.send(level, message).await {
            warn!("failed to deliver telemetry: {e}");
        }
    }
}
