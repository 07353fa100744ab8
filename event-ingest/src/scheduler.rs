use std::time;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::IngestError;
use crate::pipeline::Pipeline;

pub const TICK_INTERVAL: time::Duration = time::Duration::from_secs(12 * 60 * 60);
pub const CITY: &str = "Ottawa";

/// Drives the pipeline for one city on a fixed interval until cancelled.
pub struct Scheduler {
    pipeline: Pipeline,
    city: String,
    interval: time::Duration,
    fail_fast: bool,
}

impl Scheduler {
    pub fn new(pipeline: Pipeline, city: &str, interval: time::Duration, fail_fast: bool) -> Self {
        Self {
            pipeline,
            city: city.to_owned(),
            interval,
            fail_fast,
        }
    }

    /// Run a tick immediately, then one per interval. A tick in progress is
    /// always finished; cancellation is only observed between ticks.
    ///
    /// A failed tick is skipped and the loop waits for the next one, unless
    /// `fail_fast` is set, in which case the error is returned. Returns the
    /// number of ticks run once cancelled.
    pub async fn run(&self, cancel: CancellationToken) -> Result<u64, IngestError> {
        let mut ticks = 0;

        while !cancel.is_cancelled() {
            ticks += 1;

            match self.pipeline.run_once(&self.city, Utc::now()).await {
                Ok(report) => info!(
                    tick = ticks,
                    fetched = report.fetched,
                    written = report.written,
                    "ingest run complete"
                ),
                Err(error) if self.fail_fast => return Err(error),
                Err(error) => warn!(
                    tick = ticks,
                    category = ?error.category(),
                    "ingest run failed, waiting for next tick: {error}"
                ),
            }

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(ticks, "scheduler stopped");
        Ok(ticks)
    }
}
