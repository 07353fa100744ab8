use tracing::debug;

use crate::error::IngestError;
use crate::models::EventRecord;
use crate::store::{to_item, ItemKey, KeyValueStore, StoreError};

pub const EVENTS_TABLE: &str = "Ticketmaster_events";

/// Upserts normalized records into the events table, one at a time.
pub struct EventWriter {
    store: Box<dyn KeyValueStore>,
    table: String,
}

impl EventWriter {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            table: EVENTS_TABLE.to_owned(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Write every record in order, returning how many were written.
    ///
    /// Stops at the first record that fails to marshal or write: records
    /// before it stay written and records after it are never attempted.
    pub async fn persist(&self, records: &[EventRecord]) -> Result<usize, IngestError> {
        for record in records {
            self.write_one(record)
                .await
                .map_err(|error| IngestError::Persistence {
                    id: record.id.clone(),
                    error,
                })?;
            debug!(id = %record.id, city = %record.city, "upserted event");
        }

        Ok(records.len())
    }

    async fn write_one(&self, record: &EventRecord) -> Result<(), StoreError> {
        let key = ItemKey::new(record.id.as_str(), record.city.as_str())?;
        let item = to_item(record)?;
        self.store.put_item(&self.table, &key, item).await
    }
}
