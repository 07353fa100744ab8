use std::fmt;
use std::time;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::models::EventSearchResult;

pub const EVENTS_PATH: &str = "/discovery/v2/events.json";
pub const SORT_ORDER: &str = "date,asc";

/// Anything that can answer "which events are coming up in this city".
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(
        &self,
        city: &str,
        as_of: DateTime<Utc>,
    ) -> Result<EventSearchResult, IngestError>;
}

/// The event source credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            None
        } else {
            Some(ApiKey(key.to_owned()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Lower bound sent for both `startDateTime` and `startDate`: the as-of day at 14:00 UTC.
pub fn start_bound(as_of: DateTime<Utc>) -> String {
    format!("{}T14:00:00Z", as_of.format("%Y-%m-%d"))
}

/// Client for the Ticketmaster Discovery API.
pub struct TicketmasterClient {
    base_url: Url,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl TicketmasterClient {
    pub fn new(
        base_url: &str,
        api_key: ApiKey,
        request_timeout: time::Duration,
    ) -> Result<Self, IngestError> {
        let base_url = Url::parse(base_url).map_err(IngestError::InvalidUrl)?;

        let client = reqwest::Client::builder()
            .user_agent("event-ingest")
            .timeout(request_timeout)
            .build()
            .map_err(IngestError::Request)?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Build the search URL. Spaces in `city` are sent as `+`.
    pub fn query_url(&self, city: &str, as_of: DateTime<Utc>) -> Result<Url, IngestError> {
        let lower_bound = start_bound(as_of);
        let mut url = self
            .base_url
            .join(EVENTS_PATH)
            .map_err(IngestError::InvalidUrl)?;

        url.query_pairs_mut()
            .append_pair("apikey", self.api_key.expose())
            .append_pair("city", city)
            .append_pair("sort", SORT_ORDER)
            .append_pair("startDateTime", &lower_bound)
            .append_pair("startDate", &lower_bound);

        Ok(url)
    }
}

#[async_trait]
impl EventSource for TicketmasterClient {
    async fn fetch_events(
        &self,
        city: &str,
        as_of: DateTime<Utc>,
    ) -> Result<EventSearchResult, IngestError> {
        info!(
            "Available events after {} in {}",
            as_of.format("%Y-%m-%d"),
            city
        );

        let url = self.query_url(city, as_of)?;

        // Errors are stripped of their URL, it carries the API key.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| IngestError::Request(error.without_url()))?;

        let body = response
            .bytes()
            .await
            .map_err(|error| IngestError::ReadBody(error.without_url()))?;

        debug!(bytes = body.len(), "received event search response");

        serde_json::from_slice(&body).map_err(IngestError::Decode)
    }
}
