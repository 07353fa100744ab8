//! Shapes of the event source's search response, and of the record we persist.
//!
//! Every raw field defaults when the source leaves it out: a missing venue list,
//! date or name degrades to an empty value rather than a decode error. An
//! explicit `null` is treated the same as a missing field.
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The `_embedded.events` envelope returned by one search request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventSearchResult {
    // The source omits `_embedded` entirely when nothing matched.
    #[serde(rename = "_embedded", deserialize_with = "null_as_default")]
    pub embedded: EmbeddedEvents,
}

impl EventSearchResult {
    pub fn events(&self) -> &[RawEvent] {
        &self.embedded.events
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmbeddedEvents {
    #[serde(deserialize_with = "null_as_default")]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dates: EventDates,
    #[serde(rename = "priceRanges", deserialize_with = "null_as_default")]
    pub price_ranges: Vec<PriceRange>,
    #[serde(rename = "_embedded", deserialize_with = "null_as_default")]
    pub embedded: EmbeddedVenues,
}

impl RawEvent {
    /// The first venue's name, or an empty string when the source sent no venues.
    pub fn first_venue_name(&self) -> &str {
        self.embedded
            .venues
            .first()
            .map(|venue| venue.name.as_str())
            .unwrap_or_default()
    }

    pub fn start_date(&self) -> &str {
        self.dates
            .start
            .as_ref()
            .map(|start| start.local_date.as_str())
            .unwrap_or_default()
    }

    pub fn start_time(&self) -> &str {
        self.dates
            .start
            .as_ref()
            .map(|start| start.local_time.as_str())
            .unwrap_or_default()
    }

    pub fn end_date(&self) -> &str {
        self.dates
            .end
            .as_ref()
            .map(|end| end.local_date.as_str())
            .unwrap_or_default()
    }

    /// Date shown in run summaries: multi-day events report when they end.
    /// Never used for the persisted record, which always keeps the start.
    pub fn summary_date(&self) -> &str {
        match self.end_date() {
            "" => self.start_date(),
            end => end,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventDates {
    pub start: Option<LocalDateTime>,
    pub end: Option<LocalDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocalDateTime {
    #[serde(rename = "localDate", deserialize_with = "null_as_default")]
    pub local_date: String,
    #[serde(rename = "localTime", deserialize_with = "null_as_default")]
    pub local_time: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PriceRange {
    #[serde(deserialize_with = "null_as_default")]
    pub min: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmbeddedVenues {
    #[serde(deserialize_with = "null_as_default")]
    pub venues: Vec<Venue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Venue {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// One upcoming event as written to the store. `(id, city)` is the natural key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    #[serde(rename = "EventName")]
    pub event_name: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "VenueName")]
    pub venue_name: String,
    /// Local start time, kept under its legacy attribute name.
    #[serde(rename = "StartDateTime")]
    pub start_time: String,
    #[serde(rename = "StartDate")]
    pub start_date: String,
    /// The human-readable city the query was made for.
    #[serde(rename = "City")]
    pub city: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_RESPONSE: &str = r#"{
        "_embedded": {
            "events": [
                {
                    "name": "Folk Festival",
                    "id": "F1",
                    "dates": {
                        "start": {"localDate": "2024-07-04", "localTime": "12:00:00"},
                        "end": {"localDate": "2024-07-07", "localTime": "23:00:00"},
                        "status": {"code": "onsale"}
                    },
                    "priceRanges": [{"type": "standard", "currency": "CAD", "min": 25.0, "max": 120.5}],
                    "_embedded": {"venues": [{"name": "LeBreton Flats"}, {"name": "Overflow Lot"}]}
                },
                {
                    "name": "Pop-up Show",
                    "id": "P1",
                    "dates": {"start": {"localDate": "2024-07-05"}}
                }
            ]
        },
        "page": {"size": 20, "totalElements": 2}
    }"#;

    #[test]
    fn test_deserialize_search_response() {
        let result: EventSearchResult =
            serde_json::from_str(SEARCH_RESPONSE).expect("failed to parse response");

        let events = result.events();
        assert_eq!(events.len(), 2);

        let festival = &events[0];
        assert_eq!(festival.name, "Folk Festival");
        assert_eq!(festival.start_date(), "2024-07-04");
        assert_eq!(festival.start_time(), "12:00:00");
        assert_eq!(festival.end_date(), "2024-07-07");
        assert_eq!(
            festival.price_ranges,
            vec![PriceRange {
                min: 25.0,
                max: 120.5
            }]
        );
        assert_eq!(festival.first_venue_name(), "LeBreton Flats");

        let popup = &events[1];
        assert_eq!(popup.start_time(), "");
        assert_eq!(popup.end_date(), "");
        assert!(popup.price_ranges.is_empty());
        assert_eq!(popup.first_venue_name(), "");
    }

    #[test]
    fn test_response_without_embedded_has_no_events() {
        let result: EventSearchResult =
            serde_json::from_str(r#"{"page": {"totalElements": 0}}"#).unwrap();

        assert!(result.events().is_empty());
    }

    #[test]
    fn test_summary_date_prefers_end() {
        let result: EventSearchResult = serde_json::from_str(SEARCH_RESPONSE).unwrap();

        assert_eq!(result.events()[0].summary_date(), "2024-07-07");
        assert_eq!(result.events()[1].summary_date(), "2024-07-05");
    }

    #[test]
    fn test_summary_date_ignores_end_without_local_date() {
        let event: RawEvent = serde_json::from_str(
            r#"{"dates": {"start": {"localDate": "2024-05-01"}, "end": {"approximate": true}}}"#,
        )
        .unwrap();

        assert_eq!(event.summary_date(), "2024-05-01");
    }

    #[test]
    fn test_null_fields_degrade_to_defaults() {
        let result: EventSearchResult = serde_json::from_str(
            r#"{"_embedded": {"events": [
                {
                    "name": null,
                    "id": "E1",
                    "dates": {"start": {"localDate": "2024-05-01", "localTime": null}, "end": null},
                    "priceRanges": null,
                    "_embedded": {"venues": [{"name": null}]}
                },
                {"name": "No Venues", "id": "E2", "dates": null, "_embedded": null}
            ]}}"#,
        )
        .expect("nulls must not fail the decode");

        let events = result.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "");
        assert_eq!(events[0].start_date(), "2024-05-01");
        assert_eq!(events[0].start_time(), "");
        assert_eq!(events[0].summary_date(), "2024-05-01");
        assert!(events[0].price_ranges.is_empty());
        assert_eq!(events[0].first_venue_name(), "");
        assert_eq!(events[1].start_date(), "");
        assert_eq!(events[1].first_venue_name(), "");
    }

    #[test]
    fn test_null_embedded_has_no_events() {
        let result: EventSearchResult = serde_json::from_str(r#"{"_embedded": null}"#).unwrap();

        assert!(result.events().is_empty());
    }

    #[test]
    fn test_record_uses_store_attribute_names() {
        let record = EventRecord {
            event_name: "Jazz Night".to_owned(),
            id: "E1".to_owned(),
            venue_name: "Hall A".to_owned(),
            start_time: "19:30:00".to_owned(),
            start_date: "2024-05-01".to_owned(),
            city: "Ottawa".to_owned(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "EventName": "Jazz Night",
                "ID": "E1",
                "VenueName": "Hall A",
                "StartDateTime": "19:30:00",
                "StartDate": "2024-05-01",
                "City": "Ottawa",
            })
        );
    }
}
