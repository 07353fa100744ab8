use std::fmt;

use crate::models::{EventRecord, EventSearchResult, RawEvent};

impl EventRecord {
    pub fn from_raw(event: &RawEvent, city: &str) -> Self {
        Self {
            event_name: event.name.clone(),
            id: event.id.clone(),
            venue_name: event.first_venue_name().to_owned(),
            start_time: event.start_time().to_owned(),
            start_date: event.start_date().to_owned(),
            city: city.to_owned(),
        }
    }
}

/// Flatten a search result into one record per event, in source order.
///
/// `city` is the human-readable name the query was made for, not its
/// transport form.
pub fn normalize(result: &EventSearchResult, city: &str) -> Vec<EventRecord> {
    result
        .events()
        .iter()
        .map(|event| EventRecord::from_raw(event, city))
        .collect()
}

impl EventSearchResult {
    /// A telemetry summary of this result, formatted only when displayed.
    pub fn summary(&self) -> Summary<'_> {
        Summary {
            events: self.events(),
        }
    }
}

/// One `"<name> <date>"` line per event, newline-joined.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    events: &'a [RawEvent],
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{} {}", event.name, event.summary_date())?;
        }
        Ok(())
    }
}
