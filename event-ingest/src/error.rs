use thiserror::Error;

use crate::store::StoreError;

/// Broad classes of pipeline failure, used for logging and for deciding
/// whether a failure is a startup problem or a per-tick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Transport,
    Decode,
    Persistence,
}

/// Enumeration of errors that end a single ingest run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Cannot find env variable: {0}")]
    MissingCredential(&'static str),
    #[error("invalid event source url: {0}")]
    InvalidUrl(url::ParseError),
    #[error("Cannot complete http GET request: {0}")]
    Request(reqwest::Error),
    #[error("Cannot read the returned json: {0}")]
    ReadBody(reqwest::Error),
    #[error("Cannot properly unmarshal the ticketmaster data: {0}")]
    Decode(serde_json::Error),
    #[error("Got error calling PutItem for event {id:?}: {error}")]
    Persistence { id: String, error: StoreError },
    #[error("Something went wrong with the event store config: {0}")]
    StoreSetup(StoreError),
}

impl IngestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::MissingCredential(_)
            | IngestError::InvalidUrl(_)
            | IngestError::StoreSetup(_) => ErrorCategory::Configuration,
            IngestError::Request(_) | IngestError::ReadBody(_) => ErrorCategory::Transport,
            IngestError::Decode(_) => ErrorCategory::Decode,
            IngestError::Persistence { .. } => ErrorCategory::Persistence,
        }
    }

    /// Process exit status for an error that ends the process. Every fatal
    /// category currently shares status 1.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Transport | ErrorCategory::Decode => 1,
            ErrorCategory::Persistence => 1,
        }
    }
}
