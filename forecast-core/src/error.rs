use reqwest::StatusCode;

use crate::provider::ProviderId;

/// Failure of a single forecast fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    Status { provider: ProviderId, status: StatusCode, body: String },

    #[error("{provider} response could not be parsed: {source}")]
    Parse {
        provider: ProviderId,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_parse(&self) -> bool {
        matches!(self, FetchError::Parse { .. })
    }
}

/// Why a location source could not produce a coordinate.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
    #[error("Location request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No location sources configured")]
    NoSources,
}
