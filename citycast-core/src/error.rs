use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success status for the city query.
    #[error("city not found (provider returned {status}): {body}")]
    NotFound { status: StatusCode, body: String },

    #[error(
        "no OpenWeather API key configured; run `citycast configure` or set OPENWEATHER_API_KEY"
    )]
    MissingApiKey,

    #[error("failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid weather provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

/// Failure to persist a preference.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}
