use crate::client::ClientVariant;
use semver::Version;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The configured client variant cannot reach the Kibana alert API
    #[error("Kibana alert endpoint is not available through the {0} client")]
    ClientTypeUnsupported(ClientVariant),

    /// The server is older than the minimum supported version
    #[error("Kibana alert endpoint only available from Kibana >= {minimum}, got version {current}")]
    UnsupportedVersion { current: Version, minimum: Version },

    /// The server reported a version string that is not semver
    #[error("Invalid server version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// The schedule list did not contain exactly one entry
    #[error("Schedule must contain exactly one entry, got {0}")]
    MalformedSchedule(usize),

    /// An element of the actions list could not be mapped
    #[error("Invalid action at index {index}: {message}")]
    ActionMapping { index: usize, message: String },

    /// An attribute held a value of the wrong shape
    #[error("Invalid value for attribute '{key}': {message}")]
    InvalidAttribute { key: String, message: String },

    /// The request never produced a response
    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Kibana returned HTTP {status} for {path}: {body}")]
    UnexpectedStatus {
        path: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The server reported that the object does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    /// Whether the server signalled absence of the requested object
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
