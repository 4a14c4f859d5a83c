use crate::{
    client::{ClientVariant, KibanaApi},
    error::{ProviderError, Result},
};
use semver::Version;
use serde::Deserialize;

/// Oldest Kibana release that exposes the alerting API used here
pub const MINIMUM_KIBANA_VERSION: Version = Version::new(7, 11, 0);

/// Subset of the `/api/status` response
#[derive(Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub version: StatusVersion,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StatusVersion {
    pub number: String,
}

/// Parse a version string as reported by the server
pub fn parse_version(version: &str) -> Result<Version> {
    Version::parse(version.trim()).map_err(|source| ProviderError::InvalidVersion {
        version: version.to_string(),
        source,
    })
}

/// Make sure the client can reach the alert API before issuing any alert request
#[tracing::instrument(skip(client))]
pub async fn ensure_supported(client: &dyn KibanaApi) -> Result<Version> {
    match client.variant() {
        ClientVariant::Elastic7 => {}
        other => return Err(ProviderError::ClientTypeUnsupported(other)),
    }

    let current = client.server_version().await?;
    if current < MINIMUM_KIBANA_VERSION {
        return Err(ProviderError::UnsupportedVersion {
            current,
            minimum: MINIMUM_KIBANA_VERSION,
        });
    }

    tracing::debug!("Kibana version {} supports alerts", current);

    Ok(current)
}
