use crate::{
    client::{ApiRequest, ApiResponse, ClientVariant, KibanaApi},
    config::Kibana as KibanaConfig,
    error::{ProviderError, Result},
    kibana::version::StatusResponse,
    metrics::external::{self, Failure},
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url, header::CONTENT_TYPE};
use semver::Version;
use std::time::Duration;

pub mod alert;
pub mod api;
pub mod version;

pub struct Kibana {
    config: KibanaConfig,
    base_url: Url,
    client: reqwest::Client,
}

impl Kibana {
    /// Create a new Kibana instance
    pub fn new(config: KibanaConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.url)?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!("Kibana URL '{}' cannot be a base", config.url));
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Build the full URL for a request, percent-encoding each segment
    fn url_for(&self, segments: &[String]) -> Url {
        let mut url = self.base_url.clone();

        // Checked in `new`, the base URL always accepts path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }
}

#[async_trait]
impl KibanaApi for Kibana {
    fn variant(&self) -> ClientVariant {
        self.config.client
    }

    #[tracing::instrument(skip(self))]
    async fn server_version(&self) -> Result<Version> {
        tracing::info!("Fetching server version from Kibana");

        let request = ApiRequest::new(Method::GET, ["api", "status"]);
        let path = request.path();
        let response = self.perform_request(request).await?;

        let status: StatusResponse = serde_json::from_str(&response.body)
            .map_err(|source| ProviderError::Decode { path, source })?;

        version::parse_version(&status.version.number)
    }

    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path()))]
    async fn perform_request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path();
        let _timer = external::request_timer(&request.method);

        let mut builder = self
            .client
            .request(request.method.clone(), self.url_for(&request.segments))
            .header("kbn-xsrf", "true");

        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_ref());
        }

        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|source| {
            external::record_request_failure(&request.method, Failure::Transport);
            ProviderError::Transport {
                path: path.clone(),
                source,
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| {
                external::record_request_failure(&request.method, Failure::Transport);
                ProviderError::Transport {
                    path: path.clone(),
                    source,
                }
            })?;

        if status == StatusCode::NOT_FOUND {
            external::record_request_failure(&request.method, Failure::NotFound);
            return Err(ProviderError::NotFound(path));
        }

        if !status.is_success() {
            tracing::error!("Kibana returned HTTP {} for {}", status, path);
            external::record_request_failure(&request.method, Failure::Status);

            return Err(ProviderError::UnexpectedStatus {
                path,
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> KibanaConfig {
        KibanaConfig {
            url: url.to_string(),
            username: None,
            password: None,
            insecure: false,
            client: ClientVariant::Elastic7,
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let kibana = Kibana::new(config("http://localhost:5601")).unwrap();
        let url = kibana.url_for(&["api".to_string(), "alerts".to_string(), "a b/c".to_string()]);

        assert_eq!(url.as_str(), "http://localhost:5601/api/alerts/a%20b%2Fc");
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let kibana = Kibana::new(config("https://example.com/kibana/")).unwrap();
        let url = kibana.url_for(&["api".to_string(), "status".to_string()]);

        assert_eq!(url.as_str(), "https://example.com/kibana/api/status");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(Kibana::new(config("mailto:ops@example.com")).is_err());
        assert!(Kibana::new(config("not a url")).is_err());
    }
}
