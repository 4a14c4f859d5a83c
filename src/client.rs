use crate::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use semver::Version;
use serde::Deserialize;
use std::sync::Arc;

/// Flavour of the connected client handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientVariant {
    #[default]
    Elastic7,
    Elastic6,
    OpenSearch,
}

impl std::fmt::Display for ClientVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientVariant::Elastic7 => write!(f, "elastic7"),
            ClientVariant::Elastic6 => write!(f, "elastic6"),
            ClientVariant::OpenSearch => write!(f, "opensearch"),
        }
    }
}

/// A request against the Kibana API, addressed by path segments
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Path as sent on the wire, before percent-encoding
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// A successful response from the Kibana API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Capabilities the alert resource needs from a connected client.
///
/// Implementations map a 404 answer to `ProviderError::NotFound` and any other
/// non-success status to `ProviderError::UnexpectedStatus`.
#[async_trait]
pub trait KibanaApi: Send + Sync {
    /// Which client flavour this handle was configured as
    fn variant(&self) -> ClientVariant;

    /// Fetch the version reported by the server
    async fn server_version(&self) -> Result<Version>;

    /// Perform a single request and return the successful response
    async fn perform_request(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: KibanaApi + ?Sized> KibanaApi for Arc<T> {
    fn variant(&self) -> ClientVariant {
        (**self).variant()
    }

    async fn server_version(&self) -> Result<Version> {
        (**self).server_version().await
    }

    async fn perform_request(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).perform_request(request).await
    }
}
