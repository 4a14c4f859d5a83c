use crate::{
    client::{ApiRequest, ApiResponse, ClientVariant, KibanaApi},
    error::{ProviderError, Result},
    kibana::version::parse_version,
};
use async_trait::async_trait;
use reqwest::Method;
use semver::Version;
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub struct MockKibana {
    variant: ClientVariant,
    version: String,
    responses: Mutex<HashMap<(Method, String), std::result::Result<ApiResponse, u16>>>,
    requests: Mutex<Vec<ApiRequest>>,
    version_checks: AtomicUsize,
}

impl MockKibana {
    pub fn new(version: &str) -> Self {
        Self {
            variant: ClientVariant::Elastic7,
            version: version.to_string(),
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            version_checks: AtomicUsize::new(0),
        }
    }

    pub fn with_variant(mut self, variant: ClientVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Register a reply, `Err(status)` answers with that HTTP status
    pub fn with_response(
        self,
        method: Method,
        path: &str,
        response: std::result::Result<ApiResponse, u16>,
    ) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn version_checks(&self) -> usize {
        self.version_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KibanaApi for MockKibana {
    fn variant(&self) -> ClientVariant {
        self.variant
    }

    async fn server_version(&self) -> Result<Version> {
        self.version_checks.fetch_add(1, Ordering::SeqCst);
        parse_version(&self.version)
    }

    async fn perform_request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path();
        let method = request.method.clone();
        self.requests.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        let reply = responses
            .get(&(method.clone(), path.clone()))
            .cloned()
            .unwrap_or(Err(404));

        match reply {
            Ok(response) => {
                // A deleted alert is gone for later reads
                if method == Method::DELETE {
                    responses.remove(&(Method::GET, path));
                }
                Ok(response)
            }
            Err(404) => Err(ProviderError::NotFound(path)),
            Err(status) => Err(ProviderError::UnexpectedStatus {
                path,
                status,
                body: String::new(),
            }),
        }
    }
}
