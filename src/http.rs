use crate::{
    config::Config,
    error::ProviderError,
    metrics::{
        METRICS_HANDLE,
        http::{http_request_timer, record_http_request},
    },
    resource::{
        ProviderContext, ResourceData,
        alert::{self, RESOURCE_TYPE},
    },
    schema::{Diagnostic, Schema, kibana_alert_schema},
};
use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};

type SharedContext = State<Arc<ProviderContext>>;

/// Creates an Axum Web Server
pub async fn create_server(config: Config, ctx: ProviderContext) -> anyhow::Result<()> {
    tracing::info!("Starting the web server");

    let app = create_router(Arc::new(ctx));

    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Unable to parse address: {e}"))?;

    tracing::info!("Listening on {}", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}

/// Create the router for the application
pub fn create_router(ctx: Arc<ProviderContext>) -> Router {
    Router::new()
        .route("/alive", get(alive))
        .route("/metrics", get(metrics))
        .route("/v1/schema", get(schema))
        .route(&resource_path("validate"), post(validate))
        .route(&resource_path("create"), post(create))
        .route(&resource_path("read"), post(read))
        .route(&resource_path("update"), post(update))
        .route(&resource_path("delete"), post(delete))
        .route(&resource_path("import"), post(import))
        .with_state(ctx)
}

fn resource_path(operation: &str) -> String {
    format!("/v1/resources/{RESOURCE_TYPE}/{operation}")
}

/// A resource error rendered as a JSON body
pub struct ApiError(ProviderError);

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ProviderError::NotFound(_) => StatusCode::NOT_FOUND,
            ProviderError::ClientTypeUnsupported(_)
            | ProviderError::UnsupportedVersion { .. }
            | ProviderError::InvalidVersion { .. } => StatusCode::PRECONDITION_FAILED,
            ProviderError::MalformedSchedule(_)
            | ProviderError::ActionMapping { .. }
            | ProviderError::InvalidAttribute { .. }
            | ProviderError::Encode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProviderError::Transport { .. }
            | ProviderError::UnexpectedStatus { .. }
            | ProviderError::Decode { .. } => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// This is the handler for the /alive path
async fn alive() -> StatusCode {
    record_http_request("/alive");
    let _timer = http_request_timer("/alive");

    StatusCode::OK
}

/// This is the handler for the /metrics path
#[tracing::instrument]
async fn metrics() -> impl IntoResponse {
    record_http_request("/metrics");
    let _timer = http_request_timer("/metrics");

    match METRICS_HANDLE.get().and_then(Option::as_ref) {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get the metrics handle".to_string(),
        ),
    }
}

async fn schema() -> Json<Schema> {
    record_http_request("/v1/schema");
    let _timer = http_request_timer("/v1/schema");

    Json(kibana_alert_schema())
}

async fn validate(Json(d): Json<ResourceData>) -> Json<Vec<Diagnostic>> {
    let endpoint = resource_path("validate");
    record_http_request(&endpoint);
    let _timer = http_request_timer(&endpoint);

    Json(kibana_alert_schema().validate(d.attributes()))
}

async fn create(
    State(ctx): SharedContext,
    Json(mut d): Json<ResourceData>,
) -> Result<Json<ResourceData>, ApiError> {
    let endpoint = resource_path("create");
    record_http_request(&endpoint);
    let _timer = http_request_timer(&endpoint);

    alert::create(&mut d, &ctx).await?;
    Ok(Json(d))
}

async fn read(
    State(ctx): SharedContext,
    Json(mut d): Json<ResourceData>,
) -> Result<Json<ResourceData>, ApiError> {
    let endpoint = resource_path("read");
    record_http_request(&endpoint);
    let _timer = http_request_timer(&endpoint);

    alert::read(&mut d, &ctx).await?;
    Ok(Json(d))
}

async fn update(
    State(ctx): SharedContext,
    Json(mut d): Json<ResourceData>,
) -> Result<Json<ResourceData>, ApiError> {
    let endpoint = resource_path("update");
    record_http_request(&endpoint);
    let _timer = http_request_timer(&endpoint);

    alert::update(&mut d, &ctx).await?;
    Ok(Json(d))
}

async fn delete(
    State(ctx): SharedContext,
    Json(mut d): Json<ResourceData>,
) -> Result<Json<ResourceData>, ApiError> {
    let endpoint = resource_path("delete");
    record_http_request(&endpoint);
    let _timer = http_request_timer(&endpoint);

    alert::delete(&mut d, &ctx).await?;
    Ok(Json(d))
}

#[derive(Deserialize)]
struct ImportRequest {
    id: String,
}

async fn import(
    State(ctx): SharedContext,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ResourceData>, ApiError> {
    let endpoint = resource_path("import");
    record_http_request(&endpoint);
    let _timer = http_request_timer(&endpoint);

    Ok(Json(alert::import(&request.id, &ctx).await?))
}
