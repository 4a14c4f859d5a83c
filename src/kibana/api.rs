use crate::{
    client::{ApiRequest, KibanaApi},
    error::{ProviderError, Result},
    kibana::alert::Alert,
};
use reqwest::Method;
use serde_json::Value;

const ALERT_PATH: [&str; 3] = ["api", "alerts", "alert"];

fn alert_request(method: Method, id: Option<&str>) -> ApiRequest {
    let mut request = ApiRequest::new(method, ALERT_PATH);
    if let Some(id) = id {
        request.segments.push(id.to_string());
    }
    request
}

fn decode_alert(path: String, body: &str) -> Result<Alert> {
    serde_json::from_str(body).map_err(|source| ProviderError::Decode { path, source })
}

/// Body of a successful create, the id is kept even when the alert does not decode
#[derive(Debug)]
pub struct CreatedAlert {
    pub id: Option<String>,
    pub alert: Result<Alert>,
}

/// Fetch a single alert by id
#[tracing::instrument(skip(client))]
pub async fn get_alert(client: &dyn KibanaApi, id: &str, space_id: Option<&str>) -> Result<Alert> {
    let request = alert_request(Method::GET, Some(id));
    let path = request.path();

    let response = client.perform_request(request).await?;

    decode_alert(path, &response.body)
}

/// Create an alert and return what Kibana stored
#[tracing::instrument(skip(client, alert), fields(name = %alert.name))]
pub async fn post_alert(
    client: &dyn KibanaApi,
    id: &str,
    space_id: Option<&str>,
    alert: &Alert,
) -> Result<CreatedAlert> {
    let body = serde_json::to_string(alert).map_err(ProviderError::Encode)?;
    tracing::debug!("Alert body: {}", body);

    let request = alert_request(Method::POST, None).with_body(body);
    let path = request.path();

    let response = client.perform_request(request).await?;

    let value: Value = serde_json::from_str(&response.body).map_err(|source| {
        ProviderError::Decode {
            path: path.clone(),
            source,
        }
    })?;
    let id = value.get("id").and_then(Value::as_str).map(str::to_string);
    let alert = serde_json::from_value(value).map_err(|source| ProviderError::Decode { path, source });

    Ok(CreatedAlert { id, alert })
}

/// Alerts are not updated in place yet, this always succeeds without a request
#[tracing::instrument(skip(_client))]
pub async fn put_alert(_client: &dyn KibanaApi, id: &str, space_id: Option<&str>) -> Result<()> {
    tracing::debug!("Skipping update of alert, updates are not sent to Kibana");

    Ok(())
}

/// Delete an alert by id
#[tracing::instrument(skip(client))]
pub async fn delete_alert(client: &dyn KibanaApi, id: &str, space_id: Option<&str>) -> Result<()> {
    client
        .perform_request(alert_request(Method::DELETE, Some(id)))
        .await?;

    Ok(())
}
