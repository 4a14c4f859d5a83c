use crate::metrics::Timer;
use metrics::{counter, describe_counter, describe_histogram};
use reqwest::Method;

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Count of failed Kibana requests, labeled with the method and the kind of failure.
    describe_counter!(
        "kibana_request_failures_total",
        "Total number of failed requests to Kibana"
    );

    // Latency of Kibana requests in seconds, labeled by method.
    describe_histogram!(
        "kibana_request_duration_seconds",
        "Duration of requests to Kibana in seconds"
    );
}

/// Record a failed request to Kibana
pub fn record_request_failure(method: &Method, failure: Failure) {
    counter!(
        "kibana_request_failures_total",
        "method" => method.to_string(),
        "failure" => failure.to_string()
    )
    .increment(1);
}

/// Create a timer for a request to Kibana
pub fn request_timer(method: &Method) -> Timer {
    Timer::new("kibana_request_duration_seconds").with_label("method", method.to_string())
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Transport,
    NotFound,
    Status,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Transport => write!(f, "transport"),
            Failure::NotFound => write!(f, "not_found"),
            Failure::Status => write!(f, "status"),
        }
    }
}
