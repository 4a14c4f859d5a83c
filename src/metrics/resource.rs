use crate::metrics::{Status, Timer};
use metrics::{counter, describe_counter, describe_histogram};

/// Register the metrics for the application
pub(super) fn register_metrics() {
    // Count of resource callbacks, labeled with the operation and status (success or failure).
    describe_counter!(
        "resource_operations_total",
        "Total number of resource operations"
    );

    describe_histogram!(
        "resource_operation_duration_seconds",
        "Duration of resource operations in seconds"
    );
}

/// Record a finished resource operation
pub fn record_operation(operation: Operation, status: Status) {
    counter!(
        "resource_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Create a timer for a resource operation
pub fn operation_timer(operation: Operation) -> Timer {
    Timer::new("resource_operation_duration_seconds").with_label("operation", operation.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Import => write!(f, "import"),
        }
    }
}
