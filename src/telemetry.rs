use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))?;

    if observability.json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .with(filter)
            .try_init()?;
    }

    tracing::info!("Dramaflow telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one queue run
pub fn create_queue_span(label: &str, task_count: usize, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "task_queue",
        queue = label,
        task.count = task_count,
        correlation.id = correlation_id,
    )
}

/// Span covering one workflow operation on a variant
pub fn create_workflow_span(operation: &str, project_id: &str, variant_id: &str) -> tracing::Span {
    tracing::info_span!(
        "variant_workflow",
        operation = operation,
        project.id = project_id,
        variant.id = variant_id,
    )
}

pub fn shutdown_telemetry() {
    tracing::info!("Dramaflow telemetry shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique_uuids() {
        let a = generate_correlation_id();
        let b = generate_correlation_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
