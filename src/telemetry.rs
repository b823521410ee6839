use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging for the desk core.
///
/// JSON output is meant for log shippers; the plain layer for local
/// runs. The env filter still wins over the configured level so
/// `RUST_LOG` works as usual.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    tracing::info!("hostel-desk telemetry initialized");
    Ok(())
}

/// Correlation id for linking the log lines of one operation.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span carrying the common fields of a desk operation.
pub fn desk_span(operation: &str, actor_id: &str, entity_id: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "desk_operation",
        operation = operation,
        actor.id = actor_id,
        entity.id = entity_id,
        correlation.id = %generate_correlation_id(),
    )
}
