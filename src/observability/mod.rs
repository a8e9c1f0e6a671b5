//! Observability for the pricing service.
//!
//! Provides logging initialization and prediction metrics. Metrics go
//! through the `metrics` facade; without an installed recorder they are
//! no-ops.

use crate::config::ObservabilityConfig;
use crate::error::{PricingError, Result};
use metrics::{counter, histogram};
use std::time::Duration;
use ::tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| PricingError::InvalidConfig {
            field: "observability.log_level".to_string(),
            reason: e.to_string(),
        })?;

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| PricingError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| PricingError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Record one prediction attempt.
pub fn record_prediction(outcome: &str, latency: Duration) {
    counter!("pricing_predictions_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("pricing_prediction_latency_us").record(latency.as_micros() as f64);
}

/// Record an HTTP response.
pub fn record_http_response(route: &'static str, status: u16) {
    counter!(
        "pricing_http_responses_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}
