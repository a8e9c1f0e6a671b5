//! Pricing - HTTP serving for a pre-fitted tabular price regression pipeline.
//!
//! The service loads one fitted pipeline artifact (standard scaling, one-hot
//! encoding and linear regression) at startup and answers `POST /predict`
//! with a price for an `(edad, ubicacion)` pair.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  HTTP: POST /predict | GET /model | GET /health | GET /ready│
//! ├─────────────────────────────────────────────────────────────┤
//! │  Validation: lax integer coercion, field-level errors       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Prediction: slot guard -> single-row input -> rounding     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Model slot: Unloaded | Loaded(artifact) | Failed           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use pricing::config::PricingConfig;
//!
//! #[tokio::main]
//! async fn main() -> pricing::Result<()> {
//!     let config = PricingConfig::development();
//!     pricing::run(config).await
//! }
//! ```

pub mod cli;
pub mod compute;
pub mod config;
pub mod error;
pub mod health;
pub mod observability;
pub mod shutdown;
pub mod validation;

// Re-exports
pub use error::{PricingError, Result};

use compute::{router, AppState, ArtifactLoader, ModelSlot, PredictionService};
use config::PricingConfig;
use shutdown::{ShutdownCoordinator, SignalHandler};
use std::future::IntoFuture;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Run the pricing server with the given configuration.
///
/// The artifact is loaded before the listener binds. With
/// `startup.fail_fast` (the default) a load failure is returned here and no
/// request is ever accepted.
pub async fn run(config: PricingConfig) -> Result<()> {
    observability::init(&config.observability)?;
    config.validate()?;

    info!(
        artifact = %config.model.artifact_path.display(),
        "Starting pricing service"
    );

    let state = startup(&config)?;

    let listener = TcpListener::bind(config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "Pricing server listening");

    let coordinator = ShutdownCoordinator::with_timeout(config.server.shutdown_timeout);
    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move {
        SignalHandler::new(signal_coordinator).run().await;
    });

    serve(listener, state, config.server.max_body_bytes, coordinator).await?;

    info!("Pricing service shutdown complete");
    Ok(())
}

/// Startup hook: load the artifact and build the handler state.
pub fn startup(config: &PricingConfig) -> Result<AppState> {
    let slot = match ArtifactLoader::load(&config.model.artifact_path) {
        Ok(model) => ModelSlot::Loaded(model),
        Err(e) if config.startup.fail_fast => {
            error!(error = %e, "Refusing to start without a valid model");
            return Err(e);
        }
        Err(e) => {
            warn!(error = %e, "Serving without a model; predictions will answer 503");
            ModelSlot::Failed(e.to_string())
        }
    };

    Ok(AppState::new(PredictionService::new(slot)))
}

/// Serve the API on `listener` until `coordinator` fires.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    max_body_bytes: usize,
    coordinator: ShutdownCoordinator,
) -> Result<()> {
    let app = router(state, max_body_bytes);

    let graceful = coordinator.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { graceful.wait_for_shutdown().await })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| PricingError::Network(e.to_string()))?;
        }
        _ = coordinator.grace_period_elapsed() => {
            warn!("Forcing shutdown with requests still in flight");
        }
    }

    Ok(())
}
