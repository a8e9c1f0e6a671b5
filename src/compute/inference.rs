// Model slot and single-row prediction

use super::loader::LoadedModel;
use super::model::{ModelInfo, Regressor, TabularRow};
use crate::error::{InferenceFailure, PricingError, Result};
use crate::observability;
use crate::validation::PredictionInput;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Lifecycle of the process-wide model reference.
///
/// Set once during startup and never changed afterwards. `Loaded` and
/// `Failed` are terminal.
#[derive(Debug, Clone)]
pub enum ModelSlot {
    /// Startup has not run
    Unloaded,
    /// Artifact available
    Loaded(LoadedModel),
    /// Startup ran and the artifact could not be loaded
    Failed(String),
}

impl ModelSlot {
    /// Gets the regressor, or `ServiceUnavailable` when there is none
    pub fn regressor(&self) -> Result<&Arc<dyn Regressor>> {
        match self {
            ModelSlot::Loaded(model) => Ok(&model.regressor),
            ModelSlot::Unloaded => Err(PricingError::ServiceUnavailable(
                "model artifact has not been loaded".to_string(),
            )),
            ModelSlot::Failed(reason) => Err(PricingError::ServiceUnavailable(format!(
                "model artifact failed to load: {}",
                reason
            ))),
        }
    }

    /// Loaded model description
    pub fn info(&self) -> Option<&ModelInfo> {
        match self {
            ModelSlot::Loaded(model) => Some(&model.info),
            _ => None,
        }
    }

    /// Whether predictions can be served
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }

    /// Short state name
    pub fn state_name(&self) -> &'static str {
        match self {
            ModelSlot::Unloaded => "unloaded",
            ModelSlot::Loaded(_) => "loaded",
            ModelSlot::Failed(_) => "failed",
        }
    }
}

/// Prediction response body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted price, rounded to two decimals
    pub precio_predicho: f64,
}

/// Rounds to two decimal places.
///
/// Rounding is decided on the exact binary value with ties to even, so
/// `100000.125` becomes `100000.12` while `2.675` (stored just below the
/// half) becomes `2.67`.
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Runs validated inputs through the loaded model
#[derive(Debug, Clone)]
pub struct PredictionService {
    slot: Arc<ModelSlot>,
}

impl PredictionService {
    /// Creates a service over a slot
    pub fn new(slot: ModelSlot) -> Self {
        Self { slot: Arc::new(slot) }
    }

    /// Service whose slot was never filled
    pub fn unloaded() -> Self {
        Self::new(ModelSlot::Unloaded)
    }

    /// Service over a loaded model
    pub fn loaded(model: LoadedModel) -> Self {
        Self::new(ModelSlot::Loaded(model))
    }

    /// The underlying slot
    pub fn slot(&self) -> &ModelSlot {
        &self.slot
    }

    /// Predicts the price for one input.
    ///
    /// # Errors
    /// `ServiceUnavailable` when no model is loaded, `Inference` when the
    /// model rejects the row or produces a non-finite value.
    pub fn predict(&self, input: &PredictionInput) -> Result<Prediction> {
        let start = Instant::now();
        let result = self.run(input);
        let latency = start.elapsed();

        match &result {
            Ok(prediction) => {
                debug!(
                    edad = input.edad,
                    ubicacion = %input.ubicacion,
                    precio_predicho = prediction.precio_predicho,
                    latency_us = latency.as_micros() as u64,
                    "Prediction served"
                );
                observability::record_prediction("success", latency);
            }
            Err(e) => {
                warn!(
                    edad = input.edad,
                    ubicacion = %input.ubicacion,
                    error = %e,
                    "Prediction failed"
                );
                observability::record_prediction(e.kind(), latency);
            }
        }

        result
    }

    fn run(&self, input: &PredictionInput) -> Result<Prediction> {
        let regressor = self.slot.regressor()?;
        let row = TabularRow::from_input(input);
        let raw = regressor.predict(&row)?;

        if !raw.is_finite() {
            return Err(InferenceFailure::NonFinite(raw).into());
        }
        let rounded = round_to_cents(raw);
        if !rounded.is_finite() {
            return Err(InferenceFailure::NonFinite(rounded).into());
        }

        Ok(Prediction { precio_predicho: rounded })
    }
}
