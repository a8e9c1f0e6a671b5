//! Health and readiness probes.
//!
//! Liveness reports that the process is up along with the model state.
//! Readiness is only true once a model artifact is loaded.

use crate::compute::ModelSlot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy.
    Healthy,
    /// Service is unhealthy.
    Unhealthy,
}

impl HealthStatus {
    /// Combine two statuses (worst wins).
    pub fn combine(&self, other: &HealthStatus) -> HealthStatus {
        match (self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            _ => HealthStatus::Healthy,
        }
    }
}

/// Individual component health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name.
    pub name: String,
    /// Health status.
    pub status: HealthStatus,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Additional details.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}

impl ComponentHealth {
    /// Create a healthy component.
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
            message: None,
            details: HashMap::new(),
        }
    }

    /// Create an unhealthy component.
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            details: HashMap::new(),
        }
    }

    /// Add detail.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Health of the model slot.
    pub fn for_model(slot: &ModelSlot) -> Self {
        let component = match slot {
            ModelSlot::Loaded(model) => ComponentHealth::healthy("model")
                .with_detail("name", model.info.name.clone())
                .with_detail("path", model.path.display().to_string()),
            ModelSlot::Unloaded => ComponentHealth::unhealthy("model", "model artifact has not been loaded"),
            ModelSlot::Failed(reason) => ComponentHealth::unhealthy("model", reason.clone()),
        };
        component.with_detail("state", slot.state_name())
    }
}

/// Liveness response.
///
/// The process answers this while it runs, so the HTTP status is always 200;
/// `status` carries the aggregated component health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Individual component checks.
    pub components: Vec<ComponentHealth>,
    /// Timestamp.
    pub timestamp: String,
}

impl HealthResponse {
    /// Create a new health response.
    pub fn new(version: impl Into<String>, start_time: Instant) -> Self {
        Self {
            status: HealthStatus::Healthy,
            version: version.into(),
            uptime_seconds: start_time.elapsed().as_secs(),
            components: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Add a component check.
    pub fn add_component(&mut self, component: ComponentHealth) {
        self.status = self.status.combine(&component.status);
        self.components.push(component);
    }

    /// Build response from components.
    pub fn with_components(mut self, components: Vec<ComponentHealth>) -> Self {
        for component in components {
            self.add_component(component);
        }
        self
    }
}

/// Readiness check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready to accept traffic.
    pub ready: bool,
    /// Reason if not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReadinessResponse {
    /// Create a ready response.
    pub fn ready() -> Self {
        Self {
            ready: true,
            reason: None,
        }
    }

    /// Create a not-ready response.
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            reason: Some(reason.into()),
        }
    }

    /// Readiness derived from the model slot.
    pub fn for_model(slot: &ModelSlot) -> Self {
        match slot.regressor() {
            Ok(_) => Self::ready(),
            Err(e) => Self::not_ready(e.to_string()),
        }
    }

    /// HTTP status code for this response.
    pub fn status_code(&self) -> u16 {
        if self.ready {
            200
        } else {
            503
        }
    }
}
