//! Error types for the pricing service.
//!
//! This module provides a unified error type [`PricingError`] for all service
//! operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Request**: malformed client input ([`PricingError::Validation`]).
//! - **Startup**: the artifact is absent or cannot be decoded. These are fatal
//!   and stop the process from reaching the serving state.
//! - **Runtime**: the model slot is not loaded, or the artifact failed while
//!   computing a prediction for a well-formed input.
//! - **Ambient**: configuration, I/O, serialization and network failures.
//!
//! # Example
//!
//! ```rust
//! use pricing::error::PricingError;
//!
//! let err = PricingError::Validation(Vec::new());
//! assert_eq!(err.status_code(), 422);
//!
//! let err = PricingError::ServiceUnavailable("model not loaded".into());
//! assert_eq!(err.status_code(), 503);
//! assert!(!err.is_startup_fatal());
//! ```

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// One field-level validation problem, in the shape clients of the
/// reference validation layer already parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Machine-readable error type (`missing`, `int_parsing`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Location of the offending value, e.g. `["body", "edad"]`.
    pub loc: Vec<String>,
    /// Human-readable message.
    pub msg: String,
    /// The rejected input value, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
}

impl FieldError {
    /// Create an error located at `body.<field>`.
    pub fn at_field(
        field: &str,
        kind: impl Into<String>,
        msg: impl Into<String>,
        input: Option<serde_json::Value>,
    ) -> Self {
        Self {
            kind: kind.into(),
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            input,
        }
    }

    /// Create an error about the request body as a whole.
    pub fn at_body(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            loc: vec!["body".to_string()],
            msg: msg.into(),
            input: None,
        }
    }

    /// The field this error refers to, if it is field-scoped.
    pub fn field(&self) -> Option<&str> {
        self.loc.get(1).map(String::as_str)
    }
}

/// Failure raised by the artifact while computing a prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceFailure {
    #[error("column '{0}' is missing from the input row")]
    MissingColumn(String),

    #[error("column '{column}' has type {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("found unknown category '{value}' in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    #[error("prediction is not a finite number: {0}")]
    NonFinite(f64),
}

/// Main error type for pricing service operations.
#[derive(Error, Debug)]
pub enum PricingError {
    // Request errors
    #[error("Validation error: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    // Startup errors
    #[error("Model artifact not found at {}", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Model artifact at {} is corrupt: {reason}", .path.display())]
    CorruptArtifact { path: PathBuf, reason: String },

    // Runtime errors
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceFailure),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.loc.join("."), e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PricingError {
    /// HTTP status matching the error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            PricingError::Validation(_) => 422,
            PricingError::ServiceUnavailable(_) => 503,
            PricingError::MissingArtifact { .. } | PricingError::CorruptArtifact { .. } => 503,
            _ => 500,
        }
    }

    /// Stable machine-readable tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::Validation(_) => "validation_error",
            PricingError::MissingArtifact { .. } => "missing_artifact",
            PricingError::CorruptArtifact { .. } => "corrupt_artifact",
            PricingError::ServiceUnavailable(_) => "service_unavailable",
            PricingError::Inference(_) => "inference_error",
            PricingError::Config(_) | PricingError::InvalidConfig { .. } => "config_error",
            PricingError::Io(_) => "io_error",
            PricingError::Serialization(_) => "serialization_error",
            PricingError::Network(_) => "network_error",
            PricingError::Internal(_) => "internal_error",
        }
    }

    /// Whether the error must stop the process before it starts serving.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            PricingError::MissingArtifact { .. }
                | PricingError::CorruptArtifact { .. }
                | PricingError::Config(_)
                | PricingError::InvalidConfig { .. }
        )
    }

    /// Field-level details, for validation errors.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            PricingError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::Serialization(e.to_string())
    }
}

/// Result type alias for pricing service operations.
pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PricingError::Validation(vec![]).status_code(), 422);
        assert_eq!(PricingError::ServiceUnavailable("x".into()).status_code(), 503);
        assert_eq!(
            PricingError::Inference(InferenceFailure::NonFinite(f64::NAN)).status_code(),
            500
        );
        assert_eq!(PricingError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_startup_fatal() {
        let missing = PricingError::MissingArtifact { path: "m.json".into() };
        let corrupt = PricingError::CorruptArtifact {
            path: "m.json".into(),
            reason: "bad".into(),
        };
        assert!(missing.is_startup_fatal());
        assert!(corrupt.is_startup_fatal());
        assert!(!PricingError::ServiceUnavailable("x".into()).is_startup_fatal());
        assert!(!PricingError::Validation(vec![]).is_startup_fatal());
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = PricingError::Validation(vec![
            FieldError::at_field("edad", "missing", "Field required", None),
            FieldError::at_field("ubicacion", "string_type", "Input should be a valid string", None),
        ]);
        let text = err.to_string();
        assert!(text.contains("body.edad: Field required"));
        assert!(text.contains("body.ubicacion"));
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.field_errors()[0].field(), Some("edad"));
    }

    #[test]
    fn test_inference_cause_is_kept() {
        let err = PricingError::from(InferenceFailure::UnknownCategory {
            column: "Ubicacion".into(),
            value: "Z".into(),
        });
        assert_eq!(err.kind(), "inference_error");
        assert!(err.to_string().contains("'Z'"));
    }

    #[test]
    fn test_field_error_serialization() {
        let err = FieldError::at_field(
            "edad",
            "int_parsing",
            "Input should be a valid integer",
            Some(serde_json::json!("thirty")),
        );
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["type"], "int_parsing");
        assert_eq!(value["loc"], serde_json::json!(["body", "edad"]));
        assert_eq!(value["input"], "thirty");

        let body = FieldError::at_body("json_invalid", "JSON decode error");
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("input").is_none());
    }
}
