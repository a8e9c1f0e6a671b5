//! Model loading, inference and HTTP serving
//!
//! - Artifact capability behind the [`Regressor`] trait
//! - Fitted scaling + one-hot + linear regression pipeline
//! - One-time artifact loading with fail-fast semantics
//! - Slot-guarded single-row prediction
//! - HTTP endpoints over axum

pub mod inference;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod serving;

pub use inference::{round_to_cents, ModelSlot, Prediction, PredictionService};
pub use loader::{ArtifactLoader, LoadedModel};
pub use model::{Cell, ModelInfo, Regressor, TabularRow, COLUMN_EDAD, COLUMN_UBICACION};
pub use pipeline::{HandleUnknown, LinearRegression, OneHotEncoder, PipelineArtifact, StandardScaler};
pub use serving::{router, AppState};
