// Test fixtures: artifacts on disk and stub regressors

use pricing::compute::{
    AppState, ArtifactLoader, HandleUnknown, LinearRegression, ModelInfo, OneHotEncoder,
    PipelineArtifact, PredictionService, Regressor, StandardScaler, TabularRow,
};
use pricing::error::InferenceFailure;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Pipeline with easy-to-check arithmetic.
///
/// `Edad` is scaled by `(x - 40) / 10` with weight 1000; categories A, B, C
/// add -5000, 0 and +5000 on top of a 100000 intercept.
pub fn reference_artifact() -> PipelineArtifact {
    PipelineArtifact {
        format_version: 1,
        name: "precio-lineal".to_string(),
        numeric: StandardScaler {
            column: "Edad".to_string(),
            mean: 40.0,
            scale: 10.0,
        },
        categorical: OneHotEncoder {
            column: "Ubicacion".to_string(),
            categories: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            handle_unknown: HandleUnknown::Error,
        },
        regressor: LinearRegression {
            coefficients: vec![1000.0, -5000.0, 0.0, 5000.0],
            intercept: 100000.0,
        },
    }
}

/// Temporary directory holding artifact files.
pub struct ArtifactDir {
    pub dir: TempDir,
}

impl ArtifactDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path for a file inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write an artifact as JSON and return its path.
    pub fn write_artifact(&self, name: &str, artifact: &PipelineArtifact) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, serde_json::to_vec_pretty(artifact).unwrap())
            .expect("Failed to write artifact");
        path
    }

    /// Write arbitrary bytes and return the path.
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("Failed to write file");
        path
    }
}

/// Regressor that always returns the same value and counts calls.
pub struct FixedRegressor {
    value: f64,
    calls: AtomicUsize,
}

impl FixedRegressor {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Regressor for FixedRegressor {
    fn predict(&self, row: &TabularRow) -> Result<f64, InferenceFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // The rows handed to the artifact must carry the training-time names.
        row.numeric("Edad")?;
        row.text("Ubicacion")?;
        Ok(self.value)
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: "fixed".to_string(),
            format_version: 1,
            columns: vec!["Edad".to_string(), "Ubicacion".to_string()],
            categories: Vec::new(),
            n_features: 2,
        }
    }
}

/// State over a stub regressor.
pub fn stub_state(value: f64) -> (AppState, Arc<FixedRegressor>) {
    let stub = Arc::new(FixedRegressor::new(value));
    let model = ArtifactLoader::from_regressor(Path::new("stub"), stub.clone());
    (AppState::new(PredictionService::loaded(model)), stub)
}

/// State over the reference pipeline, loaded from disk.
pub fn pipeline_state(dir: &ArtifactDir) -> AppState {
    let path = dir.write_artifact("pipeline_modelo_produccion.json", &reference_artifact());
    let model = ArtifactLoader::load(&path).expect("reference artifact should load");
    AppState::new(PredictionService::loaded(model))
}

/// State whose startup hook never ran.
pub fn unloaded_state() -> AppState {
    AppState::new(PredictionService::unloaded())
}
