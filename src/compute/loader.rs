// One-time artifact loading

use super::model::{ModelInfo, Regressor};
use super::pipeline::PipelineArtifact;
use crate::error::{PricingError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// A successfully loaded artifact
#[derive(Clone)]
pub struct LoadedModel {
    /// Where the artifact was read from
    pub path: PathBuf,
    /// Shared inference handle
    pub regressor: Arc<dyn Regressor>,
    /// Description captured at load time
    pub info: ModelInfo,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("path", &self.path)
            .field("info", &self.info)
            .finish()
    }
}

/// Reads a serialized pipeline from disk.
///
/// Loading happens exactly once per process, before the listener binds.
/// There are no retries and no alternate locations.
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Loads and checks the artifact at `path`.
    ///
    /// # Errors
    /// `MissingArtifact` if nothing exists at `path`, `CorruptArtifact` if it
    /// cannot be read, decoded or fails the consistency checks.
    pub fn load(path: &Path) -> Result<LoadedModel> {
        let start = Instant::now();

        let result = Self::read(path);
        match &result {
            Ok(model) => info!(
                path = %path.display(),
                model = %model.info.name,
                features = model.info.n_features,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Model artifact loaded"
            ),
            Err(e) => error!(path = %path.display(), error = %e, "Model artifact failed to load"),
        }
        result
    }

    fn read(path: &Path) -> Result<LoadedModel> {
        if !path.exists() {
            return Err(PricingError::MissingArtifact { path: path.to_path_buf() });
        }

        let corrupt = |reason: String| PricingError::CorruptArtifact {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| corrupt(format!("read failed: {}", e)))?;
        let artifact: PipelineArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| corrupt(format!("decode failed: {}", e)))?;
        artifact.check().map_err(corrupt)?;

        Ok(Self::from_regressor(path, Arc::new(artifact)))
    }

    /// Wraps an already constructed regressor
    pub fn from_regressor(path: &Path, regressor: Arc<dyn Regressor>) -> LoadedModel {
        let info = regressor.describe();
        LoadedModel {
            path: path.to_path_buf(),
            regressor,
            info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::pipeline::tests::sample_artifact;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_vec(&sample_artifact()).unwrap()).unwrap();

        let loaded = ArtifactLoader::load(&path).unwrap();
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.info.name, "precio-lineal");
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match ArtifactLoader::load(&path) {
            Err(PricingError::MissingArtifact { path: p }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"\x80\x04\x95binary pickle").unwrap();

        let err = ArtifactLoader::load(&path).unwrap_err();
        assert!(matches!(err, PricingError::CorruptArtifact { .. }));
        assert!(err.is_startup_fatal());
    }

    #[test]
    fn test_inconsistent_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut artifact = sample_artifact();
        artifact.regressor.coefficients.truncate(2);
        std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

        match ArtifactLoader::load(&path) {
            Err(PricingError::CorruptArtifact { reason, .. }) => {
                assert!(reason.contains("coefficients"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_corrupt_not_missing() {
        let dir = tempdir().unwrap();
        let err = ArtifactLoader::load(dir.path()).unwrap_err();
        assert!(matches!(err, PricingError::CorruptArtifact { .. }));
    }
}
