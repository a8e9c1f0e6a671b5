// Fitted preprocessing + linear regression pipeline

use super::model::{ModelInfo, Regressor, TabularRow};
use crate::error::InferenceFailure;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Artifact format versions this build understands
pub const SUPPORTED_FORMAT_VERSIONS: &[u32] = &[1];

/// Standard scaling of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Input column name
    pub column: String,
    /// Fitted mean
    pub mean: f64,
    /// Fitted standard deviation; zero means a constant feature
    pub scale: f64,
}

impl StandardScaler {
    /// Scales a raw value
    pub fn transform(&self, x: f64) -> f64 {
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        (x - self.mean) / scale
    }
}

/// Policy for categories not seen during fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Fail the prediction
    #[default]
    Error,
    /// Encode as all zeros
    Ignore,
}

/// One-hot encoding of one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Input column name
    pub column: String,
    /// Fitted categories, in output order
    pub categories: Vec<String>,
    /// Unknown category policy
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Writes the encoding of `value` into `out`, which must be
    /// `categories.len()` long and zeroed.
    pub fn transform_into(&self, value: &str, out: &mut [f64]) -> Result<(), InferenceFailure> {
        match self.categories.iter().position(|c| c == value) {
            Some(idx) => {
                out[idx] = 1.0;
                Ok(())
            }
            None => match self.handle_unknown {
                HandleUnknown::Ignore => Ok(()),
                HandleUnknown::Error => Err(InferenceFailure::UnknownCategory {
                    column: self.column.clone(),
                    value: value.to_string(),
                }),
            },
        }
    }
}

/// Ordinary least squares regression head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Coefficients in feature order
    pub coefficients: Vec<f64>,
    /// Intercept
    pub intercept: f64,
}

impl LinearRegression {
    /// Predicts for one feature vector
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Complete fitted pipeline as serialized by the training export.
///
/// Feature order after preprocessing is the scaled numeric column followed
/// by the one-hot block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    /// Artifact format version
    pub format_version: u32,
    /// Model name
    #[serde(default = "default_name")]
    pub name: String,
    /// Numeric preprocessing
    pub numeric: StandardScaler,
    /// Categorical preprocessing
    pub categorical: OneHotEncoder,
    /// Regression head
    pub regressor: LinearRegression,
}

fn default_name() -> String {
    "pipeline".to_string()
}

impl PipelineArtifact {
    /// Number of features fed to the regressor
    pub fn n_features(&self) -> usize {
        1 + self.categorical.categories.len()
    }

    /// Checks internal consistency. An artifact that fails here would
    /// produce wrong predictions rather than errors, so it is rejected at
    /// load time.
    pub fn check(&self) -> Result<(), String> {
        if !SUPPORTED_FORMAT_VERSIONS.contains(&self.format_version) {
            return Err(format!(
                "unsupported format_version {} (supported: {:?})",
                self.format_version, SUPPORTED_FORMAT_VERSIONS
            ));
        }

        if self.numeric.column.is_empty() || self.categorical.column.is_empty() {
            return Err("column names must not be empty".to_string());
        }
        if self.numeric.column == self.categorical.column {
            return Err(format!(
                "numeric and categorical steps both read column '{}'",
                self.numeric.column
            ));
        }

        if !self.numeric.mean.is_finite() || !self.numeric.scale.is_finite() {
            return Err("scaler parameters must be finite".to_string());
        }
        if self.numeric.scale < 0.0 {
            return Err(format!("scaler scale must be >= 0, got {}", self.numeric.scale));
        }

        if self.categorical.categories.is_empty() {
            return Err("encoder has no categories".to_string());
        }
        let mut seen = HashSet::new();
        for category in &self.categorical.categories {
            if !seen.insert(category.as_str()) {
                return Err(format!("duplicate category '{}'", category));
            }
        }

        if self.regressor.coefficients.len() != self.n_features() {
            return Err(format!(
                "regressor has {} coefficients but preprocessing yields {} features",
                self.regressor.coefficients.len(),
                self.n_features()
            ));
        }
        if !self.regressor.intercept.is_finite()
            || self.regressor.coefficients.iter().any(|c| !c.is_finite())
        {
            return Err("regressor parameters must be finite".to_string());
        }

        Ok(())
    }

    /// Runs preprocessing for one row
    pub fn transform(&self, row: &TabularRow) -> Result<Vec<f64>, InferenceFailure> {
        let mut features = vec![0.0; self.n_features()];
        features[0] = self.numeric.transform(row.numeric(&self.numeric.column)?);
        let value = row.text(&self.categorical.column)?;
        self.categorical.transform_into(value, &mut features[1..])?;
        Ok(features)
    }
}

impl Regressor for PipelineArtifact {
    fn predict(&self, row: &TabularRow) -> Result<f64, InferenceFailure> {
        let features = self.transform(row)?;
        let y = self.regressor.predict(&features);
        if !y.is_finite() {
            return Err(InferenceFailure::NonFinite(y));
        }
        Ok(y)
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            format_version: self.format_version,
            columns: vec![self.numeric.column.clone(), self.categorical.column.clone()],
            categories: self.categorical.categories.clone(),
            n_features: self.n_features(),
        }
    }
}
