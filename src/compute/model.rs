// Model capability and single-row tabular input

use crate::error::InferenceFailure;
use crate::validation::PredictionInput;
use serde::{Deserialize, Serialize};

/// Training-time column name for the integer feature.
pub const COLUMN_EDAD: &str = "Edad";
/// Training-time column name for the category feature.
pub const COLUMN_UBICACION: &str = "Ubicacion";

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Text(_) => "str",
        }
    }

    /// Numeric view of the cell, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(_) => None,
        }
    }

    /// Text view of the cell, if it has one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One row of named columns, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularRow {
    columns: Vec<(String, Cell)>,
}

impl TabularRow {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the row the pipeline was trained on from a validated input.
    ///
    /// Column names must match the training schema exactly; the artifact
    /// resolves features by name.
    pub fn from_input(input: &PredictionInput) -> Self {
        Self::new()
            .with(COLUMN_EDAD, Cell::Int(input.edad))
            .with(COLUMN_UBICACION, Cell::Text(input.ubicacion.clone()))
    }

    /// Adds or replaces a column
    pub fn with(mut self, name: &str, value: Cell) -> Self {
        match self.columns.iter().position(|(n, _)| n == name) {
            Some(idx) => self.columns[idx].1 = value,
            None => self.columns.push((name.to_string(), value)),
        }
        self
    }

    /// Looks up a column by name
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Typed numeric lookup
    pub fn numeric(&self, name: &str) -> Result<f64, InferenceFailure> {
        let cell = self
            .get(name)
            .ok_or_else(|| InferenceFailure::MissingColumn(name.to_string()))?;
        cell.as_f64().ok_or_else(|| InferenceFailure::TypeMismatch {
            column: name.to_string(),
            expected: "number",
            actual: cell.type_name(),
        })
    }

    /// Typed text lookup
    pub fn text(&self, name: &str) -> Result<&str, InferenceFailure> {
        let cell = self
            .get(name)
            .ok_or_else(|| InferenceFailure::MissingColumn(name.to_string()))?;
        cell.as_text().ok_or_else(|| InferenceFailure::TypeMismatch {
            column: name.to_string(),
            expected: "str",
            actual: cell.type_name(),
        })
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Description of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name
    pub name: String,
    /// Artifact format version
    pub format_version: u32,
    /// Input columns, in schema order
    pub columns: Vec<String>,
    /// Known categories for the categorical column
    pub categories: Vec<String>,
    /// Number of features after preprocessing
    pub n_features: usize,
}

/// Single-row inference capability of a fitted artifact.
///
/// Implementations are read-only after construction and shared across
/// request handlers.
pub trait Regressor: Send + Sync {
    /// Predicts the target for exactly one row
    fn predict(&self, row: &TabularRow) -> Result<f64, InferenceFailure>;

    /// Describes the model
    fn describe(&self) -> ModelInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_input_uses_training_columns() {
        let input = PredictionInput { edad: 35, ubicacion: "B".into() };
        let row = TabularRow::from_input(&input);

        let names: Vec<_> = row.column_names().collect();
        assert_eq!(names, vec!["Edad", "Ubicacion"]);
        assert_eq!(row.numeric(COLUMN_EDAD).unwrap(), 35.0);
        assert_eq!(row.text(COLUMN_UBICACION).unwrap(), "B");
    }

    #[test]
    fn test_row_replaces_existing_column() {
        let row = TabularRow::new()
            .with("Edad", Cell::Int(1))
            .with("Edad", Cell::Int(2));
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("Edad"), Some(&Cell::Int(2)));
    }

    #[test]
    fn test_typed_lookup_errors() {
        let row = TabularRow::new().with("Edad", Cell::Text("x".into()));

        assert_eq!(
            row.numeric("Edad"),
            Err(InferenceFailure::TypeMismatch {
                column: "Edad".into(),
                expected: "number",
                actual: "str",
            })
        );
        assert_eq!(
            row.text("Ubicacion"),
            Err(InferenceFailure::MissingColumn("Ubicacion".into()))
        );
        // Lowercase request field names are not the schema names.
        assert!(row.get("edad").is_none());
    }
}
