//! Request validation for the prediction endpoint.
//!
//! Turns a raw request body into a [`PredictionInput`]. Integer coercion is
//! lax in the same way common Python validation layers are: `35`, `35.0`,
//! `"35"` and `"35.0"` are all accepted for `edad`, while `35.5`, `"35.5"`,
//! `"thirty"` and booleans are rejected. Extra fields are ignored.

use crate::error::{FieldError, PricingError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the integer field in the request body.
pub const FIELD_EDAD: &str = "edad";
/// Name of the category field in the request body.
pub const FIELD_UBICACION: &str = "ubicacion";

/// Normalized prediction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionInput {
    /// Age of the item or client.
    pub edad: i64,
    /// Location category label.
    pub ubicacion: String,
}

impl PredictionInput {
    /// Build an input from already-typed values, applying the same rules as
    /// body validation.
    pub fn new(edad: i64, ubicacion: impl Into<String>) -> Result<Self> {
        let ubicacion = check_ubicacion(&Value::String(ubicacion.into()))
            .map_err(|e| PricingError::Validation(vec![e]))?;
        Ok(Self { edad, ubicacion })
    }
}

/// Validate a raw JSON request body.
pub fn validate_body(body: &[u8]) -> Result<PredictionInput> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        PricingError::Validation(vec![FieldError::at_body(
            "json_invalid",
            format!("JSON decode error: {}", e),
        )])
    })?;
    validate_value(&value)
}

/// Validate an already-parsed JSON value.
pub fn validate_value(value: &Value) -> Result<PredictionInput> {
    let object = match value {
        Value::Object(map) => map,
        other => {
            let mut err = FieldError::at_body(
                "model_attributes_type",
                "Input should be a valid dictionary or object to extract fields from",
            );
            err.input = Some(other.clone());
            return Err(PricingError::Validation(vec![err]));
        }
    };

    let edad = field(object, FIELD_EDAD).and_then(check_edad);
    let ubicacion = field(object, FIELD_UBICACION).and_then(check_ubicacion);

    match (edad, ubicacion) {
        (Ok(edad), Ok(ubicacion)) => Ok(PredictionInput { edad, ubicacion }),
        (edad, ubicacion) => {
            let errors = [edad.err(), ubicacion.err()].into_iter().flatten().collect();
            Err(PricingError::Validation(errors))
        }
    }
}

fn field<'a>(object: &'a Map<String, Value>, name: &str) -> std::result::Result<&'a Value, FieldError> {
    object
        .get(name)
        .ok_or_else(|| FieldError::at_field(name, "missing", "Field required", None))
}

fn check_edad(value: &Value) -> std::result::Result<i64, FieldError> {
    let reject = |kind: &str, msg: &str| {
        FieldError::at_field(FIELD_EDAD, kind, msg, Some(value.clone()))
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(reject(
                    "int_parsing_size",
                    "Unable to parse input string as an integer, exceeded maximum size",
                ));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && in_i64_range(f) => Ok(f as i64),
                Some(f) if f.is_finite() && f.fract() == 0.0 => Err(reject(
                    "int_parsing_size",
                    "Unable to parse input string as an integer, exceeded maximum size",
                )),
                _ => Err(reject(
                    "int_from_float",
                    "Input should be a valid integer, got a number with a fractional part",
                )),
            }
        }
        Value::String(s) => strip_decimal_zeros(s.trim()).parse::<i64>().map_err(|_| {
            reject(
                "int_parsing",
                "Input should be a valid integer, unable to parse string as an integer",
            )
        }),
        _ => Err(reject("int_type", "Input should be a valid integer")),
    }
}

/// `"35.000"` -> `"35"`; anything else is returned unchanged.
fn strip_decimal_zeros(s: &str) -> &str {
    match s.split_once('.') {
        Some((whole, fraction)) if !whole.is_empty() && fraction.bytes().all(|b| b == b'0') => whole,
        _ => s,
    }
}

fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn check_ubicacion(value: &Value) -> std::result::Result<String, FieldError> {
    match value {
        Value::String(s) if s.is_empty() => Err(FieldError::at_field(
            FIELD_UBICACION,
            "string_too_short",
            "String should have at least 1 character",
            Some(value.clone()),
        )),
        Value::String(s) => Ok(s.clone()),
        _ => Err(FieldError::at_field(
            FIELD_UBICACION,
            "string_type",
            "Input should be a valid string",
            Some(value.clone()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(err: PricingError) -> Vec<(String, String)> {
        err.field_errors()
            .iter()
            .map(|e| (e.field().unwrap_or("body").to_string(), e.kind.clone()))
            .collect()
    }

    #[test]
    fn test_valid_input() {
        let input = validate_value(&json!({"edad": 35, "ubicacion": "B"})).unwrap();
        assert_eq!(input, PredictionInput { edad: 35, ubicacion: "B".into() });
    }

    #[test]
    fn test_extra_fields_ignored() {
        let input =
            validate_value(&json!({"edad": 35, "ubicacion": "B", "precio": 1, "x": null})).unwrap();
        assert_eq!(input.edad, 35);
    }

    #[test]
    fn test_lax_integer_coercion() {
        assert_eq!(validate_value(&json!({"edad": "35", "ubicacion": "B"})).unwrap().edad, 35);
        assert_eq!(validate_value(&json!({"edad": " 41 ", "ubicacion": "B"})).unwrap().edad, 41);
        assert_eq!(validate_value(&json!({"edad": 35.0, "ubicacion": "B"})).unwrap().edad, 35);
        assert_eq!(validate_value(&json!({"edad": -3, "ubicacion": "B"})).unwrap().edad, -3);
        assert_eq!(validate_value(&json!({"edad": "35.0", "ubicacion": "B"})).unwrap().edad, 35);
        assert_eq!(validate_value(&json!({"edad": " 7.00 ", "ubicacion": "B"})).unwrap().edad, 7);
        assert_eq!(validate_value(&json!({"edad": "35.", "ubicacion": "B"})).unwrap().edad, 35);
    }

    #[test]
    fn test_non_integer_edad_rejected() {
        let err = validate_value(&json!({"edad": "thirty", "ubicacion": "B"})).unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(kinds(err), vec![("edad".into(), "int_parsing".into())]);

        for edad in ["35.5", ".0", "35.0.0", "1e3"] {
            let err = validate_value(&json!({"edad": edad, "ubicacion": "B"})).unwrap_err();
            assert_eq!(kinds(err), vec![("edad".into(), "int_parsing".into())], "edad {edad}");
        }

        let err = validate_value(&json!({"edad": 35.5, "ubicacion": "B"})).unwrap_err();
        assert_eq!(kinds(err), vec![("edad".into(), "int_from_float".into())]);

        let err = validate_value(&json!({"edad": true, "ubicacion": "B"})).unwrap_err();
        assert_eq!(kinds(err), vec![("edad".into(), "int_type".into())]);

        let err = validate_value(&json!({"edad": null, "ubicacion": "B"})).unwrap_err();
        assert_eq!(kinds(err), vec![("edad".into(), "int_type".into())]);

        let err = validate_value(&json!({"edad": u64::MAX, "ubicacion": "B"})).unwrap_err();
        assert_eq!(kinds(err), vec![("edad".into(), "int_parsing_size".into())]);
    }

    #[test]
    fn test_ubicacion_rules() {
        let err = validate_value(&json!({"edad": 1, "ubicacion": ""})).unwrap_err();
        assert_eq!(kinds(err), vec![("ubicacion".into(), "string_too_short".into())]);

        // Whitespace is a string of length >= 1; the artifact decides whether it is a known category.
        let input = validate_value(&json!({"edad": 1, "ubicacion": " "})).unwrap();
        assert_eq!(input.ubicacion, " ");

        let err = validate_value(&json!({"edad": 1, "ubicacion": 7})).unwrap_err();
        assert_eq!(kinds(err), vec![("ubicacion".into(), "string_type".into())]);
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let err = validate_value(&json!({})).unwrap_err();
        assert_eq!(
            kinds(err),
            vec![
                ("edad".into(), "missing".into()),
                ("ubicacion".into(), "missing".into())
            ]
        );
    }

    #[test]
    fn test_body_level_errors() {
        let err = validate_body(b"{not json").unwrap_err();
        assert_eq!(kinds(err), vec![("body".into(), "json_invalid".into())]);

        let err = validate_body(b"[1, 2]").unwrap_err();
        assert_eq!(kinds(err), vec![("body".into(), "model_attributes_type".into())]);

        let err = validate_body(b"").unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_typed_constructor() {
        assert!(PredictionInput::new(35, "B").is_ok());
        assert!(PredictionInput::new(35, "").is_err());
    }
}
