//! JSON Schema validation of imported routines.
//!
//! The schema for [`crate::models::FormattedRoutineData`] is embedded at
//! compile time from `schemas/formatted-routine.json` (JSON Schema Draft 7).
//! Callers run it before submitting a routine to the dashboard backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use routine_import::validate_formatted_routine;
//!
//! let routine = json!({
//!     "exercises": [{ "name": "Sentadilla", "sets": [{ "reps": 10, "weight": 80.0 }] }],
//!     "renderConfig": { "campo1": "repeticiones", "campo2": "peso", "campo3": "descanso" }
//! });
//! assert!(validate_formatted_routine(&routine).is_ok());
//! ```

use serde_json::Value;

const ROUTINE_SCHEMA: &str = include_str!("../../schemas/formatted-routine.json");

/// Validate `data` against `schema`.
///
/// Returns every validation error message when invalid.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

fn routine_schema() -> Result<Value, Vec<String>> {
    serde_json::from_str(ROUTINE_SCHEMA).map_err(|e| vec![format!("Invalid embedded schema: {}", e)])
}

/// Validate a formatted routine (JSON form).
pub fn validate_formatted_routine(data: &Value) -> Result<(), Vec<String>> {
    let schema = routine_schema()?;
    validate(&schema, data)
}

/// Quick check of a formatted routine.
pub fn is_valid_formatted_routine(data: &Value) -> bool {
    routine_schema()
        .map(|schema| is_valid(&schema, data))
        .unwrap_or(false)
}
