//! # Routine Import - workout routine CSV import
//!
//! Turns routine spreadsheets exported by coaches into the nested
//! exercise → sets structure the gym dashboard stores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Reader    │────▶│ Row parser  │────▶│  Formatter  │
//! │  (ISO/UTF8) │     │ (RawTable)  │     │ (per format)│     │  (grouped)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                                         FieldMapping
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use routine_import::{import_text, CsvFormat, FieldMapping, ImportOptions};
//!
//! let mapping = FieldMapping::from_json_str(
//!     r#"{"0":"ejercicios","1":"repeticiones","2":"peso","3":"descanso"}"#,
//! ).unwrap();
//! let report = import_text(
//!     "ejercicio,reps,peso,descanso\nSentadilla,10,80,60\n",
//!     CsvFormat::CommaDelimited,
//!     &mapping,
//!     &ImportOptions::default(),
//! ).unwrap();
//! assert_eq!(report.routine.exercises[0].name, "Sentadilla");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error hierarchy
//! - [`models`] - Field vocabulary, mapping, flat and formatted data
//! - [`parser`] - Raw CSV reading with encoding detection
//! - [`transform`] - Row parsers, formatter and pipeline
//! - [`validation`] - Output schema validation
//! - [`cache`] - Saved mapping templates
//! - [`logs`] - Progress logs
//! - [`config`] - Constants and environment overrides

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Reading
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Mapping templates
pub mod cache;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CsvError, ImportError, MappingError, RegistryError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    suggest_mapping, CsvFormat, FieldMapping, FieldName, FormattedExercise,
    FormattedExerciseSet, FormattedRoutineData, ParsedRoutineData, RawTable, RenderConfig,
    ValueKind,
};

// =============================================================================
// Re-exports - Reading
// =============================================================================

pub use parser::{
    check_size, decode_content, detect_encoding, read_bytes, read_file, read_raw_table, ReadResult,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    format_routine, import_bytes, import_file, import_table, import_text, parse_rows,
    resolve_mapping, CellWarning, ImportOptions, ImportReport, MappingOrigin, ResolvedMapping,
    RowParseOutcome, SkippedRow,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, is_valid_formatted_routine, validate, validate_formatted_routine};

// =============================================================================
// Re-exports - Registry
// =============================================================================

pub use cache::{MappingRegistry, StoredMapping};
