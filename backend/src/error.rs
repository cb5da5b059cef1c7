//! Error types for the routine import pipeline.
//!
//! - [`CsvError`] - Reading and decoding the raw CSV
//! - [`MappingError`] - Column to field mapping problems
//! - [`ValidationError`] - Output schema validation
//! - [`RegistryError`] - Saved mapping templates
//! - [`ImportError`] - Top-level import errors
//!
//! Conversion into [`ImportError`] is automatic via `From`, so `?` works
//! across module boundaries.

use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while turning file content into a [`crate::models::RawTable`].
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be decoded as text.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Fewer than two lines (no header plus data).
    #[error("Malformed file: a header row and at least one data row are required")]
    EmptyFile,

    /// Every data row was empty or had the wrong number of cells.
    #[error("Malformed file: no valid data rows (expected {expected} cells per row)")]
    NoDataRows { expected: usize },

    /// File exceeds the configured size limit.
    #[error("File is too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: usize, limit: usize },
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors in a caller-supplied field mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Key is not a column index.
    #[error("Invalid column index: '{0}'")]
    InvalidColumn(String),

    /// Value is not part of the field vocabulary.
    #[error("Unknown field name: '{0}'")]
    UnknownField(String),

    /// No column is mapped to `ejercicios`.
    #[error("No column is mapped to the exercise name ('ejercicios')")]
    MissingExerciseColumn,

    /// A mapped column does not exist in the table.
    #[error("Column {column} mapped to '{field}' is out of range (table has {width} columns)")]
    ColumnOutOfRange {
        column: usize,
        field: String,
        width: usize,
    },

    /// Mapping JSON could not be parsed.
    #[error("Invalid mapping JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during output schema validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the mapping template registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Template not found.
    #[error("Mapping template not found: {0}")]
    NotFound(String),

    /// Template file contained an invalid mapping.
    #[error("Invalid mapping template: {0}")]
    InvalidTemplate(#[from] MappingError),

    /// IO error.
    #[error("Registry IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Registry JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level error returned by the import pipeline.
///
/// Structural problems only: a malformed file, a missing exercise mapping or
/// an out-of-range column. Bad numeric cells never end up here unless
/// strict mode was requested.
#[derive(Debug, Error)]
pub enum ImportError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Mapping error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Output failed schema validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Strict mode rejected cells that would have been defaulted.
    #[error("{0} cells could not be parsed as numbers")]
    InvalidCells(usize),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
