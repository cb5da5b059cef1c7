//! High-level import API: CSV content to formatted routine.
//!
//! Combines every step: decoding, reading, row parsing for the chosen
//! format, grouping and (optionally) schema validation.
//!
//! # Example
//!
//! ```rust,ignore
//! use routine_import::{import_file, CsvFormat, FieldMapping, ImportOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mapping = FieldMapping::from_json_str(r#"{"0":"ejercicios","1":"repeticiones"}"#)?;
//!     let report = import_file(
//!         Path::new("rutina.csv"),
//!         CsvFormat::ExercisePerSet,
//!         &mapping,
//!         &ImportOptions::default(),
//!     ).await?;
//!
//!     println!("Imported {} exercises", report.routine.exercises.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use super::formatter::format_routine;
use super::rows::{parse_rows, CellWarning, SkippedRow};
use crate::cache::MappingRegistry;
use crate::config::MAX_LOGGED_WARNINGS;
use crate::error::{CsvError, ImportError, ImportResult, ValidationError};
use crate::logs::{log_error, log_info, log_row_warning, log_success, log_warning};
use crate::models::{suggest_mapping, CsvFormat, FieldMapping, FormattedRoutineData, RawTable};
use crate::parser::{check_size, decode_content, detect_encoding, read_raw_table};
use crate::validation::validate_formatted_routine;

/// Options for an import
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Skip schema validation of the output
    pub skip_validation: bool,

    /// Fail instead of defaulting unreadable numeric cells to zero
    pub strict: bool,
}

/// Result of an import
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub routine: FormattedRoutineData,
    pub format: CsvFormat,
    pub encoding: String,
    /// CSV header row
    pub headers: Vec<String>,
    /// Valid data rows read from the file
    pub row_count: usize,
    /// Flat (exercise, set) entries produced
    pub entry_count: usize,
    /// Numeric cells that were defaulted to zero
    pub warnings: Vec<CellWarning>,
    /// Rows without an exercise name
    pub skipped: Vec<SkippedRow>,
}

/// Where a resolved mapping came from
#[derive(Debug, Clone, PartialEq)]
pub enum MappingOrigin {
    /// A saved template matched the headers
    Template { id: String, score: f64 },
    /// Guessed from header names
    Suggested,
}

/// A mapping chosen for a file without an explicit one
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
    pub mapping: FieldMapping,
    /// Format stored with the template, if any
    pub format: Option<CsvFormat>,
    pub origin: MappingOrigin,
}

/// Import a CSV file from disk.
///
/// Reading the file is the only suspension point; everything after it is
/// synchronous.
pub async fn import_file(
    path: &Path,
    format: CsvFormat,
    mapping: &FieldMapping,
    options: &ImportOptions,
) -> ImportResult<ImportReport> {
    log_info(format!("📖 Reading {}", path.display()));
    let metadata = tokio::fs::metadata(path).await.map_err(CsvError::from)?;
    check_size(metadata.len())?;
    let bytes = tokio::fs::read(path).await.map_err(CsvError::from)?;
    import_bytes(&bytes, format, mapping, options)
}

/// Import raw bytes, detecting their encoding.
pub fn import_bytes(
    bytes: &[u8],
    format: CsvFormat,
    mapping: &FieldMapping,
    options: &ImportOptions,
) -> ImportResult<ImportReport> {
    check_size(bytes.len() as u64)?;

    let encoding = detect_encoding(bytes);
    log_success(format!("Detected encoding: {}", encoding));
    let content = decode_content(bytes, &encoding)?;
    let table = read_raw_table(&content)?;
    import_table(&table, format, mapping, options, encoding)
}

/// Import already-decoded text (assumed UTF-8).
pub fn import_text(
    content: &str,
    format: CsvFormat,
    mapping: &FieldMapping,
    options: &ImportOptions,
) -> ImportResult<ImportReport> {
    let table = read_raw_table(content)?;
    import_table(&table, format, mapping, options, "utf-8".to_string())
}

/// Import a table that was already read.
pub fn import_table(
    table: &RawTable,
    format: CsvFormat,
    mapping: &FieldMapping,
    options: &ImportOptions,
    encoding: String,
) -> ImportResult<ImportReport> {
    log_success(format!(
        "Read {} rows, {} columns: {}",
        table.rows.len(),
        table.width(),
        table.headers.join(", ")
    ));

    log_info(format!("⚙️  Parsing as {}", format));
    let outcome = parse_rows(table, mapping, format)?;
    log_success(format!("{} sets parsed", outcome.data.len()));
    print_diagnostics(&outcome.warnings, &outcome.skipped);

    if options.strict && !outcome.warnings.is_empty() {
        return Err(ImportError::InvalidCells(outcome.warnings.len()));
    }

    log_info("📦 Grouping by exercise...");
    let routine = format_routine(&outcome.data, mapping);
    log_success(format!(
        "{} exercises (display: {}, {}, {})",
        routine.exercises.len(),
        routine.render_config.campo1,
        routine.render_config.campo2,
        routine.render_config.campo3
    ));

    if !options.skip_validation {
        validate_routine(&routine)?;
    }

    Ok(ImportReport {
        entry_count: outcome.data.len(),
        row_count: table.rows.len(),
        format,
        encoding,
        headers: table.headers.clone(),
        warnings: outcome.warnings,
        skipped: outcome.skipped,
        routine,
    })
}

fn validate_routine(routine: &FormattedRoutineData) -> Result<(), ValidationError> {
    log_info("✔️  Validating routine...");
    let value = serde_json::to_value(routine).map_err(|e| ValidationError::SchemaError {
        errors: vec![e.to_string()],
    })?;

    match validate_formatted_routine(&value) {
        Ok(()) => {
            log_success("Routine is valid");
            Ok(())
        }
        Err(errors) => {
            for err in errors.iter().take(MAX_LOGGED_WARNINGS) {
                log_error(err.clone());
            }
            Err(ValidationError::SchemaError { errors })
        }
    }
}

fn print_diagnostics(warnings: &[CellWarning], skipped: &[SkippedRow]) {
    if !warnings.is_empty() {
        log_warning(format!("{} cells could not be read and were set to 0", warnings.len()));
        for w in warnings.iter().take(MAX_LOGGED_WARNINGS) {
            log_row_warning(
                w.row + 1,
                format!("column {} ({}): '{}'", w.column, w.field, w.value),
            );
        }
    }

    if !skipped.is_empty() {
        let rows: Vec<String> = skipped
            .iter()
            .take(MAX_LOGGED_WARNINGS)
            .map(|s| (s.row + 1).to_string())
            .collect();
        let more = if skipped.len() > MAX_LOGGED_WARNINGS {
            format!("... +{}", skipped.len() - MAX_LOGGED_WARNINGS)
        } else {
            String::new()
        };
        log_warning(format!(
            "{} rows skipped without exercise name (rows: {}{})",
            skipped.len(),
            rows.join(", "),
            more
        ));
    }
}

/// Choose a mapping for headers when the caller gave none.
///
/// Saved templates are tried first (best match that fits the table and maps
/// the exercise column); otherwise the mapping is guessed from header names.
pub fn resolve_mapping(headers: &[String], registry: &MappingRegistry) -> ResolvedMapping {
    let compatible = registry.find_compatible(headers);

    for (stored, score) in compatible {
        let usable = stored.mapping.validate_against(headers.len()).is_ok()
            && stored.mapping.exercise_column().is_ok();
        if usable {
            log_success(format!(
                "Using template \"{}\" (match {:.0}%)",
                stored.name,
                score * 100.0
            ));
            return ResolvedMapping {
                mapping: stored.mapping.clone(),
                format: stored.format,
                origin: MappingOrigin::Template {
                    id: stored.id.clone(),
                    score,
                },
            };
        }
        log_warning(format!("Template \"{}\" does not fit this file", stored.name));
    }

    log_info("No saved template fits, guessing mapping from headers");
    ResolvedMapping {
        mapping: suggest_mapping(headers),
        format: None,
        origin: MappingOrigin::Suggested,
    }
}
