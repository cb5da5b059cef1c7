//! Format-specific row parsers.
//!
//! All three formats share one signature and one set of cell conversion
//! rules; they differ in how many flat entries one row produces and where
//! the set number comes from.
//!
//! ```text
//! commaDelimited   1 row -> 1 entry             series: not populated
//! sameVariable     1 row -> max(1, series)      series: 1..=n
//! exercisePerSet   1 row -> 1 entry             series: run counter per name
//! ```
//!
//! Cell conversion never fails. An integer cell is read like JavaScript
//! `parseInt` (leading digits, trailing text ignored) and a float cell like
//! `parseFloat`; a cell with no leading number becomes 0 / 0.0 and is
//! reported as a [`CellWarning`]. A sameVariable set count is capped at
//! [`MAX_SERIES_PER_ROW`].

use std::iter;

use serde::Serialize;

use crate::config::MAX_SERIES_PER_ROW;
use crate::error::MappingResult;
use crate::models::{CsvFormat, FieldMapping, FieldName, ParsedRoutineData, RawTable};

/// A numeric cell that could not be used as written: unreadable cells are
/// replaced by zero and oversized set counts are clamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellWarning {
    /// Index of the data row in the table (0-based, header excluded).
    pub row: usize,
    pub column: usize,
    pub field: FieldName,
    pub value: String,
}

/// A row that produced no entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// Flat data plus diagnostics from one parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowParseOutcome {
    pub data: ParsedRoutineData,
    pub warnings: Vec<CellWarning>,
    pub skipped: Vec<SkippedRow>,
}

impl RowParseOutcome {
    /// Append `count` entries for one row. Each mapped cell is read once and
    /// its value repeated, so a bad cell yields a single warning.
    fn push_row(
        &mut self,
        name: &str,
        row: &[String],
        row_idx: usize,
        columns: &[(FieldName, usize)],
        count: usize,
    ) {
        let RowParseOutcome { data, warnings, .. } = self;
        data.exercises.extend(iter::repeat(name.to_string()).take(count));

        for &(field, column) in columns {
            let raw = cell(row, column);
            match column_mut(data, field) {
                Some(Column::Int(values)) => {
                    let value = parse_int_prefix(raw).unwrap_or_else(|| {
                        warnings.push(CellWarning::new(row_idx, column, field, raw));
                        0
                    });
                    values.extend(iter::repeat(value).take(count));
                }
                Some(Column::Float(values)) => {
                    let value = parse_float_prefix(raw).unwrap_or_else(|| {
                        warnings.push(CellWarning::new(row_idx, column, field, raw));
                        0.0
                    });
                    values.extend(iter::repeat(value).take(count));
                }
                Some(Column::Text(values)) => {
                    values.extend(iter::repeat(raw.to_string()).take(count));
                }
                None => {}
            }
        }
    }
}

impl CellWarning {
    fn new(row: usize, column: usize, field: FieldName, raw: &str) -> Self {
        Self {
            row,
            column,
            field,
            value: raw.to_string(),
        }
    }
}

/// Parse every row of `table` according to `format`.
///
/// Fails only on structural problems: no `ejercicios` column, or a mapped
/// column outside the table.
pub fn parse_rows(
    table: &RawTable,
    mapping: &FieldMapping,
    format: CsvFormat,
) -> MappingResult<RowParseOutcome> {
    mapping.validate_against(table.width())?;
    let exercise_column = mapping.exercise_column()?;
    let series_column = mapping.column_of(FieldName::Series);
    let value_columns: Vec<(FieldName, usize)> = mapping
        .value_columns()
        .into_iter()
        .filter(|(field, _)| *field != FieldName::Series)
        .collect();

    let mut outcome = RowParseOutcome::default();
    let mut previous_name: Option<&str> = None;
    let mut set_number: i64 = 0;

    for (row_idx, row) in table.rows.iter().enumerate() {
        let name = cell(row, exercise_column);
        if name.is_empty() {
            outcome.skipped.push(SkippedRow {
                row: row_idx,
                reason: "empty exercise name".to_string(),
            });
            continue;
        }

        match format {
            CsvFormat::CommaDelimited => {
                outcome.push_row(name, row, row_idx, &value_columns, 1);
            }

            CsvFormat::SameVariable => {
                let count = series_column
                    .map(|column| series_count(row, row_idx, column, &mut outcome.warnings))
                    .unwrap_or(1);
                outcome.push_row(name, row, row_idx, &value_columns, count as usize);
                outcome.data.series.extend(1..=count);
            }

            CsvFormat::ExercisePerSet => {
                set_number = if previous_name == Some(name) { set_number + 1 } else { 1 };
                previous_name = Some(name);
                outcome.push_row(name, row, row_idx, &value_columns, 1);
                outcome.data.series.push(set_number);
            }
        }
    }

    Ok(outcome)
}

fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Number of sets a sameVariable row expands to, in `1..=MAX_SERIES_PER_ROW`.
///
/// Missing, invalid or non-positive counts mean one set. Counts above the
/// cap are clamped; both cases are reported as a [`CellWarning`].
fn series_count(row: &[String], row_idx: usize, column: usize, warnings: &mut Vec<CellWarning>) -> i64 {
    let raw = cell(row, column);
    match parse_int_prefix(raw) {
        Some(n) if n > MAX_SERIES_PER_ROW => {
            warnings.push(CellWarning::new(row_idx, column, FieldName::Series, raw));
            MAX_SERIES_PER_ROW
        }
        Some(n) => n.max(1),
        None => {
            warnings.push(CellWarning::new(row_idx, column, FieldName::Series, raw));
            1
        }
    }
}

// =============================================================================
// Cell conversion
// =============================================================================

/// Typed target vector of a field in [`ParsedRoutineData`].
enum Column<'a> {
    Int(&'a mut Vec<i64>),
    Float(&'a mut Vec<f64>),
    Text(&'a mut Vec<String>),
}

/// The vector `field` is written to; `None` for the name and set number,
/// which the row parsers write themselves.
fn column_mut(data: &mut ParsedRoutineData, field: FieldName) -> Option<Column<'_>> {
    let column = match field {
        FieldName::Exercise | FieldName::Series => return None,
        FieldName::Repetitions => Column::Int(&mut data.repetitions),
        FieldName::Weight => Column::Float(&mut data.weight),
        FieldName::Rest => Column::Int(&mut data.rest),
        FieldName::Pace => Column::Text(data.pace.get_or_insert_with(Vec::new)),
        FieldName::Rpe => Column::Int(data.rpe.get_or_insert_with(Vec::new)),
        FieldName::Rir => Column::Int(data.rir.get_or_insert_with(Vec::new)),
        FieldName::Rpm => Column::Int(data.rpm.get_or_insert_with(Vec::new)),
        FieldName::Speed => Column::Float(data.speed.get_or_insert_with(Vec::new)),
        FieldName::Cadence => Column::Int(data.cadence.get_or_insert_with(Vec::new)),
        FieldName::Distance => Column::Float(data.distance.get_or_insert_with(Vec::new)),
        FieldName::Height => Column::Float(data.height.get_or_insert_with(Vec::new)),
        FieldName::Calories => Column::Int(data.calories.get_or_insert_with(Vec::new)),
        FieldName::Round => Column::Int(data.round.get_or_insert_with(Vec::new)),
    };
    Some(column)
}

/// Leading integer of `raw`, `None` if it has none.
///
/// A digit run too large for `i64` saturates to `i64::MAX` / `i64::MIN`.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let sign_len = usize::from(matches!(s.as_bytes().first(), Some(b'-') | Some(b'+')));
    let negative = s.starts_with('-');

    let digits = s[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    let value = s[..sign_len + digits]
        .parse::<i64>()
        .unwrap_or(if negative { i64::MIN } else { i64::MAX });
    Some(value)
}

/// Leading decimal number of `raw`, `None` if it has none.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digit_count = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digit_count += frac_end - frac_start;
        if digit_count > 0 {
            end = frac_end;
        }
    }

    if digit_count == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'-' | b'+') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
