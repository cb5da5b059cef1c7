//! Column to field mapping.
//!
//! A [`FieldMapping`] assigns CSV column indices to logical [`FieldName`]s.
//! Its JSON form is the object the dashboard builds while the user matches
//! headers to fields:
//!
//! ```json
//! { "0": "ejercicios", "1": "repeticiones", "2": "peso", "3": "" }
//! ```
//!
//! Empty values mean "unmapped" and are dropped. Iteration is in ascending
//! column order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::FieldName;
use crate::error::{MappingError, MappingResult};

/// Mapping from 0-based column index to field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<usize, FieldName>")]
pub struct FieldMapping {
    columns: BTreeMap<usize, FieldName>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(column, field)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, FieldName)>) -> Self {
        Self {
            columns: pairs.into_iter().collect(),
        }
    }

    /// Parse the dashboard JSON form.
    pub fn from_json_str(json: &str) -> MappingResult<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Add or replace a column assignment.
    pub fn with(mut self, column: usize, field: FieldName) -> Self {
        self.columns.insert(column, field);
        self
    }

    pub fn insert(&mut self, column: usize, field: FieldName) {
        self.columns.insert(column, field);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entries in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, FieldName)> + '_ {
        self.columns.iter().map(|(c, f)| (*c, *f))
    }

    /// Column of a field. The lowest column wins when a field is mapped twice.
    pub fn column_of(&self, field: FieldName) -> Option<usize> {
        self.iter().find(|(_, f)| *f == field).map(|(c, _)| c)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.column_of(field).is_some()
    }

    /// Column holding the exercise name.
    pub fn exercise_column(&self) -> MappingResult<usize> {
        self.column_of(FieldName::Exercise)
            .ok_or(MappingError::MissingExerciseColumn)
    }

    /// Distinct value fields (everything but the exercise name), each with
    /// the column it is read from, in column order.
    pub fn value_columns(&self) -> Vec<(FieldName, usize)> {
        let mut out: Vec<(FieldName, usize)> = Vec::new();
        for (column, field) in self.iter() {
            if field == FieldName::Exercise || out.iter().any(|(f, _)| *f == field) {
                continue;
            }
            out.push((field, column));
        }
        out
    }

    /// Check every mapped column exists in a table `width` columns wide.
    pub fn validate_against(&self, width: usize) -> MappingResult<()> {
        match self.iter().find(|(column, _)| *column >= width) {
            Some((column, field)) => Err(MappingError::ColumnOutOfRange {
                column,
                field: field.to_string(),
                width,
            }),
            None => Ok(()),
        }
    }
}

impl TryFrom<BTreeMap<String, String>> for FieldMapping {
    type Error = MappingError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut columns = BTreeMap::new();
        for (key, value) in raw {
            if value.trim().is_empty() {
                continue;
            }
            let column: usize = key
                .trim()
                .parse()
                .map_err(|_| MappingError::InvalidColumn(key.clone()))?;
            let field = FieldName::from_token(&value)
                .ok_or_else(|| MappingError::UnknownField(value.clone()))?;
            columns.insert(column, field);
        }
        Ok(Self { columns })
    }
}

impl From<FieldMapping> for BTreeMap<usize, FieldName> {
    fn from(mapping: FieldMapping) -> Self {
        mapping.columns
    }
}

// =============================================================================
// Mapping suggestion
// =============================================================================

static HEADER_PATTERNS: Lazy<Vec<(FieldName, Regex)>> = Lazy::new(|| {
    [
        (FieldName::Exercise, r"^(ejercicios?|exercises?|nombre|name|movimientos?)\b"),
        (FieldName::Series, r"^(series|sets?)\b"),
        (FieldName::Repetitions, r"^(repeticiones|reps?|repetitions?)\b"),
        (FieldName::Weight, r"^(peso|weight|carga|load|kg)\b"),
        (FieldName::Rest, r"^(descanso|rest|pausa)\b"),
        (FieldName::Pace, r"^(ritmo|pace|tempo)\b"),
        (FieldName::Rpe, r"^rpe\b"),
        (FieldName::Rir, r"^rir\b"),
        (FieldName::Rpm, r"^rpm\b"),
        (FieldName::Speed, r"^(speed|velocidad)\b"),
        (FieldName::Cadence, r"^(cadence|cadencia)\b"),
        (FieldName::Distance, r"^(distance|distancia)\b"),
        (FieldName::Height, r"^(height|altura)\b"),
        (FieldName::Calories, r"^(calories|calorias|kcal)\b"),
        (FieldName::Round, r"^(rounds?|rondas?|vueltas?)\b"),
    ]
    .into_iter()
    .filter_map(|(field, pattern)| Regex::new(pattern).ok().map(|re| (field, re)))
    .collect()
});

/// Lowercase and strip Spanish accents so `Repeticiónes` and `CALORÍAS` match.
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Guess a mapping from header names.
///
/// Each field is assigned to at most one column (the first header that
/// matches it); headers that match nothing stay unmapped.
pub fn suggest_mapping(headers: &[String]) -> FieldMapping {
    let mut mapping = FieldMapping::new();

    for (column, header) in headers.iter().enumerate() {
        let normalized = normalize_header(header);
        let matched = HEADER_PATTERNS
            .iter()
            .find(|(field, re)| !mapping.contains(*field) && re.is_match(&normalized));

        if let Some((field, _)) = matched {
            mapping.insert(column, *field);
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_json_skips_empty_values() {
        let mapping =
            FieldMapping::from_json_str(r#"{"0":"ejercicios","1":"","2":"peso"}"#).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.column_of(FieldName::Weight), Some(2));
        assert_eq!(mapping.exercise_column().unwrap(), 0);
    }

    #[test]
    fn test_iteration_is_numeric_order() {
        let mapping = FieldMapping::from_json_str(
            r#"{"10":"rpe","2":"peso","0":"ejercicios","1":"repeticiones"}"#,
        )
        .unwrap();
        let columns: Vec<usize> = mapping.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec![0, 1, 2, 10]);

        let from_pairs = FieldMapping::from_pairs([
            (10, FieldName::Rpe),
            (0, FieldName::Exercise),
            (2, FieldName::Weight),
            (1, FieldName::Repetitions),
        ]);
        assert_eq!(from_pairs, mapping);
    }

    #[test]
    fn test_invalid_key_and_field() {
        let err = FieldMapping::from_json_str(r#"{"a":"peso"}"#).unwrap_err();
        assert!(matches!(err, MappingError::InvalidColumn(_)));

        let err = FieldMapping::from_json_str(r#"{"0":"tempo"}"#).unwrap_err();
        assert!(matches!(err, MappingError::UnknownField(_)));
    }

    #[test]
    fn test_missing_exercise_column() {
        let mapping = FieldMapping::new().with(1, FieldName::Repetitions);
        assert!(matches!(
            mapping.exercise_column(),
            Err(MappingError::MissingExerciseColumn)
        ));
    }

    #[test]
    fn test_duplicate_field_uses_lowest_column() {
        let mapping = FieldMapping::new()
            .with(0, FieldName::Exercise)
            .with(3, FieldName::Weight)
            .with(1, FieldName::Weight);
        assert_eq!(mapping.column_of(FieldName::Weight), Some(1));
        assert_eq!(mapping.value_columns(), vec![(FieldName::Weight, 1)]);
    }

    #[test]
    fn test_validate_against_width() {
        let mapping = FieldMapping::new()
            .with(0, FieldName::Exercise)
            .with(4, FieldName::Rest);
        assert!(mapping.validate_against(5).is_ok());
        assert!(matches!(
            mapping.validate_against(4),
            Err(MappingError::ColumnOutOfRange { column: 4, .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_tokens() {
        let mapping = FieldMapping::new()
            .with(0, FieldName::Exercise)
            .with(1, FieldName::Repetitions);
        let json = mapping.to_json().unwrap();
        assert!(json.contains("\"0\": \"ejercicios\""));
        assert_eq!(FieldMapping::from_json_str(&json).unwrap(), mapping);
    }

    #[test]
    fn test_suggest_mapping_spanish_headers() {
        let mapping = suggest_mapping(&headers(&[
            "Ejercicio",
            "Series",
            "Repeticiones",
            "Peso (kg)",
            "Descanso",
            "Notas",
        ]));
        assert_eq!(mapping.column_of(FieldName::Exercise), Some(0));
        assert_eq!(mapping.column_of(FieldName::Series), Some(1));
        assert_eq!(mapping.column_of(FieldName::Repetitions), Some(2));
        assert_eq!(mapping.column_of(FieldName::Weight), Some(3));
        assert_eq!(mapping.column_of(FieldName::Rest), Some(4));
        assert_eq!(mapping.len(), 5);
    }

    #[test]
    fn test_suggest_mapping_accents_and_english() {
        let mapping = suggest_mapping(&headers(&["exercise", "reps", "CALORÍAS", "RPE"]));
        assert_eq!(mapping.column_of(FieldName::Exercise), Some(0));
        assert_eq!(mapping.column_of(FieldName::Repetitions), Some(1));
        assert_eq!(mapping.column_of(FieldName::Calories), Some(2));
        assert_eq!(mapping.column_of(FieldName::Rpe), Some(3));
    }

    #[test]
    fn test_suggest_mapping_first_match_wins() {
        let mapping = suggest_mapping(&headers(&["ejercicio", "peso", "peso 2"]));
        assert_eq!(mapping.column_of(FieldName::Weight), Some(1));
        assert_eq!(mapping.len(), 2);
    }
}
