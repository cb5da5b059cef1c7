//! Domain models for the routine import pipeline.
//!
//! - [`FieldName`] - Closed vocabulary of logical routine fields
//! - [`CsvFormat`] - The three tabular encodings of a routine
//! - [`RawTable`] - Header row plus equal-length data rows
//! - [`ParsedRoutineData`] - Flat, parallel-vector form of every set
//! - [`FormattedRoutineData`] - Exercises with nested sets and a render config
//! - [`FieldMapping`] - Column index to field assignment (see [`mapping`])

pub mod mapping;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use mapping::{suggest_mapping, FieldMapping};

// =============================================================================
// Field vocabulary
// =============================================================================

/// A logical routine field a CSV column can be mapped to.
///
/// Serialized with the tokens the dashboard uses (`ejercicios`, `peso`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldName {
    /// Exercise name (required).
    #[serde(rename = "ejercicios")]
    Exercise,
    /// Number of sets, only meaningful for [`CsvFormat::SameVariable`].
    #[serde(rename = "series")]
    Series,
    #[serde(rename = "repeticiones")]
    Repetitions,
    #[serde(rename = "peso")]
    Weight,
    #[serde(rename = "descanso")]
    Rest,
    #[serde(rename = "ritmo")]
    Pace,
    #[serde(rename = "rpe")]
    Rpe,
    #[serde(rename = "rir")]
    Rir,
    #[serde(rename = "rpm")]
    Rpm,
    #[serde(rename = "speed")]
    Speed,
    #[serde(rename = "cadence")]
    Cadence,
    #[serde(rename = "distance")]
    Distance,
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "calories")]
    Calories,
    #[serde(rename = "round")]
    Round,
}

/// How a cell mapped to a field is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Exercise name, kept as text and used for grouping.
    Name,
    /// Integer, defaults to 0 when unparseable.
    Integer,
    /// Floating point, defaults to 0.0 when unparseable.
    Float,
    /// Raw text.
    Text,
}

impl FieldName {
    pub const ALL: [FieldName; 15] = [
        FieldName::Exercise,
        FieldName::Series,
        FieldName::Repetitions,
        FieldName::Weight,
        FieldName::Rest,
        FieldName::Pace,
        FieldName::Rpe,
        FieldName::Rir,
        FieldName::Rpm,
        FieldName::Speed,
        FieldName::Cadence,
        FieldName::Distance,
        FieldName::Height,
        FieldName::Calories,
        FieldName::Round,
    ];

    /// Wire token of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exercise => "ejercicios",
            Self::Series => "series",
            Self::Repetitions => "repeticiones",
            Self::Weight => "peso",
            Self::Rest => "descanso",
            Self::Pace => "ritmo",
            Self::Rpe => "rpe",
            Self::Rir => "rir",
            Self::Rpm => "rpm",
            Self::Speed => "speed",
            Self::Cadence => "cadence",
            Self::Distance => "distance",
            Self::Height => "height",
            Self::Calories => "calories",
            Self::Round => "round",
        }
    }

    /// Parse a wire token.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL.into_iter().find(|f| f.as_str() == token)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Exercise => ValueKind::Name,
            Self::Weight | Self::Speed | Self::Distance | Self::Height => ValueKind::Float,
            Self::Pace => ValueKind::Text,
            Self::Series
            | Self::Repetitions
            | Self::Rest
            | Self::Rpe
            | Self::Rir
            | Self::Rpm
            | Self::Cadence
            | Self::Calories
            | Self::Round => ValueKind::Integer,
        }
    }

    /// Short human description, used by the `fields` command.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Exercise => "Exercise name (required)",
            Self::Series => "Number of sets (sameVariable format only)",
            Self::Repetitions => "Repetitions",
            Self::Weight => "Weight / load",
            Self::Rest => "Rest between sets",
            Self::Pace => "Pace, kept as text",
            Self::Rpe => "Rate of perceived exertion",
            Self::Rir => "Reps in reserve",
            Self::Rpm => "Revolutions per minute",
            Self::Speed => "Speed",
            Self::Cadence => "Cadence",
            Self::Distance => "Distance",
            Self::Height => "Height (jumps, box, step)",
            Self::Calories => "Calories",
            Self::Round => "Round number (circuits)",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unknown field '{}'", s))
    }
}

// =============================================================================
// CSV Format
// =============================================================================

/// Tabular encoding of the routine, chosen by the caller before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CsvFormat {
    /// One row per exercise, one implicit set.
    CommaDelimited,
    /// One row per exercise, repeated `series` times with identical values.
    SameVariable,
    /// One row per set; set numbers are derived from runs of equal names.
    ExercisePerSet,
}

impl CsvFormat {
    pub const ALL: [CsvFormat; 3] = [
        CsvFormat::CommaDelimited,
        CsvFormat::SameVariable,
        CsvFormat::ExercisePerSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommaDelimited => "commaDelimited",
            Self::SameVariable => "sameVariable",
            Self::ExercisePerSet => "exercisePerSet",
        }
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CsvFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown format '{}' (expected commaDelimited, sameVariable or exercisePerSet)",
                    s
                )
            })
    }
}

// =============================================================================
// Raw table
// =============================================================================

/// Header row and data rows of a CSV file.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

// =============================================================================
// Flat parsed data
// =============================================================================

/// Flat representation of every (exercise, set) pair.
///
/// Index `i` across all populated vectors describes one set. Vectors for
/// fields that were not mapped stay empty (`None` for the optional ones).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRoutineData {
    pub exercises: Vec<String>,
    pub series: Vec<i64>,
    pub repetitions: Vec<i64>,
    pub weight: Vec<f64>,
    pub rest: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rir: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<Vec<i64>>,
}

impl ParsedRoutineData {
    /// Number of flat entries.
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

// =============================================================================
// Formatted output
// =============================================================================

/// One set of an exercise. Only fields defined for that set are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedExerciseSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rir: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
}

/// An exercise with its sets in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedExercise {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub sets: Vec<FormattedExerciseSet>,
}

impl FormattedExercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: None,
            sets: Vec::new(),
        }
    }
}

/// The three fields shown as primary columns for a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub campo1: FieldName,
    pub campo2: FieldName,
    pub campo3: FieldName,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            campo1: FieldName::Repetitions,
            campo2: FieldName::Weight,
            campo3: FieldName::Rest,
        }
    }
}

/// Final product of an import: grouped exercises plus render config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedRoutineData {
    pub exercises: Vec<FormattedExercise>,
    pub render_config: RenderConfig,
}

impl FormattedRoutineData {
    /// Total number of sets across all exercises.
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

// =============================================================================
// Tests
// =============================================================================
