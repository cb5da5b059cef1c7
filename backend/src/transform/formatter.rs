//! Group flat parsed data into exercises with nested sets.
//!
//! ```text
//! Flat entries                      Formatted routine
//! ┌───────────────────────────┐     ┌──────────────────────────────┐
//! │ Curl   reps 10  peso 12   │     │ Curl   sets: [10x12, 8x14]   │
//! │ Curl   reps 8   peso 14   │ →   ├──────────────────────────────┤
//! │ Press  reps 12            │     │ Press  sets: [12]            │
//! └───────────────────────────┘     └──────────────────────────────┘
//! ```
//!
//! Exercises keep first-seen order; sets keep input order. The render config
//! is derived from the mapping, not from the data.

use std::collections::HashMap;

use crate::models::{
    FieldMapping, FieldName, FormattedExercise, FormattedExerciseSet, FormattedRoutineData,
    ParsedRoutineData, RenderConfig,
};

impl RenderConfig {
    /// Pick the three display fields from the mapping.
    ///
    /// Mapped fields other than `ejercicios` fill `campo1..campo3` in column
    /// order. Unfilled slots fall back to the default for that position
    /// (`repeticiones`, `peso`, `descanso`), so a mapping with only `rpe`
    /// yields `rpe, peso, descanso`.
    pub fn from_mapping(mapping: &FieldMapping) -> Self {
        let defaults = RenderConfig::default();
        let mut chosen = mapping
            .iter()
            .map(|(_, field)| field)
            .filter(|field| *field != FieldName::Exercise);

        RenderConfig {
            campo1: chosen.next().unwrap_or(defaults.campo1),
            campo2: chosen.next().unwrap_or(defaults.campo2),
            campo3: chosen.next().unwrap_or(defaults.campo3),
        }
    }
}

/// Group `parsed` by exercise name.
pub fn format_routine(parsed: &ParsedRoutineData, mapping: &FieldMapping) -> FormattedRoutineData {
    let render_config = RenderConfig::from_mapping(mapping);

    let mut exercises: Vec<FormattedExercise> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for (i, name) in parsed.exercises.iter().enumerate() {
        let slot = *by_name.entry(name.as_str()).or_insert_with(|| {
            exercises.push(FormattedExercise::new(name.clone()));
            exercises.len() - 1
        });
        exercises[slot].sets.push(build_set(parsed, i));
    }

    FormattedRoutineData {
        exercises,
        render_config,
    }
}

fn at<T: Clone>(values: &[T], i: usize) -> Option<T> {
    values.get(i).cloned()
}

fn opt_at<T: Clone>(values: &Option<Vec<T>>, i: usize) -> Option<T> {
    values.as_ref().and_then(|v| v.get(i).cloned())
}

fn build_set(parsed: &ParsedRoutineData, i: usize) -> FormattedExerciseSet {
    FormattedExerciseSet {
        reps: at(&parsed.repetitions, i),
        weight: at(&parsed.weight, i),
        rest: at(&parsed.rest, i),
        rpe: opt_at(&parsed.rpe, i),
        rir: opt_at(&parsed.rir, i),
        rpm: opt_at(&parsed.rpm, i),
        speed: opt_at(&parsed.speed, i),
        cadence: opt_at(&parsed.cadence, i),
        distance: opt_at(&parsed.distance, i),
        height: opt_at(&parsed.height, i),
        calories: opt_at(&parsed.calories, i),
        round: opt_at(&parsed.round, i),
        pace: opt_at(&parsed.pace, i),
    }
}
