//! End-to-end import scenarios: CSV text in, grouped routine out.

use routine_import::config::MAX_SERIES_PER_ROW;
use routine_import::{
    decode_content, import_bytes, import_table, import_text, parse_rows, read_raw_table,
    CsvFormat, FieldMapping, FieldName, ImportOptions, RenderConfig,
};

fn mapping(json: &str) -> FieldMapping {
    FieldMapping::from_json_str(json).unwrap()
}

fn options() -> ImportOptions {
    ImportOptions::default()
}

// =============================================================================
// Per-format scenarios
// =============================================================================

#[test]
fn test_comma_delimited_single_row() {
    let csv = "ejercicio,reps,peso,descanso\nSentadilla,10,80,60\n";
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones","2":"peso","3":"descanso"}"#);

    let report = import_text(csv, CsvFormat::CommaDelimited, &m, &options()).unwrap();
    let routine = &report.routine;

    assert_eq!(routine.exercises.len(), 1);
    assert_eq!(routine.exercises[0].name, "Sentadilla");
    assert_eq!(routine.exercises[0].sets.len(), 1);

    let set = &routine.exercises[0].sets[0];
    assert_eq!(set.reps, Some(10));
    assert_eq!(set.weight, Some(80.0));
    assert_eq!(set.rest, Some(60));
    assert_eq!(routine.render_config, RenderConfig::default());
}

#[test]
fn test_same_variable_expands_series() {
    let csv = "ejercicio,series,reps,peso,descanso\nPress banca,3,8,40,90\n";
    let m = mapping(
        r#"{"0":"ejercicios","1":"series","2":"repeticiones","3":"peso","4":"descanso"}"#,
    );

    let table = read_raw_table(csv).unwrap();
    let outcome = parse_rows(&table, &m, CsvFormat::SameVariable).unwrap();
    assert_eq!(outcome.data.series, vec![1, 2, 3]);
    assert_eq!(outcome.data.exercises, vec!["Press banca"; 3]);

    let report = import_text(csv, CsvFormat::SameVariable, &m, &options()).unwrap();
    let exercise = &report.routine.exercises[0];
    assert_eq!(exercise.name, "Press banca");
    assert_eq!(exercise.sets.len(), 3);
    for set in &exercise.sets {
        assert_eq!(set.reps, Some(8));
        assert_eq!(set.weight, Some(40.0));
        assert_eq!(set.rest, Some(90));
    }
}

#[test]
fn test_exercise_per_set_counter_resets_on_name_change() {
    let csv = "ejercicio,reps,peso\nCurl,10,12\nCurl,8,14\nPress,12,20\n";
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones","2":"peso"}"#);

    let table = read_raw_table(csv).unwrap();
    let outcome = parse_rows(&table, &m, CsvFormat::ExercisePerSet).unwrap();
    assert_eq!(outcome.data.series, vec![1, 2, 1]);

    let report = import_text(csv, CsvFormat::ExercisePerSet, &m, &options()).unwrap();
    let names: Vec<&str> = report.routine.exercises.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Curl", "Press"]);

    let curl = &report.routine.exercises[0];
    assert_eq!(curl.sets.len(), 2);
    assert_eq!(curl.sets[0].reps, Some(10));
    assert_eq!(curl.sets[0].weight, Some(12.0));
    assert_eq!(curl.sets[1].reps, Some(8));
    assert_eq!(curl.sets[1].weight, Some(14.0));

    let press = &report.routine.exercises[1];
    assert_eq!(press.sets.len(), 1);
    assert_eq!(press.sets[0].reps, Some(12));
}

// =============================================================================
// Properties
// =============================================================================

const MIXED: &str = "ejercicio,series,reps,peso\n\
                     Sentadilla,2,10,80\n\
                     Remo,0,12,50\n\
                     Sentadilla,abc,8,85\n\
                     ,4,1,1\n\
                     Remo,3,10,55\n";

fn mixed_mapping() -> FieldMapping {
    mapping(r#"{"0":"ejercicios","1":"series","2":"repeticiones","3":"peso"}"#)
}

#[test]
fn test_entry_count_conservation() {
    let m = mixed_mapping();
    let table = read_raw_table(MIXED).unwrap();
    let named_rows = table.rows.iter().filter(|r| !r[0].is_empty()).count();
    assert_eq!(named_rows, 4);

    let comma = parse_rows(&table, &m, CsvFormat::CommaDelimited).unwrap();
    assert_eq!(comma.data.len(), named_rows);
    assert!(comma.data.series.is_empty());

    let per_set = parse_rows(&table, &m, CsvFormat::ExercisePerSet).unwrap();
    assert_eq!(per_set.data.len(), named_rows);

    // 2 + max(1, 0) + max(1, 0 for "abc") + 3
    let same = parse_rows(&table, &m, CsvFormat::SameVariable).unwrap();
    assert_eq!(same.data.len(), 2 + 1 + 1 + 3);
    assert_eq!(same.data.series, vec![1, 2, 1, 1, 1, 2, 3]);
}

#[test]
fn test_grouping_sums_to_entry_count() {
    let m = mixed_mapping();
    for format in CsvFormat::ALL {
        let report = import_text(MIXED, format, &m, &options()).unwrap();

        assert_eq!(report.routine.set_count(), report.entry_count, "{}", format);
        assert_eq!(report.skipped.len(), 1);

        let names: Vec<&str> = report.routine.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sentadilla", "Remo"], "{}", format);
    }
}

#[test]
fn test_exercise_per_set_counter_ignores_skipped_rows() {
    let csv = "ejercicio,reps\nCurl,10\n,0\nCurl,8\n";
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones"}"#);

    let table = read_raw_table(csv).unwrap();
    let outcome = parse_rows(&table, &m, CsvFormat::ExercisePerSet).unwrap();
    assert_eq!(outcome.data.series, vec![1, 2]);
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn test_render_config_defaults() {
    let csv = "ejercicio,rpe\nPlancha,7\n";

    let only_exercise = mapping(r#"{"0":"ejercicios"}"#);
    let report = import_text(csv, CsvFormat::CommaDelimited, &only_exercise, &options()).unwrap();
    assert_eq!(report.routine.render_config, RenderConfig::default());

    let with_rpe = mapping(r#"{"0":"ejercicios","1":"rpe"}"#);
    let report = import_text(csv, CsvFormat::CommaDelimited, &with_rpe, &options()).unwrap();
    let config = report.routine.render_config;
    assert_eq!(config.campo1, FieldName::Rpe);
    assert_eq!(config.campo2, FieldName::Weight);
    assert_eq!(config.campo3, FieldName::Rest);
    assert_eq!(report.routine.exercises[0].sets[0].rpe, Some(7));
}

#[test]
fn test_malformed_weight_defaults_to_zero() {
    let csv = "ejercicio,reps,peso\nDominadas,10,abc\n";
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones","2":"peso"}"#);

    let report = import_text(csv, CsvFormat::CommaDelimited, &m, &options()).unwrap();
    assert_eq!(report.routine.exercises[0].sets[0].weight, Some(0.0));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, FieldName::Weight);
    assert_eq!(report.warnings[0].value, "abc");

    let strict = ImportOptions {
        strict: true,
        ..ImportOptions::default()
    };
    assert!(import_text(csv, CsvFormat::CommaDelimited, &m, &strict).is_err());
}

#[test]
fn test_numeric_prefixes_are_kept() {
    let csv = "ejercicio,reps,peso\nPeso muerto,10 reps,82.5kg\n";
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones","2":"peso"}"#);

    let report = import_text(csv, CsvFormat::CommaDelimited, &m, &options()).unwrap();
    let set = &report.routine.exercises[0].sets[0];
    assert_eq!(set.reps, Some(10));
    assert_eq!(set.weight, Some(82.5));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_import_is_idempotent() {
    let m = mixed_mapping();
    for format in CsvFormat::ALL {
        let first = import_text(MIXED, format, &m, &options()).unwrap();
        let second = import_text(MIXED, format, &m, &options()).unwrap();
        assert_eq!(first, second);
    }
}

// =============================================================================
// Encodings
// =============================================================================

#[test]
fn test_latin1_content_is_decoded() {
    let mut bytes = b"ejercicio,reps\nPress inclinado (m".to_vec();
    bytes.push(0xE1);
    bytes.extend_from_slice(b"quina),10\nExtensi");
    bytes.push(0xF3);
    bytes.extend_from_slice(b"n de cu");
    bytes.push(0xE1);
    bytes.extend_from_slice(b"driceps,12\n");

    let content = decode_content(&bytes, "iso-8859-1").unwrap();
    let table = read_raw_table(&content).unwrap();
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones"}"#);
    let report = import_table(
        &table,
        CsvFormat::CommaDelimited,
        &m,
        &options(),
        "iso-8859-1".to_string(),
    )
    .unwrap();

    assert_eq!(report.encoding, "iso-8859-1");
    assert_eq!(report.routine.exercises[0].name, "Press inclinado (máquina)");
    assert_eq!(report.routine.exercises[1].name, "Extensión de cuádriceps");
}

#[test]
fn test_latin1_bytes_are_detected() {
    let mut bytes = b"ejercicio,reps\nPress inclinado (m".to_vec();
    bytes.push(0xE1);
    bytes.extend_from_slice(b"quina),10\nExtensi");
    bytes.push(0xF3);
    bytes.extend_from_slice(b"n de cu");
    bytes.push(0xE1);
    bytes.extend_from_slice(b"driceps,12\n");

    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones"}"#);
    let report = import_bytes(&bytes, CsvFormat::CommaDelimited, &m, &options()).unwrap();

    assert_eq!(report.encoding, "iso-8859-1");
    let names: Vec<&str> = report.routine.exercises.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Press inclinado (máquina)", "Extensión de cuádriceps"]);
}

#[test]
fn test_same_variable_series_is_capped() {
    let csv = "e,s,r\nCurl,2000000,10\n";
    let m = mapping(r#"{"0":"ejercicios","1":"series","2":"repeticiones"}"#);

    let report = import_text(csv, CsvFormat::SameVariable, &m, &options()).unwrap();
    assert_eq!(report.entry_count, MAX_SERIES_PER_ROW as usize);
    assert_eq!(report.routine.exercises[0].sets.len(), MAX_SERIES_PER_ROW as usize);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, FieldName::Series);
}

#[test]
fn test_utf8_bytes_with_bom() {
    let bytes = "\u{feff}ejercicio,reps\nElevación lateral,15\n".as_bytes();
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones"}"#);

    let report = import_bytes(bytes, CsvFormat::CommaDelimited, &m, &options()).unwrap();
    assert_eq!(report.headers, vec!["ejercicio", "reps"]);
    assert_eq!(report.routine.exercises[0].name, "Elevación lateral");
}

#[test]
fn test_output_serializes_sparse_sets() {
    let csv = "ejercicio,reps\nPlancha,1\n";
    let m = mapping(r#"{"0":"ejercicios","1":"repeticiones"}"#);

    let report = import_text(csv, CsvFormat::CommaDelimited, &m, &options()).unwrap();
    let json = serde_json::to_value(&report.routine).unwrap();

    assert_eq!(json["renderConfig"]["campo1"], "repeticiones");
    let set = &json["exercises"][0]["sets"][0];
    assert_eq!(set["reps"], 1);
    assert!(set.get("rpe").is_none());
}
