//! Transformation module.
//!
//! This module handles raw table to routine transformation:
//! - Rows: the three format-specific row parsers
//! - Formatter: flat entries to grouped exercises
//! - Pipeline: main import pipeline

pub mod formatter;
pub mod pipeline;
pub mod rows;

pub use formatter::format_routine;
pub use pipeline::*;
pub use rows::{parse_rows, CellWarning, RowParseOutcome, SkippedRow};
