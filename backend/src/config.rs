//! Import configuration.
//!
//! Constants with environment overrides. The binary loads a `.env` file
//! (if present) before anything reads these.

use std::env;
use std::path::PathBuf;

/// Directory where mapping templates are stored (relative to current dir).
pub const DEFAULT_REGISTRY_DIR: &str = ".routine-import/mappings";

/// Environment variable overriding [`DEFAULT_REGISTRY_DIR`].
pub const REGISTRY_DIR_ENV: &str = "ROUTINE_IMPORT_REGISTRY_DIR";

/// Maximum CSV size accepted by [`crate::import_file`] (5 MB).
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Largest set count one sameVariable row may expand to; larger `series`
/// cells are clamped and reported.
pub const MAX_SERIES_PER_ROW: i64 = 100;

/// How many cell warnings or skipped rows are logged in detail.
pub const MAX_LOGGED_WARNINGS: usize = 5;

/// Set to `1` or `true` to stop progress logs from echoing to stderr.
pub const QUIET_ENV: &str = "ROUTINE_IMPORT_QUIET";

/// Registry directory, honouring `ROUTINE_IMPORT_REGISTRY_DIR`.
pub fn registry_dir() -> PathBuf {
    match env::var(REGISTRY_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_REGISTRY_DIR),
    }
}

/// Whether `ROUTINE_IMPORT_QUIET` asks for silent logs.
pub fn quiet_logs() -> bool {
    env::var(QUIET_ENV)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
