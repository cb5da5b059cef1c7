//! Mapping Registry - Store and reuse field mappings
//!
//! Saves mappings to disk and matches them to CSV files by their headers, so a
//! coach exporting the same spreadsheet every week maps its columns once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config;
use crate::error::{RegistryError, RegistryResult};
use crate::models::{CsvFormat, FieldMapping};

/// A stored mapping with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMapping {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// The field mapping
    pub mapping: FieldMapping,
    /// Format the mapping was used with, if known
    #[serde(default)]
    pub format: Option<CsvFormat>,
    /// CSV headers this mapping was created for
    pub csv_columns: Vec<String>,
    pub created_at: String,
    pub last_used: Option<String>,
    pub use_count: u32,
}

/// Registry of saved mappings
pub struct MappingRegistry {
    registry_dir: PathBuf,
    mappings: HashMap<String, StoredMapping>,
}

impl MappingRegistry {
    /// Open the registry in the configured directory
    pub fn new() -> Self {
        Self::with_dir(config::registry_dir())
    }

    /// Open a registry in a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let mut registry = Self {
            registry_dir: PathBuf::from(dir.as_ref()),
            mappings: HashMap::new(),
        };
        registry.load_all();
        registry
    }

    /// Load every readable mapping file; unreadable files are ignored
    fn load_all(&mut self) {
        let entries = match fs::read_dir(&self.registry_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(stored) = serde_json::from_str::<StoredMapping>(&content) {
                        self.mappings.insert(stored.id.clone(), stored);
                    }
                }
            }
        }
    }

    /// All stored mappings, most used first
    pub fn list(&self) -> Vec<&StoredMapping> {
        let mut all: Vec<&StoredMapping> = self.mappings.values().collect();
        all.sort_by(|a, b| b.use_count.cmp(&a.use_count).then_with(|| a.name.cmp(&b.name)));
        all
    }

    pub fn get(&self, id: &str) -> Option<&StoredMapping> {
        self.mappings.get(id)
    }

    /// Mappings whose headers overlap `csv_columns` by more than half,
    /// best match first
    pub fn find_compatible(&self, csv_columns: &[String]) -> Vec<(&StoredMapping, f64)> {
        let mut compatible: Vec<_> = self
            .mappings
            .values()
            .filter_map(|m| {
                let score = calculate_compatibility(&m.csv_columns, csv_columns);
                if score > 0.5 {
                    Some((m, score))
                } else {
                    None
                }
            })
            .collect();

        compatible.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.use_count.cmp(&a.0.use_count))
        });

        compatible
    }

    /// Save a new mapping, returning its ID
    pub fn save(
        &mut self,
        mapping: FieldMapping,
        format: Option<CsvFormat>,
        name: &str,
        csv_columns: Vec<String>,
    ) -> RegistryResult<String> {
        fs::create_dir_all(&self.registry_dir)?;

        let id = generate_id(name);
        let stored = StoredMapping {
            id: id.clone(),
            name: name.to_string(),
            mapping,
            format,
            csv_columns,
            created_at: chrono::Utc::now().to_rfc3339(),
            last_used: None,
            use_count: 0,
        };

        self.write(&stored)?;
        self.mappings.insert(id.clone(), stored);
        Ok(id)
    }

    /// Import a mapping from a JSON file in the dashboard format
    pub fn import(
        &mut self,
        path: &Path,
        name: Option<&str>,
        format: Option<CsvFormat>,
        csv_columns: Vec<String>,
    ) -> RegistryResult<String> {
        let content = fs::read_to_string(path)?;
        let mapping = FieldMapping::from_json_str(&content)?;

        let mapping_name = name.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("imported")
        });

        self.save(mapping, format, mapping_name, csv_columns)
    }

    /// Record that a mapping was used for an import
    pub fn record_use(&mut self, id: &str) -> RegistryResult<()> {
        let stored = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        stored.last_used = Some(chrono::Utc::now().to_rfc3339());
        stored.use_count += 1;

        let stored = stored.clone();
        self.write(&stored)
    }

    pub fn delete(&mut self, id: &str) -> RegistryResult<()> {
        if self.mappings.remove(id).is_none() {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        fs::remove_file(self.path_for(id))?;
        Ok(())
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.registry_dir.join(format!("{}.json", id))
    }

    fn write(&self, stored: &StoredMapping) -> RegistryResult<()> {
        let content = serde_json::to_string_pretty(stored)?;
        fs::write(self.path_for(&stored.id), content)?;
        Ok(())
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Share of stored headers present in the CSV (case-insensitive)
fn calculate_compatibility(stored: &[String], csv: &[String]) -> f64 {
    if stored.is_empty() {
        return 0.0;
    }

    let csv_lower: Vec<String> = csv.iter().map(|c| c.trim().to_lowercase()).collect();
    let match_count = stored
        .iter()
        .filter(|col| csv_lower.contains(&col.trim().to_lowercase()))
        .count();

    match_count as f64 / stored.len() as f64
}

/// Slug of the name plus a millisecond timestamp
fn generate_id(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let timestamp = chrono::Utc::now().timestamp_millis();
    format!("{}-{}", slug, timestamp)
}
