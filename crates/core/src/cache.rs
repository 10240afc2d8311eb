//! Metadata cache: the JSON list of previously generated entities.
//!
//! The cache is what makes incremental regeneration possible: it records
//! which entities exist so the registry can be rebuilt without refetching
//! every schema. A missing or corrupt cache is never an error — the worst
//! case is a full regeneration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

/// Cache filename inside the output directory.
pub const CACHE_FILENAME: &str = "entities.json";

/// Metadata of one generated entity, persisted across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    /// Remote database identifier.
    pub id: String,
    /// Derived type name (`Books`).
    pub class_name: String,
    /// Human display name.
    pub display_name: String,
    /// Lower-camel accessor name (`books`).
    pub camel_case_name: String,
}

/// Cache path inside an output directory.
pub fn cache_path(output_dir: &Path) -> PathBuf {
    output_dir.join(CACHE_FILENAME)
}

/// Read the cache. Absent or corrupt files yield an empty list.
pub fn read_cache(path: &Path) -> Vec<EntityMeta> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "metadata cache is corrupt; treating as empty"
            );
            Vec::new()
        }
    }
}

/// Write the cache wholesale.
pub fn write_cache(path: &Path, entries: &[EntityMeta]) -> Result<(), GenerateError> {
    let contents =
        serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string());
    fs::write(path, contents + "\n").map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge for an incremental pass: keep cached entries whose id is still
/// configured, then insert the fresh entity, replacing any previous entry
/// with the same id in place.
pub fn merge_incremental(
    cached: Vec<EntityMeta>,
    configured: &[String],
    fresh: EntityMeta,
) -> Vec<EntityMeta> {
    let mut merged: Vec<EntityMeta> = cached
        .into_iter()
        .filter(|entry| configured.contains(&entry.id))
        .collect();
    match merged.iter_mut().find(|entry| entry.id == fresh.id) {
        Some(existing) => *existing = fresh,
        None => merged.push(fresh),
    }
    merged
}
