//! The printer: persists rendered modules, snapshots, and the registry.
//!
//! A full pass recreates the output directory wholesale; an incremental
//! pass only touches one entity's files plus the registry. Write failures
//! are fatal for the entity being written, not for the pass — the
//! orchestrator in [`crate::generate`] isolates them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{self, EntityMeta};
use crate::client::SchemaSnapshot;
use crate::error::GenerateError;
use crate::schema::naming;

/// Filename of the generated registry module.
pub const REGISTRY_FILENAME: &str = "mod.rs";

/// Writes generated artifacts under one output directory.
#[derive(Debug, Clone)]
pub struct Printer {
    out_dir: PathBuf,
}

impl Printer {
    /// Printer rooted at `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// The output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path of the metadata cache file.
    pub fn cache_path(&self) -> PathBuf {
        cache::cache_path(&self.out_dir)
    }

    /// Recreate the output directory from scratch. Destructive; full passes
    /// only.
    pub fn clean(&self) -> Result<(), GenerateError> {
        if self.out_dir.exists() {
            fs::remove_dir_all(&self.out_dir).map_err(|source| GenerateError::Io {
                path: self.out_dir.clone(),
                source,
            })?;
        }
        self.ensure_dir()
    }

    /// Create the output directory if missing. Incremental passes.
    pub fn ensure_dir(&self) -> Result<(), GenerateError> {
        fs::create_dir_all(&self.out_dir).map_err(|source| GenerateError::Io {
            path: self.out_dir.clone(),
            source,
        })
    }

    /// Write one entity's coupled representations: the source module and
    /// the directly loadable schema snapshot.
    pub fn write_entity(
        &self,
        module_name: &str,
        source: &str,
        snapshot: &SchemaSnapshot,
    ) -> Result<(), GenerateError> {
        let module_path = self.out_dir.join(format!("{module_name}.rs"));
        tracing::debug!(path = %module_path.display(), "writing entity module");
        write_file(&module_path, source)?;

        let snapshot_path = self.out_dir.join(format!("{module_name}.schema.json"));
        let rendered = serde_json::to_string_pretty(snapshot)
            .unwrap_or_else(|_| "{}".to_string());
        write_file(&snapshot_path, &(rendered + "\n"))
    }

    /// Rewrite the registry module enumerating all generated entities, in
    /// cache order.
    pub fn write_registry(&self, entries: &[EntityMeta]) -> Result<(), GenerateError> {
        let mut out = String::from(
            "//! Generated by ntx. Do not edit by hand.\n//!\n//! Registry of generated entity modules.\n\n",
        );
        for entry in entries {
            out.push_str(&format!("pub mod {};\n", module_name_of(entry)));
        }
        if !entries.is_empty() {
            out.push('\n');
        }
        for entry in entries {
            let module = module_name_of(entry);
            out.push_str(&format!(
                "pub use {module}::{{{}Row, {module}}};\n",
                entry.class_name
            ));
        }
        write_file(&self.out_dir.join(REGISTRY_FILENAME), &out)
    }
}

/// Module name of a cached entity, derived from its camel accessor name.
pub fn module_name_of(entry: &EntityMeta) -> String {
    naming::ident_safe(&naming::camel_to_snake(&entry.camel_case_name))
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    fs::write(path, contents).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(id: &str, class: &str, camel: &str) -> EntityMeta {
        EntityMeta {
            id: id.to_string(),
            class_name: class.to_string(),
            display_name: class.to_string(),
            camel_case_name: camel.to_string(),
        }
    }

    fn snapshot() -> SchemaSnapshot {
        SchemaSnapshot {
            id: "db1".to_string(),
            class_name: "Books".to_string(),
            display_name: "Books".to_string(),
            camel_case_name: "books".to_string(),
            columns: Vec::new(),
        }
    }

    #[test]
    fn test_write_entity_produces_both_representations() {
        let dir = TempDir::new().unwrap();
        let printer = Printer::new(dir.path().join("notion"));
        printer.ensure_dir().unwrap();
        printer
            .write_entity("books", "pub const DATABASE_ID: &str = \"db1\";\n", &snapshot())
            .unwrap();

        assert!(printer.out_dir().join("books.rs").exists());
        let raw: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(printer.out_dir().join("books.schema.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(raw["id"], "db1");
    }

    #[test]
    fn test_clean_is_destructive() {
        let dir = TempDir::new().unwrap();
        let printer = Printer::new(dir.path().join("notion"));
        printer.ensure_dir().unwrap();
        fs::write(printer.out_dir().join("stale.rs"), "stale").unwrap();
        printer.clean().unwrap();
        assert!(printer.out_dir().exists());
        assert!(!printer.out_dir().join("stale.rs").exists());
    }

    #[test]
    fn test_registry_lists_entities_in_cache_order() {
        let dir = TempDir::new().unwrap();
        let printer = Printer::new(dir.path());
        printer
            .write_registry(&[
                meta("b", "Recipes", "recipes"),
                meta("a", "BookClub", "bookClub"),
            ])
            .unwrap();
        let registry = fs::read_to_string(dir.path().join(REGISTRY_FILENAME)).unwrap();
        let expected = "//! Generated by ntx. Do not edit by hand.\n//!\n//! Registry of generated entity modules.\n\npub mod recipes;\npub mod book_club;\n\npub use recipes::{RecipesRow, recipes};\npub use book_club::{BookClubRow, book_club};\n";
        assert_eq!(registry, expected);
    }

    #[test]
    fn test_registry_for_empty_cache_has_no_modules() {
        let dir = TempDir::new().unwrap();
        let printer = Printer::new(dir.path());
        printer.write_registry(&[]).unwrap();
        let registry = fs::read_to_string(dir.path().join(REGISTRY_FILENAME)).unwrap();
        assert!(!registry.contains("pub mod"));
    }
}
