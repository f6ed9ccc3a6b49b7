//! Model discovery
//!
//! One recursive walk collects definitions and schema documents; pairing is
//! a set intersection on logical model names. A schema document may declare
//! any number of models, so several artifacts can point at the same file.

use crate::artifact::{Artifact, ArtifactSet};
use crate::error::RegistryError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subset of a schema document the registry cares about
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

/// One `models:` entry; all other keys are ignored
#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: Option<String>,
}

/// Discovers and pairs model artifacts under a source root
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    /// Create a registry over the given models directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover all artifacts under the root
    ///
    /// Definitions are keyed by filename stem; documentation names come from
    /// the `models:` entries of every parseable schema document. A document
    /// that fails to read or parse is logged and treated as absent.
    ///
    /// # Errors
    /// `RegistryError::Walk` when the walk itself fails (missing root,
    /// unreadable directory).
    pub fn discover(&self) -> Result<ArtifactSet, RegistryError> {
        let mut definitions: IndexMap<String, PathBuf> = IndexMap::new();
        let mut documented: IndexMap<String, PathBuf> = IndexMap::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|source| RegistryError::Walk {
                root: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("sql") => {
                    if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                        definitions.insert(stem.to_string(), path.to_path_buf());
                    }
                }
                Some("yml" | "yaml") => register_schema_entries(path, &mut documented),
                _ => {}
            }
        }

        let mut set = ArtifactSet::new(self.root.clone());
        for (name, definition_path) in definitions {
            let artifact = match documented.get(&name) {
                Some(metadata_path) => {
                    Artifact::new(name, definition_path).with_metadata(metadata_path.clone())
                }
                None => Artifact::new(name, definition_path),
            };
            set.insert(artifact);
        }

        tracing::info!(
            root = %self.root.display(),
            definitions = set.len(),
            paired = set.paired().len(),
            missing_docs = set.unpaired().len(),
            "model discovery completed"
        );

        Ok(set)
    }
}

/// Record every model name a schema document declares
///
/// Read and parse failures are logged and swallowed here: one bad document
/// must not abort discovery of the rest of the project.
fn register_schema_entries(path: &Path, documented: &mut IndexMap<String, PathBuf>) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable schema document");
            return;
        }
    };

    let document: SchemaDocument = match serde_yaml::from_str(&text) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping malformed schema document");
            return;
        }
    };

    for entry in document.models {
        if let Some(name) = entry.name {
            documented.insert(name, path.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn pairing_is_intersection_and_difference() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orders.sql", "select 1 as id");
        write(dir.path(), "customers.sql", "select 2 as id");
        write(
            dir.path(),
            "schema.yml",
            "models:\n  - name: orders\n    description: orders model\n",
        );

        let set = Registry::new(dir.path()).discover().unwrap();

        assert_eq!(set.paired().len(), 1);
        assert!(set.paired().contains_key("orders"));
        assert_eq!(set.unpaired().len(), 1);
        assert!(set.unpaired().contains_key("customers"));
    }

    #[test]
    fn one_document_declares_many_models() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orders.sql", "select 1");
        write(dir.path(), "customers.sql", "select 2");
        write(
            dir.path(),
            "schema.yml",
            "models:\n  - name: orders\n  - name: customers\n",
        );

        let set = Registry::new(dir.path()).discover().unwrap();

        assert_eq!(set.paired().len(), 2);
        let orders = &set.paired()["orders"];
        let customers = &set.paired()["customers"];
        assert_eq!(orders.metadata_path(), customers.metadata_path());
    }

    #[test]
    fn malformed_document_does_not_abort_discovery() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orders.sql", "select 1");
        write(dir.path(), "customers.sql", "select 2");
        write(dir.path(), "broken.yml", "models:\n  - name: [unclosed\n");
        write(dir.path(), "good.yml", "models:\n  - name: customers\n");

        let set = Registry::new(dir.path()).discover().unwrap();

        assert!(set.paired().contains_key("customers"));
        assert!(set.unpaired().contains_key("orders"));
    }

    #[test]
    fn pairing_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orders.sql", "select 1");
        write(dir.path(), "schema.yml", "models:\n  - name: Orders\n");

        let set = Registry::new(dir.path()).discover().unwrap();

        assert!(set.paired().is_empty());
        assert!(set.unpaired().contains_key("orders"));
    }

    #[test]
    fn walk_descends_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "marts/finance/orders.sql", "select 1");
        write(
            dir.path(),
            "marts/finance/schema.yaml",
            "models:\n  - name: orders\n",
        );

        let set = Registry::new(dir.path()).discover().unwrap();

        assert!(set.paired().contains_key("orders"));
    }

    #[test]
    fn entries_without_names_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orders.sql", "select 1");
        write(
            dir.path(),
            "schema.yml",
            "models:\n  - description: no name here\n  - name: orders\n",
        );

        let set = Registry::new(dir.path()).discover().unwrap();

        assert!(set.paired().contains_key("orders"));
    }

    #[test]
    fn missing_root_is_fatal() {
        let result = Registry::new("/nonexistent/models").discover();
        assert!(matches!(result, Err(RegistryError::Walk { .. })));
    }
}
