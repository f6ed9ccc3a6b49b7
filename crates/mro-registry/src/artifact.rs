//! Artifact model
//!
//! An artifact is a named pair of a SQL definition and the YAML document
//! declaring it. Artifacts are created during discovery and immutable
//! afterwards. Sets are insertion-ordered (discovery order) so downstream
//! scheduling and reporting are stable across runs.

use crate::error::RegistryError;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A named pair of definition and documentation files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    name: String,
    definition_path: PathBuf,
    metadata_path: Option<PathBuf>,
}

impl Artifact {
    /// Create an artifact with no documentation pairing yet
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, definition_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            definition_path: definition_path.into(),
            metadata_path: None,
        }
    }

    /// With the schema document that declares this model
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata_path: impl Into<PathBuf>) -> Self {
        self.metadata_path = Some(metadata_path.into());
        self
    }

    /// Logical model name (unique key)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path to the SQL definition
    #[inline]
    #[must_use]
    pub fn definition_path(&self) -> &Path {
        &self.definition_path
    }

    /// Path to the declaring schema document, if any
    #[inline]
    #[must_use]
    pub fn metadata_path(&self) -> Option<&Path> {
        self.metadata_path.as_deref()
    }

    /// Whether both files are present
    #[inline]
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.metadata_path.is_some()
    }

    /// Load both file bodies
    ///
    /// The metadata body is the empty string for unpaired artifacts.
    ///
    /// # Errors
    /// `RegistryError::Read` if either present file cannot be read.
    pub fn read_contents(&self) -> Result<ArtifactContents, RegistryError> {
        let definition =
            fs::read_to_string(&self.definition_path).map_err(|source| RegistryError::Read {
                path: self.definition_path.clone(),
                source,
            })?;

        let metadata = match &self.metadata_path {
            Some(path) => fs::read_to_string(path).map_err(|source| RegistryError::Read {
                path: path.clone(),
                source,
            })?,
            None => String::new(),
        };

        Ok(ArtifactContents {
            definition,
            metadata,
        })
    }
}

/// Loaded file bodies for one artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactContents {
    /// SQL definition body
    pub definition: String,
    /// YAML documentation body (empty when unpaired)
    pub metadata: String,
}

/// Discovery result, partitioned by pairing state
///
/// Invariant: every artifact in `paired` has a metadata path; every artifact
/// in `unpaired` has none. The two keysets are disjoint.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    root: PathBuf,
    paired: IndexMap<String, Artifact>,
    unpaired: IndexMap<String, Artifact>,
}

impl ArtifactSet {
    /// Create an empty set for the given source root
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paired: IndexMap::new(),
            unpaired: IndexMap::new(),
        }
    }

    /// Insert an artifact, classifying it by pairing state
    ///
    /// Re-inserting a name replaces the previous entry in whichever
    /// partition it lands in and removes it from the other.
    pub fn insert(&mut self, artifact: Artifact) {
        let name = artifact.name().to_string();
        if artifact.is_paired() {
            self.unpaired.shift_remove(&name);
            self.paired.insert(name, artifact);
        } else {
            self.paired.shift_remove(&name);
            self.unpaired.insert(name, artifact);
        }
    }

    /// Source root this set was discovered from
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifacts with both definition and documentation
    #[inline]
    #[must_use]
    pub fn paired(&self) -> &IndexMap<String, Artifact> {
        &self.paired
    }

    /// Artifacts whose documentation is missing
    #[inline]
    #[must_use]
    pub fn unpaired(&self) -> &IndexMap<String, Artifact> {
        &self.unpaired
    }

    /// Artifacts missing documentation, in discovery order
    pub fn missing_metadata(&self) -> impl Iterator<Item = &Artifact> {
        self.unpaired.values()
    }

    /// Total number of discovered artifacts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paired.len() + self.unpaired.len()
    }

    /// Whether discovery found nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paired.is_empty() && self.unpaired.is_empty()
    }
}
