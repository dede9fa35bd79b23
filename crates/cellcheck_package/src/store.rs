//! Persistence of package metadata, keyed by dataset id.

use crate::{parser, MetadataError, Result};
use cellcheck_core::PackageMetadata;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// File name of a stored descriptor inside a dataset directory.
pub const DESCRIPTOR_FILE: &str = "datapackage.json";

/// Loads and saves the metadata attached to a dataset.
pub trait MetadataStore: Send + Sync {
    /// Loads the metadata stored for `dataset_id`, if any.
    fn load(&self, dataset_id: &str) -> Result<Option<PackageMetadata>>;

    /// Stores `metadata` for `dataset_id`, replacing any previous value.
    fn save(&self, dataset_id: &str, metadata: &PackageMetadata) -> Result<()>;
}

/// Stores descriptors as `<root>/<dataset id>/datapackage.json`.
#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    root: PathBuf,
}

impl FileMetadataStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the descriptor path for a dataset.
    ///
    /// The id must be a single path segment, so every descriptor stays
    /// under the store root.
    pub fn descriptor_path(&self, dataset_id: &str) -> Result<PathBuf> {
        let is_segment = !dataset_id.is_empty()
            && dataset_id != "."
            && dataset_id != ".."
            && !dataset_id.contains(['/', '\\', '\0'])
            && matches!(
                Path::new(dataset_id).components().collect::<Vec<_>>().as_slice(),
                [Component::Normal(_)]
            );
        if !is_segment {
            return Err(MetadataError::InvalidDatasetId(dataset_id.to_string()));
        }
        Ok(self.root.join(dataset_id).join(DESCRIPTOR_FILE))
    }

    /// Returns the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MetadataStore for FileMetadataStore {
    fn load(&self, dataset_id: &str) -> Result<Option<PackageMetadata>> {
        let path = self.descriptor_path(dataset_id)?;
        if !path.exists() {
            return Ok(None);
        }
        debug!(path = %path.display(), "loading descriptor");
        parser::parse_file(&path).map(Some)
    }

    fn save(&self, dataset_id: &str, metadata: &PackageMetadata) -> Result<()> {
        let path = self.descriptor_path(dataset_id)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        debug!(path = %path.display(), "saving descriptor");
        parser::write_file(&path, metadata)
    }
}

/// Keeps descriptors in memory. Used by tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    entries: RwLock<HashMap<String, PackageMetadata>>,
}

impl InMemoryMetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored descriptors.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn load(&self, dataset_id: &str) -> Result<Option<PackageMetadata>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(dataset_id).cloned())
    }

    fn save(&self, dataset_id: &str, metadata: &PackageMetadata) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(dataset_id.to_string(), metadata.clone());
        Ok(())
    }
}

fn poisoned() -> MetadataError {
    MetadataError::IoError(std::io::Error::other("metadata store lock poisoned"))
}
