//! Append-only artifact cache keyed by resolved artifact path.
//!
//! Artifacts never change once published, so entries are never evicted or
//! replaced. Two requests may load the same artifact concurrently; the first
//! insert wins and the other load is dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::domain::ModelArtifact;

#[derive(Default)]
pub struct ArtifactCache {
    entries: RwLock<HashMap<PathBuf, Arc<ModelArtifact>>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<ModelArtifact>> {
        self.entries.read().get(path).cloned()
    }

    /// Insert unless an entry exists; returns the entry that is now cached.
    pub fn insert(&self, path: PathBuf, artifact: Arc<ModelArtifact>) -> Arc<ModelArtifact> {
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(path).or_insert(artifact))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
