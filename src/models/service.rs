//! Resolution of external model ids to loaded artifacts.

use std::sync::Arc;
use std::time::Duration;

use crate::common::blocking;
use crate::common::error::{PenguinError, PenguinResult};

use super::cache::ArtifactCache;
use super::domain::{ArtifactRepo, ModelArtifact, ModelId};
use super::versions::VersionTable;

/// Maps ids through the versioning table and loads (or reuses) artifacts.
#[derive(Clone)]
pub struct ModelResolver {
    versions: Arc<VersionTable>,
    repo: Arc<dyn ArtifactRepo>,
    cache: Option<Arc<ArtifactCache>>,
    load_timeout: Duration,
}

impl ModelResolver {
    pub fn new(
        versions: VersionTable,
        repo: Arc<dyn ArtifactRepo>,
        load_timeout: Duration,
    ) -> Self {
        Self {
            versions: Arc::new(versions),
            repo,
            cache: Some(Arc::new(ArtifactCache::new())),
            load_timeout,
        }
    }

    /// Load from storage on every call instead of caching.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn versions(&self) -> &VersionTable {
        &self.versions
    }

    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }

    #[tracing::instrument(skip(self, model_id), fields(model_id = model_id.raw()))]
    pub async fn resolve(&self, model_id: ModelId) -> PenguinResult<Arc<ModelArtifact>> {
        let key = self
            .versions
            .lookup(model_id)
            .cloned()
            .ok_or_else(|| {
                PenguinError::model_not_found(model_id.raw(), "no version is mapped to this id")
            })?;

        let path = self.repo.locate(&key);
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(&path)) {
            tracing::debug!(artifact = key.as_str(), "artifact cache hit");
            return Ok(hit);
        }

        let repo = Arc::clone(&self.repo);
        let loaded = blocking::run_bounded("models.load", self.load_timeout, move || {
            repo.load(model_id, &key)
        })
        .await?;

        let artifact = Arc::new(loaded);
        Ok(match &self.cache {
            Some(cache) => cache.insert(path, artifact),
            None => artifact,
        })
    }
}
