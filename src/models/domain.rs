//! Domain types for model versions and loaded artifacts.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::error::{PenguinError, PenguinResult};
use crate::inference::domain::{EngineError, FeatureFrame, Predictor};

/// Externally supplied model identifier (`prediction_model_id`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ModelId(pub i64);

impl ModelId {
    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ModelId {
    fn from(value: i64) -> Self {
        ModelId(value)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal storage key of an artifact, e.g. `v1`.
///
/// Restricted to `[A-Za-z0-9_.-]` without a leading dot so it can be
/// embedded in a file name without escaping the model directory.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    pub fn new<S: Into<String>>(value: S) -> PenguinResult<Self> {
        let value = value.into();
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
        if value.is_empty() || value.starts_with('.') || !value.chars().all(allowed) {
            return Err(PenguinError::invalid(format!(
                "`{value}` is not a valid artifact key"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the artifact stored under this key.
    pub fn file_name(&self) -> String {
        format!("model_{}.json", self.0)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded, immutable model ready for inference.
pub struct ModelArtifact {
    key: ArtifactKey,
    path: PathBuf,
    description: Option<String>,
    engine: Box<dyn Predictor>,
}

impl ModelArtifact {
    pub fn new(key: ArtifactKey, path: PathBuf, engine: Box<dyn Predictor>) -> Self {
        Self {
            key,
            path,
            description: None,
            engine,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &'static str {
        self.engine.kind()
    }

    pub fn input_schema(&self) -> &[String] {
        self.engine.input_schema()
    }

    pub fn infer(&self, frame: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
        self.engine.predict(frame)
    }
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("key", &self.key)
            .field("path", &self.path)
            .field("kind", &self.engine.kind())
            .field("schema", &self.engine.input_schema())
            .finish_non_exhaustive()
    }
}

/// Repository contract for published artifacts.
pub trait ArtifactRepo: Send + Sync {
    /// Where the artifact for `key` lives; also the cache key.
    fn locate(&self, key: &ArtifactKey) -> PathBuf;

    /// Load the artifact for `key`. A missing artifact is `ModelNotFound` for `model_id`.
    fn load(&self, model_id: ModelId, key: &ArtifactKey) -> PenguinResult<ModelArtifact>;
}
