//! Filesystem repository for published model artifacts.
//!
//! Artifacts are JSON documents named `model_<key>.json` inside the model
//! directory, tagged by `kind`.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;

use crate::common::config::AppCfg;
use crate::common::error::{PenguinError, PenguinResult};
use crate::inference::domain::Predictor;
use crate::inference::engines::{ClassWeights, LinearClassifier, LinearRegressor};

use super::domain::{ArtifactKey, ArtifactRepo, ModelArtifact, ModelId};

const COMPONENT: &str = "models.repo_fs";

/// On-disk artifact document.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ArtifactFile {
    LinearRegression {
        #[serde(default)]
        description: Option<String>,
        features: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    LinearClassifier {
        #[serde(default)]
        description: Option<String>,
        features: Vec<String>,
        classes: Vec<ClassFile>,
    },
}

#[derive(Debug, Deserialize)]
struct ClassFile {
    label: f64,
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl ArtifactFile {
    fn into_engine(self) -> Result<(Option<String>, Box<dyn Predictor>), String> {
        match self {
            ArtifactFile::LinearRegression {
                description,
                features,
                coefficients,
                intercept,
            } => {
                let engine: Box<dyn Predictor> = Box::new(
                    LinearRegressor::new(features, coefficients, intercept)
                        .map_err(|err| err.to_string())?,
                );
                Ok((description, engine))
            }
            ArtifactFile::LinearClassifier {
                description,
                features,
                classes,
            } => {
                let classes = classes
                    .into_iter()
                    .map(|c| ClassWeights {
                        label: c.label,
                        coefficients: c.coefficients,
                        intercept: c.intercept,
                    })
                    .collect();
                let engine: Box<dyn Predictor> = Box::new(
                    LinearClassifier::new(features, classes).map_err(|err| err.to_string())?,
                );
                Ok((description, engine))
            }
        }
    }
}

/// Loads artifacts from `cfg.model_dir`.
pub struct FsArtifactRepo {
    root: PathBuf,
}

impl FsArtifactRepo {
    pub fn new(cfg: &AppCfg) -> Self {
        Self::with_root(cfg.model_dir.clone())
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactRepo for FsArtifactRepo {
    fn locate(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    fn load(&self, model_id: ModelId, key: &ArtifactKey) -> PenguinResult<ModelArtifact> {
        let path = self.locate(key);
        let raw = fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PenguinError::model_not_found(
                model_id.raw(),
                format!("no artifact at {}", path.display()),
            ),
            _ => PenguinError::storage(COMPONENT, format!("cannot read {}: {err}", path.display())),
        })?;

        let file: ArtifactFile = serde_json::from_str(&raw).map_err(|err| {
            let message = format!("malformed artifact {}: {err}", path.display());
            PenguinError::storage(COMPONENT, message)
        })?;
        let (description, engine) = file.into_engine().map_err(|err| {
            let message = format!("invalid artifact {}: {err}", path.display());
            PenguinError::storage(COMPONENT, message)
        })?;

        tracing::info!(
            model_id = model_id.raw(),
            artifact = key.as_str(),
            kind = engine.kind(),
            description = description.as_deref().unwrap_or(""),
            path = %path.display(),
            "artifact loaded"
        );
        Ok(ModelArtifact::new(key.clone(), path, engine).with_description(description))
    }
}
