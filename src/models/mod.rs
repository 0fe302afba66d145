//! Model domain: versioning table, artifact storage and resolution.

pub mod cache;
pub mod domain;
pub mod repo_fs;
pub mod service;
pub mod versions;

pub use domain::{ArtifactKey, ArtifactRepo, ModelArtifact, ModelId};
pub use repo_fs::FsArtifactRepo;
pub use service::ModelResolver;
pub use versions::VersionTable;
