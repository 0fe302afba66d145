//! Error handling primitives shared across the core.
//!
//! Every failure that crosses a component boundary becomes a `PenguinError`
//! carrying the component or identifier involved. The HTTP layer maps each
//! variant to exactly one status through its `PenguinCode`.

use std::time::Duration;

use thiserror::Error;

/// Stable error codes surfaced to API clients.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PenguinCode {
    /// Store connectivity or query failure.
    Storage = 1,
    /// No artifact for the requested model id.
    ModelNotFound = 2,
    /// Request features could not be laid out for the artifact.
    FeatureBinding = 3,
    /// The artifact failed while predicting.
    Inference = 4,
    /// A blocking operation exceeded its limit.
    Timeout = 5,
    /// Caller input failed validation.
    InvalidInput = 6,
}

impl PenguinCode {
    /// Snake-case label used in JSON error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            PenguinCode::Storage => "storage_error",
            PenguinCode::ModelNotFound => "model_not_found",
            PenguinCode::FeatureBinding => "feature_binding_error",
            PenguinCode::Inference => "inference_error",
            PenguinCode::Timeout => "timeout",
            PenguinCode::InvalidInput => "invalid_input",
        }
    }
}

/// Canonical error type for the core.
#[derive(Debug, Error)]
pub enum PenguinError {
    #[error("{component}: {message}")]
    Storage {
        component: &'static str,
        message: String,
    },

    #[error("model {model_id} not found: {detail}")]
    ModelNotFound { model_id: i64, detail: String },

    #[error("cannot bind features for artifact `{artifact}`: {message}")]
    FeatureBinding { artifact: String, message: String },

    #[error("artifact `{artifact}` failed to predict: {message}")]
    Inference { artifact: String, message: String },

    #[error("{operation} timed out after {limit_ms} ms")]
    Timeout {
        operation: &'static str,
        limit_ms: u64,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the crate.
pub type PenguinResult<T> = Result<T, PenguinError>;

impl PenguinError {
    /// Storage helper.
    pub fn storage(component: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            component,
            message: message.into(),
        }
    }

    /// Model missing helper.
    pub fn model_not_found(model_id: i64, detail: impl Into<String>) -> Self {
        Self::ModelNotFound {
            model_id,
            detail: detail.into(),
        }
    }

    /// Binding helper.
    pub fn binding(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FeatureBinding {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Inference helper.
    pub fn inference(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inference {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Timeout helper.
    pub fn timeout(operation: &'static str, limit: Duration) -> Self {
        Self::Timeout {
            operation,
            limit_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Validation helper.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn code(&self) -> PenguinCode {
        match self {
            PenguinError::Storage { .. } => PenguinCode::Storage,
            PenguinError::ModelNotFound { .. } => PenguinCode::ModelNotFound,
            PenguinError::FeatureBinding { .. } => PenguinCode::FeatureBinding,
            PenguinError::Inference { .. } => PenguinCode::Inference,
            PenguinError::Timeout { .. } => PenguinCode::Timeout,
            PenguinError::InvalidInput(_) => PenguinCode::InvalidInput,
        }
    }
}
