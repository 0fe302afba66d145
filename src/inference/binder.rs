//! Lays request features out in the order an artifact declares.
//!
//! Binding is purely by name. An artifact must declare exactly the four
//! request measurements; anything else is rejected rather than guessed at.

use std::collections::HashSet;

use crate::common::error::{PenguinError, PenguinResult};

use super::domain::{FeatureFrame, FeatureVector, FEATURE_NAMES};

/// Bind `features` to `schema`, reporting mismatches against `artifact`.
pub fn bind(
    artifact: &str,
    schema: &[String],
    features: &FeatureVector,
) -> PenguinResult<FeatureFrame> {
    if schema.len() != FEATURE_NAMES.len() {
        return Err(PenguinError::binding(
            artifact,
            format!(
                "artifact expects {} features, requests carry {}",
                schema.len(),
                FEATURE_NAMES.len()
            ),
        ));
    }

    let mut seen = HashSet::with_capacity(schema.len());
    let mut values = Vec::with_capacity(schema.len());
    for name in schema {
        if !seen.insert(name.as_str()) {
            return Err(PenguinError::binding(
                artifact,
                format!("feature `{name}` is declared twice"),
            ));
        }
        let value = features.value(name).ok_or_else(|| {
            PenguinError::binding(artifact, format!("unknown feature `{name}`"))
        })?;
        if !value.is_finite() {
            return Err(PenguinError::binding(
                artifact,
                format!("feature `{name}` is not a finite number"),
            ));
        }
        values.push(value);
    }

    Ok(FeatureFrame::new(schema.to_vec(), values))
}
