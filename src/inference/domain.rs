//! Domain definitions for prediction requests and the predictor contract.

use serde::Serialize;
use thiserror::Error;

/// Names of the measurements a request supplies, in request order.
pub const FEATURE_NAMES: [&str; 4] = [
    "bill_length_mm",
    "bill_depth_mm",
    "flipper_length_mm",
    "body_mass_g",
];

/// The four required measurements of one prediction request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeatureVector {
    pub bill_length_mm: f64,
    pub bill_depth_mm: f64,
    pub flipper_length_mm: f64,
    pub body_mass_g: f64,
}

impl FeatureVector {
    /// Look a measurement up by its field name.
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            "bill_length_mm" => Some(self.bill_length_mm),
            "bill_depth_mm" => Some(self.bill_depth_mm),
            "flipper_length_mm" => Some(self.flipper_length_mm),
            "body_mass_g" => Some(self.body_mass_g),
            _ => None,
        }
    }
}

/// Features laid out in the order a predictor declared.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureFrame {
    pub(crate) fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Numeric outputs of one prediction, returned to the caller verbatim.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionResult(Vec<f64>);

impl PredictionResult {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Failure raised from inside a predictor.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Opaque inference contract every loaded artifact fulfils.
pub trait Predictor: Send + Sync {
    /// Short label of the model family, used in logs.
    fn kind(&self) -> &'static str;

    /// Feature names the predictor consumes, in the order it consumes them.
    fn input_schema(&self) -> &[String];

    /// Predict for one bound row. Must be deterministic.
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_found_by_name() {
        let features = FeatureVector {
            bill_length_mm: 39.1,
            bill_depth_mm: 18.7,
            flipper_length_mm: 181.0,
            body_mass_g: 3750.0,
        };
        assert_eq!(features.value("flipper_length_mm"), Some(181.0));
        assert_eq!(features.value("island_id"), None);
        assert_eq!(features.value("body_mass_g"), Some(3750.0));
    }

    #[test]
    fn prediction_serialises_as_plain_array() {
        let result = PredictionResult::new(vec![0.0, 2.5]);
        assert_eq!(serde_json::to_string(&result).unwrap(), "[0.0,2.5]");
    }
}
