//! Linear predictors backing the published artifacts.

use super::domain::{EngineError, FeatureFrame, Predictor};

fn check_width(schema: &[String], weights: &[f64], what: &str) -> Result<(), EngineError> {
    if schema.is_empty() {
        return Err(EngineError("artifact declares no features".into()));
    }
    if weights.len() != schema.len() {
        return Err(EngineError(format!(
            "{what} has {} coefficients for {} features",
            weights.len(),
            schema.len()
        )));
    }
    Ok(())
}

fn score(weights: &[f64], intercept: f64, frame: &FeatureFrame) -> Result<f64, EngineError> {
    if frame.len() != weights.len() {
        return Err(EngineError(format!(
            "bound row has {} values, model has {} coefficients",
            frame.len(),
            weights.len()
        )));
    }
    let value = weights
        .iter()
        .zip(frame.values())
        .fold(intercept, |acc, (w, x)| acc + w * x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError("score is not finite".into()))
    }
}

/// `intercept + Σ wᵢ·xᵢ` over the declared features.
#[derive(Clone, Debug)]
pub struct LinearRegressor {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(
        features: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, EngineError> {
        check_width(&features, &coefficients, "regressor")?;
        Ok(Self {
            features,
            coefficients,
            intercept,
        })
    }
}

impl Predictor for LinearRegressor {
    fn kind(&self) -> &'static str {
        "linear_regression"
    }

    fn input_schema(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
        Ok(vec![score(&self.coefficients, self.intercept, frame)?])
    }
}

/// Weights of one class of a `LinearClassifier`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassWeights {
    pub label: f64,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// One-vs-rest linear scorer; predicts the label of the best-scoring class.
#[derive(Clone, Debug)]
pub struct LinearClassifier {
    features: Vec<String>,
    classes: Vec<ClassWeights>,
}

impl LinearClassifier {
    pub fn new(features: Vec<String>, classes: Vec<ClassWeights>) -> Result<Self, EngineError> {
        if classes.is_empty() {
            return Err(EngineError("classifier declares no classes".into()));
        }
        for class in &classes {
            check_width(&features, &class.coefficients, &format!("class {}", class.label))?;
        }
        Ok(Self { features, classes })
    }
}

impl Predictor for LinearClassifier {
    fn kind(&self) -> &'static str {
        "linear_classifier"
    }

    fn input_schema(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
        let mut best: Option<(f64, f64)> = None;
        for class in &self.classes {
            let value = score(&class.coefficients, class.intercept, frame)?;
            // Strictly greater: ties keep the earlier class.
            if best.map_or(true, |(top, _)| value > top) {
                best = Some((value, class.label));
            }
        }
        best.map(|(_, label)| vec![label])
            .ok_or_else(|| EngineError("classifier declares no classes".into()))
    }
}
