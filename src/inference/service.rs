//! Single-shot prediction against a resolved artifact.

use crate::common::error::{PenguinError, PenguinResult};
use crate::models::domain::ModelArtifact;

use super::binder;
use super::domain::{FeatureVector, PredictionResult};

/// Bind `features` to the artifact's schema and predict once. No retries.
#[tracing::instrument(
    skip_all,
    fields(artifact = artifact.key().as_str(), kind = artifact.kind())
)]
pub fn predict(
    artifact: &ModelArtifact,
    features: &FeatureVector,
) -> PenguinResult<PredictionResult> {
    let key = artifact.key().as_str();
    let frame = binder::bind(key, artifact.input_schema(), features)?;

    let outputs = artifact
        .infer(&frame)
        .map_err(|err| PenguinError::inference(key, err.to_string()))?;
    if outputs.is_empty() {
        return Err(PenguinError::inference(key, "predictor returned no outputs"));
    }
    if let Some(bad) = outputs.iter().find(|v| !v.is_finite()) {
        return Err(PenguinError::inference(
            key,
            format!("predictor returned non-finite output {bad}"),
        ));
    }

    tracing::debug!(outputs = outputs.len(), "prediction finished");
    Ok(PredictionResult::new(outputs))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::common::error::PenguinCode;
    use crate::inference::domain::{EngineError, FeatureFrame, Predictor, FEATURE_NAMES};
    use crate::models::domain::ArtifactKey;

    /// Positional weights 1, 10, 100, 1000 make any swap visible.
    struct PlaceValue {
        schema: Vec<String>,
    }

    impl Predictor for PlaceValue {
        fn kind(&self) -> &'static str {
            "place_value"
        }

        fn input_schema(&self) -> &[String] {
            &self.schema
        }

        fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
            Ok(vec![frame
                .values()
                .iter()
                .enumerate()
                .map(|(i, v)| v * 10f64.powi(i as i32))
                .sum()])
        }
    }

    struct Broken;

    impl Predictor for Broken {
        fn kind(&self) -> &'static str {
            "broken"
        }

        fn input_schema(&self) -> &[String] {
            &[]
        }

        fn predict(&self, _: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
            Err(EngineError("boom".into()))
        }
    }

    fn artifact(engine: impl Predictor + 'static) -> ModelArtifact {
        ModelArtifact::new(
            ArtifactKey::new("stub").unwrap(),
            PathBuf::from("model_stub.json"),
            Box::new(engine),
        )
    }

    fn standard_schema() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn features(a: f64, b: f64, c: f64, d: f64) -> FeatureVector {
        FeatureVector {
            bill_length_mm: a,
            bill_depth_mm: b,
            flipper_length_mm: c,
            body_mass_g: d,
        }
    }

    #[test]
    fn swapping_fields_changes_the_result() {
        let model = artifact(PlaceValue { schema: standard_schema() });
        let base = predict(&model, &features(1.0, 2.0, 3.0, 4.0)).unwrap();
        let swapped = predict(&model, &features(2.0, 1.0, 3.0, 4.0)).unwrap();

        assert_eq!(base.values(), &[4321.0]);
        assert_eq!(swapped.values(), &[4312.0]);
    }

    #[test]
    fn binding_follows_artifact_order_not_request_order() {
        let mut schema = standard_schema();
        schema.reverse();
        let model = artifact(PlaceValue { schema });
        let result = predict(&model, &features(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(result.values(), &[1234.0]);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let model = artifact(PlaceValue { schema: standard_schema() });
        let input = features(39.1, 18.7, 181.0, 3750.0);
        assert_eq!(predict(&model, &input).unwrap(), predict(&model, &input).unwrap());
    }

    #[test]
    fn mismatched_schema_is_a_binding_error() {
        let model = artifact(PlaceValue {
            schema: vec!["bill_length_mm".into()],
        });
        let err = predict(&model, &features(1.0, 2.0, 3.0, 4.0)).unwrap_err();
        assert_eq!(err.code(), PenguinCode::FeatureBinding);
    }

    #[test]
    fn predictor_failures_are_inference_errors() {
        struct Failing(Vec<String>);
        impl Predictor for Failing {
            fn kind(&self) -> &'static str {
                "failing"
            }
            fn input_schema(&self) -> &[String] {
                &self.0
            }
            fn predict(&self, _: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
                Err(EngineError("matrix not invertible".into()))
            }
        }

        let err = predict(&artifact(Failing(standard_schema())), &features(1.0, 2.0, 3.0, 4.0))
            .unwrap_err();
        assert_eq!(err.code(), PenguinCode::Inference);
        assert!(err.to_string().contains("matrix not invertible"));

        // A predictor with an empty schema never gets past binding.
        let err = predict(&artifact(Broken), &features(1.0, 2.0, 3.0, 4.0)).unwrap_err();
        assert_eq!(err.code(), PenguinCode::FeatureBinding);
    }

    #[test]
    fn non_finite_outputs_are_inference_errors() {
        struct Unstable(Vec<String>, f64);
        impl Predictor for Unstable {
            fn kind(&self) -> &'static str {
                "unstable"
            }
            fn input_schema(&self) -> &[String] {
                &self.0
            }
            fn predict(&self, _: &FeatureFrame) -> Result<Vec<f64>, EngineError> {
                Ok(vec![1.0, self.1])
            }
        }

        for bad in [f64::NAN, f64::INFINITY] {
            let model = artifact(Unstable(standard_schema(), bad));
            let err = predict(&model, &features(1.0, 2.0, 3.0, 4.0)).unwrap_err();
            assert_eq!(err.code(), PenguinCode::Inference);
            assert!(err.to_string().contains("non-finite"));
        }
    }
}
