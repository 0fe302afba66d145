//! Inference domain: feature binding and single-row prediction.

pub mod binder;
pub mod domain;
pub mod engines;
pub mod service;

pub use domain::{FeatureVector, PredictionResult, Predictor, FEATURE_NAMES};
