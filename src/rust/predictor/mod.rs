//! Opaque damage models behind a single scoring interface.

mod onnx;

pub use onnx::{OnnxClassifier, OnnxModel, OnnxRegressor};

use crate::error::ModelInvocationError;
use crate::features::FeatureVector;

/// A pre-trained model scoring one feature vector.
///
/// Implementations must be deterministic: the same vector always yields the
/// same value. Classifiers return their class label as a float.
pub trait Predictor: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError>;
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        (**self).predict(features)
    }
}
