#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use quake_damage::{
    Dataset, FeatureVector, ModelInvocationError, PredictionContext, Predictor,
};

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/building_damage.csv")
}

pub fn fixture_dataset() -> Dataset {
    Dataset::from_path(fixture_path()).expect("fixture dataset should load")
}

/// Damage index rising with magnitude and falling with distance.
#[derive(Debug)]
pub struct LinearRegressor;

impl Predictor for LinearRegressor {
    fn name(&self) -> &str {
        "linear-regressor"
    }

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        let v = features.values();
        Ok((0.2 * (v[4] - 4.0) - 0.01 * v[5]).clamp(0.0, 1.0))
    }
}

/// Class by magnitude: below 6 safe, below 7 high risk, else collapsed.
#[derive(Debug)]
pub struct MagnitudeClassifier;

impl Predictor for MagnitudeClassifier {
    fn name(&self) -> &str {
        "magnitude-classifier"
    }

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        let magnitude = features.values()[4];
        Ok(if magnitude < 6.0 {
            0.0
        } else if magnitude < 7.0 {
            1.0
        } else {
            2.0
        })
    }
}

/// Always returns the same value.
#[derive(Debug)]
pub struct Constant(pub f32);

impl Predictor for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        Ok(self.0)
    }
}

/// Fails every call as a model with a mismatched input would.
#[derive(Debug)]
pub struct Failing;

impl Predictor for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        Err(ModelInvocationError::ShapeMismatch {
            model: "failing".to_string(),
            expected: "6 features".to_string(),
            actual: "7 features".to_string(),
        })
    }
}

/// Delegates to an inner predictor and records every vector it receives.
#[derive(Debug)]
pub struct Recording<P> {
    pub inner: P,
    pub seen: Arc<Mutex<Vec<FeatureVector>>>,
}

impl<P> Recording<P> {
    pub fn new(inner: P) -> (Self, Arc<Mutex<Vec<FeatureVector>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inner,
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }
}

impl<P: Predictor> Predictor for Recording<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        self.seen.lock().unwrap().push(*features);
        self.inner.predict(features)
    }
}

/// A context fitted on the fixture dataset with the stub models.
pub fn stub_context() -> PredictionContext {
    PredictionContext::builder()
        .with_dataset(fixture_dataset())
        .with_classifier(MagnitudeClassifier)
        .with_regressor(LinearRegressor)
        .build()
        .expect("stub context should build")
}
