use std::path::Path;

use log::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::catalog::{CategoryCatalog, OCC_TYPE_COLUMN, STRUCT_TYPE_COLUMN};
use crate::dataset::Dataset;
use crate::encoder::{LabelEncoderRegistry, Vocabulary};
use crate::error::{BuildError, ModelInvocationError, PredictionError};
use crate::features::{DamageQuery, FeatureVector, FeatureVectorBuilder, InputBounds};
use crate::predictor::{OnnxClassifier, OnnxRegressor, Predictor};
use crate::report::{DamageClass, PredictionResult};
use crate::runtime::RuntimeConfig;

/// Everything a prediction needs, loaded once at startup and read-only afterwards.
///
/// # Thread Safety
///
/// `PredictionContext` is `Send + Sync`: the registry is plain data and both
/// predictors are required to be `Send + Sync`.
#[derive(Debug)]
pub struct PredictionContext {
    registry: LabelEncoderRegistry,
    classifier: Box<dyn Predictor>,
    regressor: Box<dyn Predictor>,
    bounds: InputBounds,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<PredictionContext>();
    }
};

impl PredictionContext {
    pub fn builder() -> PredictionContextBuilder {
        PredictionContextBuilder::new()
    }

    /// Loads the pinned vocabulary (or the dataset when none is pinned) and
    /// both ONNX models from an artifact store.
    pub fn from_store(store: &ArtifactStore, config: &RuntimeConfig) -> Result<Self, BuildError> {
        let mut builder = Self::builder().with_runtime_config(config.clone());
        let vocabulary_path = store.vocabulary_path();
        let dataset_path = store.dataset_path();

        if vocabulary_path.exists() {
            builder = builder.with_vocabulary_file(&vocabulary_path)?;
        }
        if dataset_path.exists() {
            builder = builder.with_dataset_file(&dataset_path)?;
        }

        builder
            .with_onnx_models(store.classifier_path(), store.regressor_path())?
            .build()
    }

    pub fn registry(&self) -> &LabelEncoderRegistry {
        &self.registry
    }

    pub fn bounds(&self) -> &InputBounds {
        &self.bounds
    }

    /// Validates, encodes and scores one query.
    ///
    /// Fails closed: any error at any stage produces no result.
    pub fn predict(&self, query: &DamageQuery) -> Result<PredictionResult, PredictionError> {
        self.bounds.validate(query)?;
        let vector = self.encode(query)?;
        Ok(self.predict_vector(&vector)?)
    }

    pub fn encode(&self, query: &DamageQuery) -> Result<FeatureVector, PredictionError> {
        Ok(FeatureVectorBuilder::new(&self.registry).build(query)?)
    }

    /// Scores an already-encoded vector with both models.
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<PredictionResult, ModelInvocationError> {
        let index = self.regressor.predict(vector)?;
        let label = self.classifier.predict(vector)?;

        if !index.is_finite() {
            return Err(ModelInvocationError::InvalidOutput {
                model: self.regressor.name().to_string(),
                value: index,
            });
        }
        if !label.is_finite() || label.fract() != 0.0 {
            return Err(ModelInvocationError::InvalidOutput {
                model: self.classifier.name().to_string(),
                value: label,
            });
        }
        let damage_class = DamageClass::try_from(label as i64)?;

        info!(
            "Prediction: mean damage index {:.4}, class {}",
            index, damage_class
        );
        Ok(PredictionResult {
            mean_damage_index: f64::from(index),
            damage_class,
        })
    }
}

/// Assembles a [`PredictionContext`] with a fluent interface.
#[derive(Debug, Default)]
pub struct PredictionContextBuilder {
    vocabulary: Option<Vocabulary>,
    dataset: Option<Dataset>,
    classifier: Option<Box<dyn Predictor>>,
    regressor: Option<Box<dyn Predictor>>,
    bounds: InputBounds,
    runtime_config: RuntimeConfig,
}

impl PredictionContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    pub fn with_bounds(mut self, bounds: InputBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Uses a pinned vocabulary as the source of encoder codes.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn with_vocabulary_file<P: AsRef<Path>>(self, path: P) -> Result<Self, BuildError> {
        let vocabulary = Vocabulary::load(path)?;
        Ok(self.with_vocabulary(vocabulary))
    }

    /// Supplies the historical dataset. Without a pinned vocabulary the
    /// encoders are fitted from it; with one, it is checked against it.
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn with_dataset_file<P: AsRef<Path>>(self, path: P) -> Result<Self, BuildError> {
        let dataset = Dataset::from_path(path)?;
        Ok(self.with_dataset(dataset))
    }

    pub fn with_classifier(mut self, classifier: impl Predictor + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn with_regressor(mut self, regressor: impl Predictor + 'static) -> Self {
        self.regressor = Some(Box::new(regressor));
        self
    }

    /// Loads both ONNX models using the configured runtime settings.
    pub fn with_onnx_models<P: AsRef<Path>, Q: AsRef<Path>>(
        self,
        classifier_path: P,
        regressor_path: Q,
    ) -> Result<Self, BuildError> {
        let classifier = OnnxClassifier::from_file(classifier_path, &self.runtime_config)?;
        let regressor = OnnxRegressor::from_file(regressor_path, &self.runtime_config)?;
        Ok(self.with_classifier(classifier).with_regressor(regressor))
    }

    /// Builds the context.
    ///
    /// # Errors
    /// - `MissingVocabulary` if neither a vocabulary nor a dataset was given
    /// - `VocabularyDrift` if the dataset and the pinned vocabulary disagree
    /// - `MissingColumn` if `struct_typ` or `occ_type` has no encoder
    /// - `MissingPredictor` if a model is missing
    pub fn build(self) -> Result<PredictionContext, BuildError> {
        let registry = match (&self.vocabulary, &self.dataset) {
            (Some(vocabulary), dataset) => {
                let pinned = LabelEncoderRegistry::from_vocabulary(vocabulary);
                if let Some(dataset) = dataset {
                    Self::check_drift(&pinned, dataset)?;
                }
                info!("Using pinned vocabulary");
                pinned
            }
            (None, Some(dataset)) => {
                warn!("No pinned vocabulary; fitting label encoders from the dataset");
                dataset.require_categorical(&[STRUCT_TYPE_COLUMN, OCC_TYPE_COLUMN])?;
                LabelEncoderRegistry::fit_dataset(dataset)
            }
            (None, None) => return Err(BuildError::MissingVocabulary),
        };

        for column in [STRUCT_TYPE_COLUMN, OCC_TYPE_COLUMN] {
            if registry.encoder(column).is_none() {
                return Err(BuildError::MissingColumn(column.to_string()));
            }
        }
        registry.dangling_codes(&CategoryCatalog::structural());
        registry.dangling_codes(&CategoryCatalog::occupancy());

        let classifier = self.classifier.ok_or(BuildError::MissingPredictor("classifier"))?;
        let regressor = self.regressor.ok_or(BuildError::MissingPredictor("regressor"))?;

        Ok(PredictionContext {
            registry,
            classifier,
            regressor,
            bounds: self.bounds,
        })
    }

    /// Refits the dataset and requires identical codes for every pinned column.
    fn check_drift(pinned: &LabelEncoderRegistry, dataset: &Dataset) -> Result<(), BuildError> {
        let fitted = LabelEncoderRegistry::fit_dataset(dataset);
        for column in pinned.columns() {
            if fitted.encoder(column) != pinned.encoder(column) {
                warn!("Vocabulary drift detected in column '{}'", column);
                return Err(BuildError::VocabularyDrift {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}
