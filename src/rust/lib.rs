//! Earthquake building damage prediction.
//!
//! Form choices are resolved through a static category catalog, label-encoded
//! with the vocabulary the models were trained on, and scored by two ONNX
//! models: a classifier for the damage class and a regressor for the mean
//! damage index.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use quake_damage::{ArtifactStore, DamageQuery, PredictionContext, RuntimeConfig};
//!
//! let store = ArtifactStore::new_default();
//! let context = PredictionContext::from_store(&store, &RuntimeConfig::default())?;
//!
//! let query = DamageQuery::new("Reinforced Concrete Shear Wall (C1)", "Residential")
//!     .with_year_built(2000)
//!     .with_magnitude(5.0)
//!     .with_distance(3.0);
//! let result = context.predict(&query)?;
//! println!("{} ({:.4})", result.damage_class, result.mean_damage_index);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom predictors
//!
//! Any type implementing [`Predictor`] can stand in for the ONNX models:
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use quake_damage::{
//!     DamageClass, DamageQuery, FeatureVector, LabelEncoder, LabelEncoderRegistry,
//!     ModelInvocationError, PredictionContext, Predictor,
//! };
//!
//! #[derive(Debug)]
//! struct Constant(f32);
//!
//! impl Predictor for Constant {
//!     fn name(&self) -> &str { "constant" }
//!     fn predict(&self, _: &FeatureVector) -> Result<f32, ModelInvocationError> { Ok(self.0) }
//! }
//!
//! let mut registry = LabelEncoderRegistry::default();
//! registry.insert(LabelEncoder::fit("struct_typ", ["C1", "W1"]));
//! registry.insert(LabelEncoder::fit("occ_type", ["RES1"]));
//!
//! let context = PredictionContext::builder()
//!     .with_vocabulary(registry.to_vocabulary())
//!     .with_classifier(Constant(1.0))
//!     .with_regressor(Constant(0.25))
//!     .build()?;
//!
//! let result = context.predict(&DamageQuery::new("Wooden Frame (W1)", "Residential"))?;
//! assert_eq!(result.damage_class, DamageClass::HighRisk);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod catalog;
mod context;
pub mod dataset;
pub mod encoder;
mod error;
pub mod features;
pub mod predictor;
pub mod report;
mod runtime;

pub use artifacts::{ArtifactCheck, ArtifactStore};
pub use catalog::{CategoryCatalog, CategoryGroup};
pub use context::{PredictionContext, PredictionContextBuilder};
pub use dataset::Dataset;
pub use encoder::{LabelEncoder, LabelEncoderRegistry, Vocabulary};
pub use error::{
    ArtifactError, BuildError, DatasetError, EncodingError, InputError, InvalidCategoryError,
    ModelInvocationError, PredictionError, UnknownCategoryError,
};
pub use features::{DamageQuery, FeatureVector, FeatureVectorBuilder, InputBounds, FEATURE_COUNT};
pub use predictor::{OnnxClassifier, OnnxRegressor, Predictor};
pub use report::{DamageClass, PredictionResult};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
