use std::io;
use std::path::PathBuf;

use ort::Error as OrtError;

/// A display choice that is not a key of the category catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {group} choice: '{choice}'")]
pub struct InvalidCategoryError {
    /// The catalog group that was searched (e.g. "structural type")
    pub group: &'static str,
    /// The rejected display choice
    pub choice: String,
}

/// A raw category code that the fitted encoder never saw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category '{value}' for column '{column}'")]
pub struct UnknownCategoryError {
    pub column: String,
    pub value: String,
}

/// Failure to turn a categorical choice into its integer code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error(transparent)]
    InvalidCategory(#[from] InvalidCategoryError),
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategoryError),
    #[error("No label encoder fitted for column '{0}'")]
    MissingEncoder(String),
}

/// Failure to load or run one of the damage models.
#[derive(Debug, thiserror::Error)]
pub enum ModelInvocationError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load model '{path}': {message}")]
    Load { path: PathBuf, message: String },
    #[error("Model '{model}' expects {expected}, got {actual}")]
    ShapeMismatch {
        model: String,
        expected: String,
        actual: String,
    },
    #[error("Model '{model}' failed to run: {message}")]
    Runtime { model: String, message: String },
    #[error("Model '{model}' produced no usable output")]
    EmptyOutput { model: String },
    #[error("Model '{model}' produced an invalid value: {value}")]
    InvalidOutput { model: String, value: f32 },
    #[error("Classifier emitted damage class {0}, which has no label")]
    UnmappedClass(i64),
}

impl From<OrtError> for ModelInvocationError {
    fn from(err: OrtError) -> Self {
        ModelInvocationError::Runtime {
            model: "onnxruntime".to_string(),
            message: err.to_string(),
        }
    }
}

/// A numeric input outside the configured form bounds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
}

/// Errors reading the historical dataset used to fit label encoders.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to open dataset '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("Column '{0}' is required to be categorical but only holds numbers")]
    NotCategorical(String),
}

/// Errors reading, writing or verifying pinned artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid vocabulary file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported vocabulary version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Vocabulary column '{0}' contains duplicate values")]
    DuplicateValues(String),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Errors assembling a [`crate::PredictionContext`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Either a pinned vocabulary or a dataset must be provided")]
    MissingVocabulary,
    #[error("No {0} predictor configured")]
    MissingPredictor(&'static str),
    #[error("Dataset vocabulary for column '{column}' differs from the pinned vocabulary")]
    VocabularyDrift { column: String },
    #[error("Pinned vocabulary is missing column '{0}'")]
    MissingColumn(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Model(#[from] ModelInvocationError),
}

/// Everything that can fail during a single prediction attempt.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Model error: {0}")]
    Model(#[from] ModelInvocationError),
}
