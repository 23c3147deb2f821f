use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{error, info};
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};

use super::Predictor;
use crate::error::ModelInvocationError;
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Output name skl2onnx gives a classifier's predicted label.
const LABEL_OUTPUT: &str = "label";

/// An ONNX model taking a single `float32 [N, 6]` input and producing one
/// scalar per row.
///
/// The ONNX model is expected to:
/// - Accept exactly one float tensor input of shape [batch_size, 6]
/// - Produce at least one output; the first element of the chosen output is the prediction
#[derive(Debug)]
pub struct OnnxModel {
    name: String,
    path: PathBuf,
    session: Session,
    input_name: String,
    output_name: String,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxModel>();
    }
};

impl OnnxModel {
    /// Loads and validates a model file.
    ///
    /// `preferred_output` selects an output by name, falling back to the
    /// model's first output when it is absent.
    ///
    /// # Errors
    /// - `NotFound` if the file does not exist
    /// - `Load` if ONNX Runtime cannot parse the file
    /// - `ShapeMismatch` if the input is not a float tensor with 6 features
    pub fn load<P: AsRef<Path>>(
        name: impl Into<String>,
        path: P,
        config: &RuntimeConfig,
        preferred_output: Option<&str>,
    ) -> Result<Self, ModelInvocationError> {
        let name = name.into();
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ModelInvocationError::NotFound(path));
        }

        info!("Loading {} model from {:?}", name, path);
        let session = create_session_builder(config)?
            .commit_from_file(&path)
            .map_err(|e| {
                error!("Failed to load {} model: {}", name, e);
                ModelInvocationError::Load {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;

        Self::validate_model(&name, &session)?;
        info!("{} model structure validated successfully", name);

        let input_name = session.inputs[0].name.clone();
        let output_name = preferred_output
            .and_then(|wanted| session.outputs.iter().find(|o| o.name == wanted))
            .unwrap_or(&session.outputs[0])
            .name
            .clone();

        Ok(Self {
            name,
            path,
            session,
            input_name,
            output_name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Checks the model has one 6-wide float input and at least one output.
    fn validate_model(name: &str, session: &Session) -> Result<(), ModelInvocationError> {
        let inputs = &session.inputs;
        if inputs.len() != 1 {
            return Err(ModelInvocationError::ShapeMismatch {
                model: name.to_string(),
                expected: "exactly 1 input".to_string(),
                actual: format!("{} inputs", inputs.len()),
            });
        }

        match &inputs[0].input_type {
            ValueType::Tensor { ty, dimensions, .. } => {
                if *ty != TensorElementType::Float32 {
                    return Err(ModelInvocationError::ShapeMismatch {
                        model: name.to_string(),
                        expected: "float32 input".to_string(),
                        actual: format!("{:?} input", ty),
                    });
                }
                // Dynamic dimensions are reported as -1
                if let Some(&width) = dimensions.last() {
                    if width > 0 && width as usize != FEATURE_COUNT {
                        return Err(ModelInvocationError::ShapeMismatch {
                            model: name.to_string(),
                            expected: format!("{} features", FEATURE_COUNT),
                            actual: format!("{} features", width),
                        });
                    }
                }
            }
            other => {
                return Err(ModelInvocationError::ShapeMismatch {
                    model: name.to_string(),
                    expected: "tensor input".to_string(),
                    actual: format!("{:?}", other),
                });
            }
        }

        if session.outputs.is_empty() {
            return Err(ModelInvocationError::EmptyOutput {
                model: name.to_string(),
            });
        }

        Ok(())
    }

    /// Runs the model on one row and returns the first value of the chosen output.
    pub fn run(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        let batch = features.to_batch().into_dyn();
        let batch = batch.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&batch).map_err(|e| self.runtime_error(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| self.runtime_error(format!("Failed to run model: {}", e)))?;

        self.first_scalar(&outputs[self.output_name.as_str()])
    }

    /// Reads the first element of an int64, float32 or float64 tensor.
    fn first_scalar(&self, value: &DynValue) -> Result<f32, ModelInvocationError> {
        let first = if let Ok(tensor) = value.try_extract_tensor::<i64>() {
            tensor.iter().next().map(|&v| v as f32)
        } else if let Ok(tensor) = value.try_extract_tensor::<f32>() {
            tensor.iter().next().copied()
        } else if let Ok(tensor) = value.try_extract_tensor::<f64>() {
            tensor.iter().next().map(|&v| v as f32)
        } else {
            None
        };

        first.ok_or_else(|| ModelInvocationError::EmptyOutput {
            model: self.name.clone(),
        })
    }

    fn runtime_error(&self, message: String) -> ModelInvocationError {
        ModelInvocationError::Runtime {
            model: self.name.clone(),
            message,
        }
    }
}

/// Damage class model. Predicts a label in {0, 1, 2}.
#[derive(Debug)]
pub struct OnnxClassifier(OnnxModel);

impl OnnxClassifier {
    pub fn from_file<P: AsRef<Path>>(path: P, config: &RuntimeConfig) -> Result<Self, ModelInvocationError> {
        OnnxModel::load("classifier", path, config, Some(LABEL_OUTPUT)).map(Self)
    }

    pub fn model(&self) -> &OnnxModel {
        &self.0
    }
}

impl Predictor for OnnxClassifier {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        self.0.run(features)
    }
}

/// Mean damage index model.
#[derive(Debug)]
pub struct OnnxRegressor(OnnxModel);

impl OnnxRegressor {
    pub fn from_file<P: AsRef<Path>>(path: P, config: &RuntimeConfig) -> Result<Self, ModelInvocationError> {
        OnnxModel::load("regressor", path, config, None).map(Self)
    }

    pub fn model(&self) -> &OnnxModel {
        &self.0
    }
}

impl Predictor for OnnxRegressor {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn predict(&self, features: &FeatureVector) -> Result<f32, ModelInvocationError> {
        self.0.run(features)
    }
}
