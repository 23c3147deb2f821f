use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log;
use sha2::{Digest, Sha256};

use crate::catalog::{OCC_TYPE_COLUMN, STRUCT_TYPE_COLUMN};
use crate::dataset::Dataset;
use crate::encoder::{LabelEncoderRegistry, Vocabulary};
use crate::error::ArtifactError;

/// Environment variable overriding the artifact root.
pub const HOME_ENV: &str = "QUAKE_DAMAGE_HOME";

pub const CLASSIFIER_FILE: &str = "damage_classifier.onnx";
pub const REGRESSOR_FILE: &str = "damage_regressor.onnx";
pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const DATASET_FILE: &str = "building_damage.csv";
pub const PERFORMANCE_CHART_FILE: &str = "model_result.jpg";

/// Outcome of checking one artifact against its pinned hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCheck {
    pub file: String,
    pub expected: String,
    pub actual: Option<String>,
}

impl ArtifactCheck {
    pub fn is_ok(&self) -> bool {
        self.actual.as_deref() == Some(self.expected.as_str())
    }
}

/// Filesystem layout of the models, vocabulary and dataset.
///
/// ```text
/// <root>/
///   building_damage.csv
///   model_result.jpg
///   models/
///     damage_classifier.onnx
///     damage_regressor.onnx
///     vocabulary.json
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the default location
    pub fn new_default() -> Self {
        Self::new(Self::get_default_root())
    }

    /// Returns the default artifact root
    pub fn get_default_root() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(HOME_ENV) {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("quake-damage");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("quake-damage");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("quake-damage")
    }

    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.models_dir().join(CLASSIFIER_FILE)
    }

    pub fn regressor_path(&self) -> PathBuf {
        self.models_dir().join(REGRESSOR_FILE)
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.models_dir().join(VOCABULARY_FILE)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.root.join(DATASET_FILE)
    }

    pub fn performance_chart_path(&self) -> PathBuf {
        self.root.join(PERFORMANCE_CHART_FILE)
    }

    /// Both models exist and there is a vocabulary source.
    pub fn is_ready(&self) -> bool {
        let classifier_path = self.classifier_path();
        let regressor_path = self.regressor_path();
        log::info!("Checking artifacts under {:?}:", self.root);
        log::info!("  Classifier: {:?} (exists: {})", classifier_path, classifier_path.exists());
        log::info!("  Regressor: {:?} (exists: {})", regressor_path, regressor_path.exists());
        classifier_path.exists()
            && regressor_path.exists()
            && (self.vocabulary_path().exists() || self.dataset_path().exists())
    }

    fn hash_file(path: &Path) -> Result<String, ArtifactError> {
        log::info!("Hashing file: {:?}", path);
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Fits encoders from a dataset and writes them, together with the
    /// dataset and model hashes, as the pinned vocabulary.
    ///
    /// Uses the store's dataset when `dataset_path` is `None`.
    pub fn pin_vocabulary(&self, dataset_path: Option<&Path>) -> Result<Vocabulary, ArtifactError> {
        let dataset_path = dataset_path.map(Path::to_path_buf).unwrap_or_else(|| self.dataset_path());
        let dataset = Dataset::from_path(&dataset_path)?;
        dataset.require_categorical(&[STRUCT_TYPE_COLUMN, OCC_TYPE_COLUMN])?;

        let mut vocabulary = LabelEncoderRegistry::fit_dataset(&dataset).to_vocabulary();
        vocabulary.dataset_sha256 = Some(dataset.sha256.clone());

        for (file, path) in [
            (CLASSIFIER_FILE, self.classifier_path()),
            (REGRESSOR_FILE, self.regressor_path()),
        ] {
            if path.exists() {
                vocabulary.model_hashes.insert(file.to_string(), Self::hash_file(&path)?);
            } else {
                log::warn!("{:?} not found; its hash is not pinned", path);
            }
        }

        vocabulary.save(self.vocabulary_path())?;
        log::info!("Pinned vocabulary for {} column(s)", vocabulary.columns.len());
        Ok(vocabulary)
    }

    /// Compares every hash recorded in the pinned vocabulary against the
    /// files on disk. The dataset is only checked when it is present.
    pub fn check_artifacts(&self) -> Result<Vec<ArtifactCheck>, ArtifactError> {
        let vocabulary = Vocabulary::load(self.vocabulary_path())?;
        let mut checks = Vec::new();

        for (file, expected) in &vocabulary.model_hashes {
            let path = self.models_dir().join(file);
            let actual = if path.exists() {
                Some(Self::hash_file(&path)?)
            } else {
                None
            };
            checks.push(ArtifactCheck {
                file: file.clone(),
                expected: expected.clone(),
                actual,
            });
        }

        if let Some(expected) = &vocabulary.dataset_sha256 {
            let path = self.dataset_path();
            if path.exists() {
                checks.push(ArtifactCheck {
                    file: DATASET_FILE.to_string(),
                    expected: expected.clone(),
                    actual: Some(Self::hash_file(&path)?),
                });
            }
        }

        for check in &checks {
            log::info!("  {}: {}", check.file, if check.is_ok() { "ok" } else { "MISMATCH" });
        }
        Ok(checks)
    }

    /// Like [`Self::check_artifacts`], failing on the first mismatch.
    pub fn verify(&self) -> Result<(), ArtifactError> {
        for check in self.check_artifacts()? {
            if !check.is_ok() {
                return Err(ArtifactError::HashMismatch {
                    file_type: check.file,
                    expected: check.expected,
                    actual: check.actual.unwrap_or_else(|| "<missing>".to_string()),
                });
            }
        }
        Ok(())
    }
}
