use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// Current on-disk vocabulary format.
pub const VOCABULARY_VERSION: u32 = 1;

/// Pinned encoder vocabulary, stored next to the models it was trained with.
///
/// Each column lists its values in code order (index == code). The file also
/// records the hashes of the dataset it was derived from and of the model
/// artifacts, so a mismatched set of files can be detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_sha256: Option<String>,
    pub columns: BTreeMap<String, Vec<String>>,
    /// Artifact file name -> hex SHA-256
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_hashes: BTreeMap<String, String>,
}

impl Vocabulary {
    pub fn new(columns: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            version: VOCABULARY_VERSION,
            dataset_sha256: None,
            columns,
            model_hashes: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let vocabulary: Self = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        info!("Loading pinned vocabulary from {:?}", path);
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("Writing pinned vocabulary to {:?}", path);
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Rejects unknown versions and columns mapping two codes to one value.
    fn validate(&self) -> Result<(), ArtifactError> {
        if self.version != VOCABULARY_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.version,
                supported: VOCABULARY_VERSION,
            });
        }
        for (column, values) in &self.columns {
            let distinct: BTreeSet<&String> = values.iter().collect();
            if distinct.len() != values.len() {
                return Err(ArtifactError::DuplicateValues(column.clone()));
            }
        }
        Ok(())
    }
}
