use std::collections::BTreeMap;

use log::{info, warn};

use super::label_encoder::LabelEncoder;
use super::vocabulary::Vocabulary;
use crate::catalog::CategoryCatalog;
use crate::dataset::Dataset;
use crate::error::EncodingError;

/// Label encoders for every categorical column, keyed by column name.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelEncoderRegistry {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl LabelEncoderRegistry {
    /// Fits one encoder per categorical column of the dataset.
    pub fn fit_dataset(dataset: &Dataset) -> Self {
        let encoders: BTreeMap<String, LabelEncoder> = dataset
            .categorical_columns()
            .map(|c| (c.name.clone(), LabelEncoder::fit(c.name.clone(), c.distinct.iter().cloned())))
            .collect();
        info!(
            "Fitted {} label encoder(s): {:?}",
            encoders.len(),
            encoders.keys().collect::<Vec<_>>()
        );
        Self { encoders }
    }

    /// Rebuilds the registry from a pinned vocabulary, keeping its code order.
    pub fn from_vocabulary(vocabulary: &Vocabulary) -> Self {
        let encoders = vocabulary
            .columns
            .iter()
            .map(|(column, values)| (column.clone(), LabelEncoder::from_classes(column.clone(), values.clone())))
            .collect();
        Self { encoders }
    }

    pub fn to_vocabulary(&self) -> Vocabulary {
        Vocabulary::new(
            self.encoders
                .iter()
                .map(|(column, encoder)| (column.clone(), encoder.classes().to_vec()))
                .collect(),
        )
    }

    pub fn insert(&mut self, encoder: LabelEncoder) {
        self.encoders.insert(encoder.column().to_string(), encoder);
    }

    pub fn encoder(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    /// Encodes a raw value of `column`.
    ///
    /// # Errors
    /// - `EncodingError::MissingEncoder` if no encoder was fitted for `column`
    /// - `EncodingError::UnknownCategory` if the value is outside the vocabulary
    pub fn transform(&self, column: &str, raw_value: &str) -> Result<usize, EncodingError> {
        let encoder = self
            .encoder(column)
            .ok_or_else(|| EncodingError::MissingEncoder(column.to_string()))?;
        Ok(encoder.transform(raw_value)?)
    }

    /// Catalog codes the registry cannot encode. Empty when the catalog and
    /// the training vocabulary agree.
    pub fn dangling_codes(&self, catalog: &CategoryCatalog) -> Vec<&'static str> {
        let dangling: Vec<&'static str> = match self.encoder(catalog.column()) {
            Some(encoder) => catalog.codes().filter(|code| !encoder.contains(code)).collect(),
            None => catalog.codes().collect(),
        };
        if !dangling.is_empty() {
            warn!(
                "{} code(s) of the {} catalog are not in the '{}' vocabulary: {:?}",
                dangling.len(),
                catalog.name(),
                catalog.column(),
                dangling
            );
        }
        dangling
    }
}
