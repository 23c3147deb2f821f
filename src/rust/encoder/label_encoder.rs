use std::collections::{BTreeMap, BTreeSet};

use crate::error::UnknownCategoryError;

/// A bijection between the distinct values of one column and `0..n`.
///
/// Codes are assigned in sorted (code point) order of the raw values, the
/// ordering scikit-learn's `LabelEncoder` uses. The damage models were trained
/// against that ordering, so any other assignment silently corrupts predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    index: BTreeMap<String, usize>,
}

impl LabelEncoder {
    /// Fits an encoder on the observed values of `column`.
    ///
    /// Duplicates are collapsed and input order is irrelevant.
    pub fn fit<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        Self::from_classes(column, distinct.into_iter().collect())
    }

    /// Rebuilds an encoder from values already in code order, as pinned in a
    /// [`super::Vocabulary`]. The caller guarantees the values are distinct.
    pub fn from_classes(column: impl Into<String>, classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();

        Self {
            column: column.into(),
            classes,
            index,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Fitted values in code order: `classes()[code]` is the value for `code`.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, raw_value: &str) -> bool {
        self.index.contains_key(raw_value)
    }

    /// Returns the integer code for a raw value.
    ///
    /// # Errors
    /// - `UnknownCategoryError` if the value was not present at fit time
    pub fn transform(&self, raw_value: &str) -> Result<usize, UnknownCategoryError> {
        self.index
            .get(raw_value)
            .copied()
            .ok_or_else(|| UnknownCategoryError {
                column: self.column.clone(),
                value: raw_value.to_string(),
            })
    }

    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}
