//! Form inputs and their fixed-order numeric encoding.

use std::ops::RangeInclusive;

use log::debug;
use ndarray::{Array2, ArrayView1};

use crate::catalog::CategoryCatalog;
use crate::encoder::LabelEncoderRegistry;
use crate::error::{EncodingError, InputError};

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 6;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "struct_typ",
    "occ_type",
    "year_built",
    "no_stories",
    "magnitude",
    "distance",
];

pub const DEFAULT_YEAR_BUILT: i64 = 2000;
pub const DEFAULT_NO_STORIES: i64 = 0;
pub const DEFAULT_MAGNITUDE: f64 = 5.0;
pub const DEFAULT_DISTANCE: f64 = 3.0;

/// One prediction query as entered on the form.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageQuery {
    /// Structural type display label, e.g. "Wooden Frame (W1)"
    pub structural_type: String,
    /// Occupancy display label, e.g. "Residential"
    pub occupancy: String,
    pub year_built: i64,
    pub no_stories: i64,
    /// Earthquake magnitude
    pub magnitude: f64,
    /// Distance from the epicenter in km
    pub distance: f64,
}

impl DamageQuery {
    /// A query with the form's default numeric values.
    pub fn new(structural_type: impl Into<String>, occupancy: impl Into<String>) -> Self {
        Self {
            structural_type: structural_type.into(),
            occupancy: occupancy.into(),
            year_built: DEFAULT_YEAR_BUILT,
            no_stories: DEFAULT_NO_STORIES,
            magnitude: DEFAULT_MAGNITUDE,
            distance: DEFAULT_DISTANCE,
        }
    }

    pub fn with_year_built(mut self, year_built: i64) -> Self {
        self.year_built = year_built;
        self
    }

    pub fn with_stories(mut self, no_stories: i64) -> Self {
        self.no_stories = no_stories;
        self
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

/// Inclusive bounds the input form enforces before anything is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBounds {
    pub year_built: RangeInclusive<i64>,
    pub no_stories: RangeInclusive<i64>,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            year_built: 1985..=2017,
            no_stories: 0..=30,
        }
    }
}

impl InputBounds {
    /// Rejects values outside the configured ranges. Magnitude and distance
    /// are unbounded but must be finite.
    pub fn validate(&self, query: &DamageQuery) -> Result<(), InputError> {
        Self::check_range("year_built", &self.year_built, query.year_built)?;
        Self::check_range("no_stories", &self.no_stories, query.no_stories)?;
        Self::check_finite("magnitude", query.magnitude)?;
        Self::check_finite("distance", query.distance)?;
        Ok(())
    }

    fn check_range(field: &'static str, range: &RangeInclusive<i64>, value: i64) -> Result<(), InputError> {
        if range.contains(&value) {
            Ok(())
        } else {
            Err(InputError::OutOfRange {
                field,
                min: *range.start(),
                max: *range.end(),
                value,
            })
        }
    }

    fn check_finite(field: &'static str, value: f64) -> Result<(), InputError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(InputError::NotFinite { field, value })
        }
    }
}

/// Model input row: struct code, occupancy code, year built, stories,
/// magnitude, distance. Always exactly [`FEATURE_COUNT`] values in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(
        struct_type_code: usize,
        occ_type_code: usize,
        year_built: i64,
        no_stories: i64,
        magnitude: f64,
        distance: f64,
    ) -> Self {
        Self([
            struct_type_code as f32,
            occ_type_code as f32,
            year_built as f32,
            no_stories as f32,
            magnitude as f32,
            distance as f32,
        ])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn values(&self) -> [f32; FEATURE_COUNT] {
        self.0
    }

    pub fn view(&self) -> ArrayView1<'_, f32> {
        ArrayView1::from(&self.0)
    }

    /// A `[1, FEATURE_COUNT]` batch holding this vector.
    pub fn to_batch(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| self.0[j])
    }
}

/// Encodes form queries using the fitted registry.
#[derive(Debug, Clone, Copy)]
pub struct FeatureVectorBuilder<'a> {
    registry: &'a LabelEncoderRegistry,
    structural: CategoryCatalog,
    occupancy: CategoryCatalog,
}

impl<'a> FeatureVectorBuilder<'a> {
    pub fn new(registry: &'a LabelEncoderRegistry) -> Self {
        Self {
            registry,
            structural: CategoryCatalog::structural(),
            occupancy: CategoryCatalog::occupancy(),
        }
    }

    /// Builds the feature vector for a query whose numeric fields were
    /// already checked by [`InputBounds::validate`].
    ///
    /// # Errors
    /// - `EncodingError::InvalidCategory` if a display label is not in its catalog
    /// - `EncodingError::UnknownCategory` if a resolved code is outside the vocabulary
    pub fn build(&self, query: &DamageQuery) -> Result<FeatureVector, EncodingError> {
        let struct_code = self.encode(&self.structural, &query.structural_type)?;
        let occ_code = self.encode(&self.occupancy, &query.occupancy)?;

        let vector = FeatureVector::new(
            struct_code,
            occ_code,
            query.year_built,
            query.no_stories,
            query.magnitude,
            query.distance,
        );
        debug!(
            "Encoded feature vector: {:?}",
            FEATURE_NAMES.iter().zip(vector.as_slice()).collect::<Vec<_>>()
        );
        Ok(vector)
    }

    fn encode(&self, catalog: &CategoryCatalog, display_choice: &str) -> Result<usize, EncodingError> {
        let raw_code = catalog.resolve(display_choice)?;
        self.registry.transform(catalog.column(), raw_code)
    }
}
