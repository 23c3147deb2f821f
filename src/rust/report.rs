//! Prediction results and how they are shown to the user.

use std::fmt;

use serde::Serialize;

use crate::error::ModelInvocationError;

/// The classifier's three damage outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageClass {
    Safe,
    HighRisk,
    Collapsed,
}

impl DamageClass {
    pub const ALL: [DamageClass; 3] = [DamageClass::Safe, DamageClass::HighRisk, DamageClass::Collapsed];

    pub fn code(self) -> i64 {
        match self {
            DamageClass::Safe => 0,
            DamageClass::HighRisk => 1,
            DamageClass::Collapsed => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DamageClass::Safe => "Safe",
            DamageClass::HighRisk => "High Risk",
            DamageClass::Collapsed => "Collapsed",
        }
    }

    /// Traffic-light marker shown next to the label.
    pub fn indicator(self) -> &'static str {
        match self {
            DamageClass::Safe => "🟢",
            DamageClass::HighRisk => "🟠",
            DamageClass::Collapsed => "🔴",
        }
    }
}

impl TryFrom<i64> for DamageClass {
    type Error = ModelInvocationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DamageClass::Safe),
            1 => Ok(DamageClass::HighRisk),
            2 => Ok(DamageClass::Collapsed),
            other => Err(ModelInvocationError::UnmappedClass(other)),
        }
    }
}

impl fmt::Display for DamageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outputs of both models for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub mean_damage_index: f64,
    pub damage_class: DamageClass,
}

/// Rounds to the 4 decimals the damage index is displayed with.
///
/// Rounds the exact binary value, so `2.00005` (stored just below the
/// midpoint) becomes `2.0`.
pub fn round_index(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

/// Human-readable summary of a result.
pub fn render_text(result: &PredictionResult) -> String {
    format!(
        "Prediction Results\n  Mean Damage Index: {}\n  Damage Class:      {} {}\n",
        round_index(result.mean_damage_index),
        result.damage_class.indicator(),
        result.damage_class.label(),
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mean_damage_index: f64,
    damage_class: DamageClass,
    damage_class_code: i64,
    damage_label: &'a str,
}

/// Machine-readable summary of a result.
pub fn render_json(result: &PredictionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        mean_damage_index: round_index(result.mean_damage_index),
        damage_class: result.damage_class,
        damage_class_code: result.damage_class.code(),
        damage_label: result.damage_class.label(),
    })
}
