//! Core domain types and scoring logic for the diabetes risk service.
//!
//! This crate provides the types shared across the service:
//!
//! - [`FeatureVector`] — the six-field numeric input to the classifier, with
//!   extraction, defaulting, coercion, and sanitation rules
//! - [`RiskLevel`] — three-tier label derived from the positive-class probability
//! - [`Scorer`] and [`Score`] — the narrow seam over the opaque model artifact
//! - [`FeatureError`] and [`ScoreError`] — domain error types
//!
//! # Example
//!
//! ```rust
//! use diarisk_core::{FeatureVector, RiskLevel};
//!
//! let body = serde_json::json!({ "Glucose": 150, "Age": 45 });
//! let features = FeatureVector::from_json(body.as_object().unwrap());
//! assert_eq!(features.glucose, 150.0);
//! assert_eq!(RiskLevel::from_probability(0.75), RiskLevel::High);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, warn};

/// Feature names in the exact order the model artifact was trained with.
pub const FEATURE_NAMES: [&str; 6] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "Insulin",
    "BMI",
    "Age",
];

/// Number of input features the classifier expects.
pub const FEATURE_COUNT: usize = 6;

/// Default substituted for a missing or null `Age` field, and for an `Age`
/// outside the accepted `(0, 120]` range.
pub const DEFAULT_AGE: f64 = 30.0;

/// Upper bound of the accepted `Age` range (inclusive).
pub const AGE_MAX: f64 = 120.0;

/// Errors raised while coercing request fields into features.
#[derive(Error, Debug)]
pub enum FeatureError {
    /// A field value could not be coerced to a number.
    #[error("field '{field}' is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },
}

/// Errors raised by a [`Scorer`] implementation.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// The inference call itself failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The model ran but produced an output we cannot interpret.
    #[error("model output malformed: {0}")]
    Output(String),
}

/// The ordered six-element numeric input to the classifier.
///
/// Field order is significant: it must match [`FEATURE_NAMES`], the order used
/// when the model artifact was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub age: f64,
}

impl Default for FeatureVector {
    /// The full default vector `[0, 0, 0, 0, 0, 30]`.
    fn default() -> Self {
        Self {
            pregnancies: 0.0,
            glucose: 0.0,
            blood_pressure: 0.0,
            insulin: 0.0,
            bmi: 0.0,
            age: DEFAULT_AGE,
        }
    }
}

impl FeatureVector {
    /// Extracts a feature vector from a JSON request body.
    ///
    /// Missing or null fields take their per-field default (0, except `Age`
    /// which defaults to 30). If *any* field fails numeric coercion the entire
    /// vector falls back to the default — this all-or-nothing reset is the
    /// service's observed contract, not per-field isolation. The result is
    /// then range-sanitized.
    pub fn from_json(body: &Map<String, Value>) -> Self {
        match Self::coerce(body) {
            Ok(features) => features.sanitized(),
            Err(e) => {
                error!(
                    component = "ml-service",
                    error = %e,
                    "feature coercion failed, falling back to default vector"
                );
                Self::default()
            }
        }
    }

    fn coerce(body: &Map<String, Value>) -> Result<Self, FeatureError> {
        Ok(Self {
            pregnancies: coerce_field(body, "Pregnancies", 0.0)?,
            glucose: coerce_field(body, "Glucose", 0.0)?,
            blood_pressure: coerce_field(body, "BloodPressure", 0.0)?,
            insulin: coerce_field(body, "Insulin", 0.0)?,
            bmi: coerce_field(body, "BMI", 0.0)?,
            age: coerce_field(body, "Age", DEFAULT_AGE)?,
        })
    }

    /// Applies range sanitation. Only `Age` has a checked domain: values
    /// outside `(0, 120]` are replaced with 30 and logged as a warning.
    fn sanitized(mut self) -> Self {
        if self.age <= 0.0 || self.age > AGE_MAX {
            warn!(
                component = "ml-service",
                rejected_age = self.age,
                "Age outside (0, 120], substituting default"
            );
            self.age = DEFAULT_AGE;
        }
        self
    }

    /// The features as a fixed-order array, ready for the model input row.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.insulin,
            self.bmi,
            self.age,
        ]
    }
}

/// Coerces a single field to `f64`, substituting `default` when the field is
/// absent or JSON null. Numbers pass through; numeric strings are accepted.
fn coerce_field(
    body: &Map<String, Value>,
    field: &'static str,
    default: f64,
) -> Result<f64, FeatureError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| FeatureError::NotNumeric {
            field,
            value: n.to_string(),
        }),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| FeatureError::NotNumeric {
            field,
            value: s.clone(),
        }),
        Some(other) => Err(FeatureError::NotNumeric {
            field,
            value: other.to_string(),
        }),
    }
}

/// Risk tier derived from the positive-class probability.
///
/// | Probability | Tier |
/// |-------------|------|
/// | `p >= 0.7` | `High Risk` |
/// | `0.4 <= p < 0.7` | `Medium Risk` |
/// | `p < 0.4` | `Low Risk` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

/// Probability threshold at or above which a score is `High Risk`.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probability threshold at or above which a score is at least `Medium Risk`.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

impl RiskLevel {
    /// Derives the tier from a probability. Pure and total over `[0, 1]`.
    pub fn from_probability(p: f64) -> Self {
        if p >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if p >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        };
        write!(f, "{}", s)
    }
}

/// A single scoring outcome from the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Predicted class label: 0 (negative) or 1 (positive).
    pub class: u8,
    /// Probability of the positive class, in `[0, 1]`.
    pub probability: f64,
}

/// Narrow interface over the opaque model artifact.
///
/// The artifact's serialization format belongs to the external training
/// process; implementations only promise single-row scoring over a
/// [`FeatureVector`]. Scorers are read-only after construction and safe for
/// unlimited concurrent callers.
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<Score, ScoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_body(body: Value) -> FeatureVector {
        FeatureVector::from_json(body.as_object().expect("test body must be an object"))
    }

    #[test]
    fn empty_body_yields_default_vector() {
        let v = from_body(json!({}));
        assert_eq!(v.as_array(), [0.0, 0.0, 0.0, 0.0, 0.0, 30.0]);
    }

    #[test]
    fn null_fields_take_per_field_defaults() {
        let v = from_body(json!({ "Glucose": null, "Age": null, "BMI": 22.5 }));
        assert_eq!(v.glucose, 0.0);
        assert_eq!(v.age, 30.0);
        assert_eq!(v.bmi, 22.5);
    }

    #[test]
    fn numeric_strings_coerce() {
        let v = from_body(json!({ "Glucose": "150", "BMI": " 32.5 " }));
        assert_eq!(v.glucose, 150.0);
        assert_eq!(v.bmi, 32.5);
    }

    #[test]
    fn one_bad_field_resets_the_entire_vector() {
        let v = from_body(json!({
            "Pregnancies": 2,
            "Glucose": "not-a-number",
            "BloodPressure": 80,
            "Age": 45
        }));
        // Not per-field isolation: the good fields are discarded too.
        assert_eq!(v.as_array(), [0.0, 0.0, 0.0, 0.0, 0.0, 30.0]);
    }

    #[test]
    fn non_scalar_field_resets_the_entire_vector() {
        let v = from_body(json!({ "Insulin": [1, 2, 3], "Glucose": 120 }));
        assert_eq!(v.as_array(), [0.0, 0.0, 0.0, 0.0, 0.0, 30.0]);
    }

    #[test]
    fn age_boundaries_are_sanitized() {
        assert_eq!(from_body(json!({ "Age": 0 })).age, 30.0);
        assert_eq!(from_body(json!({ "Age": 121 })).age, 30.0);
        assert_eq!(from_body(json!({ "Age": -5 })).age, 30.0);
        assert_eq!(from_body(json!({ "Age": 1 })).age, 1.0);
        assert_eq!(from_body(json!({ "Age": 120 })).age, 120.0);
    }

    #[test]
    fn array_order_matches_feature_names() {
        let mut body = Map::new();
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            body.insert(name.to_string(), json!(i + 1));
        }
        let v = FeatureVector::from_json(&body);
        assert_eq!(v.as_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn risk_tier_thresholds() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.39), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn risk_tiers_are_exhaustive_over_unit_interval() {
        // Every probability lands in exactly one tier.
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let tier = RiskLevel::from_probability(p);
            let expected = if p >= 0.7 {
                RiskLevel::High
            } else if p >= 0.4 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };
            assert_eq!(tier, expected, "p = {}", p);
        }
    }

    #[test]
    fn risk_level_serializes_to_display_strings() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::Medium).unwrap(),
            "\"Medium Risk\""
        );
        assert_eq!(RiskLevel::High.to_string(), "High Risk");
    }
}
