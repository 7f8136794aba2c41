//! Data transfer objects for HTTP message serialization.

use diarisk_core::RiskLevel;
use serde::Serialize;

/// Successful response from the predict endpoint.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Predicted class label: 0 (negative) or 1 (positive).
    pub prediction: u8,
    /// Probability of the positive class, in `[0, 1]`.
    pub probability: f64,
    /// Tier derived from the probability.
    pub risk_level: RiskLevel,
}
