//! Prediction endpoint: extract features, score, derive the risk tier.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

use diarisk_core::{FeatureVector, RiskLevel};

use crate::dto::PredictResponse;
use crate::error::AppError;
use crate::ServerState;

/// Scores one six-feature request body against the loaded classifier.
///
/// Field extraction never fails the request: missing/null fields take their
/// defaults and any coercion failure resets the whole vector (see
/// [`FeatureVector::from_json`]). The only request-level errors are a missing
/// model handle and an inference failure.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    Json(body): Json<Value>,
) -> Result<Json<PredictResponse>, AppError> {
    info!(
        component = "ml-service",
        client = %client,
        body = %body,
        "received prediction request"
    );

    let scorer = state.scorer.as_ref().ok_or(AppError::ModelUnavailable)?;
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::Internal("request body must be a JSON object".to_string()))?;

    let features = FeatureVector::from_json(obj);
    info!(
        component = "ml-service",
        features = ?features.as_array(),
        "extracted features for prediction"
    );

    let score = scorer.score(&features)?;
    let response = PredictResponse {
        prediction: score.class,
        probability: score.probability,
        risk_level: RiskLevel::from_probability(score.probability),
    };
    info!(
        component = "ml-service",
        prediction = response.prediction,
        probability = response.probability,
        risk_level = %response.risk_level,
        "prediction result"
    );

    Ok(Json(response))
}
