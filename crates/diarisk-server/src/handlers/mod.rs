//! HTTP route handlers for the risk service.

pub mod predict;

/// Liveness probe. Answers regardless of model-load state so orchestration
/// can tell "process is up" from "model is ready".
pub async fn ping() -> &'static str {
    "pong"
}
