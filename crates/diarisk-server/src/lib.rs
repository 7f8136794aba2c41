//! Axum router and shared state for the diabetes risk service.
//!
//! The binary in `main.rs` resolves configuration, initializes tracing, loads
//! the model, and serves the router built here. The router is exposed from the
//! library so HTTP-level tests can drive it without binding a socket.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use diarisk_core::Scorer;

/// Shared server state accessible from all handlers.
///
/// The scorer is set once at startup and never mutated: `None` means the model
/// artifact failed to load and every prediction request will be refused until
/// the process is restarted with a valid artifact.
pub struct ServerState {
    pub scorer: Option<Arc<dyn Scorer>>,
}

/// Builds the application router: `/predict` under the request-tracing layer,
/// `/ping` outside it so liveness probes stay quiet, CORS over everything.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/ping", get(handlers::ping))
        .layer(cors)
        .with_state(state)
}
