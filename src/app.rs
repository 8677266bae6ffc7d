// app.rs
use axum::{Router, http::HeaderValue, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{Deployment, ServerSettings},
    docs,
    handlers::*,
    models::AppState,
};

/// Every origin in development, only the configured list in production.
pub fn cors_layer(server: &ServerSettings) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match server.environment {
        Deployment::Development => Ok(layer.allow_origin(Any)),
        Deployment::Production => {
            let origins = server
                .allowed_origins
                .iter()
                .map(|origin| {
                    origin
                        .parse::<HeaderValue>()
                        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {origin:?}: {e}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(layer.allow_origin(origins))
        }
    }
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/light", get(get_light).post(update_light))
        // Legacy path still called by the web dashboard.
        .route("/toggle-light", get(get_light).post(update_light))
        .route("/health", get(health_check))
        .route("/ws/light", get(handle_light_ws_upgrade))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
