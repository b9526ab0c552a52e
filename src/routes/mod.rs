use axum::{Router, http::HeaderName};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Extractors reporting rejections as [`AppError`](crate::error::AppError).
pub mod extract;
/// Game routes.
pub mod game;
/// Health check route.
pub mod health;
/// User routes.
pub mod user;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(game::router())
        .merge(user::router())
        .merge(docs::router())
        .with_state(state)
}

/// Full application: routes plus the cross-cutting middleware layers.
pub fn app(state: SharedState) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(game::TOTAL_COUNT_HEADER)]);

    router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
