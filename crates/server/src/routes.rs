use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod customer;

pub use customer::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (axum::http::StatusCode, String) {
    common::metrics::encode_metrics()
}

/// Build the full application router: public, customer and bearer-protected routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes (health + metrics)
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    // Sign-up, login and token refresh
    let customers = Router::new()
        .route("/customer/customers", post(customer::register))
        .route("/customer/login", post(customer::login))
        .route("/customer/token/refresh", post(customer::refresh));

    // Routes requiring an access token
    let protected = Router::new()
        .route("/customer/me", get(customer::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            customer::require_bearer_token,
        ));

    // Compose
    public
        .merge(customers)
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
