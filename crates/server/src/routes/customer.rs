use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use tracing::warn;

use service::customer::{
    domain::{CustomerView, LoginInput, RefreshInput, RegisterInput, TokenPair},
    repository::CustomerRepository,
    CustomerService,
};

use crate::errors::ApiError;

/// Shared handler state; the repository backend is chosen at startup.
#[derive(Clone)]
pub struct ServerState {
    pub customers: Arc<CustomerService<dyn CustomerRepository>>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

#[utoipa::path(post, path = "/customer/customers", tag = "customer", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered", body = crate::openapi::CustomerResponse), (status = 400, description = "Validation failed, duplicate phone or unverified phone", body = crate::openapi::ErrorResponse)))]
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerView>), ApiError> {
    let input = body(payload)?;
    let view = state.customers.register(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(post, path = "/customer/login", tag = "customer", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in", body = crate::openapi::TokenResponse), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)))]
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let input = body(payload)?;
    Ok(Json(state.customers.login(input).await?))
}

#[utoipa::path(post, path = "/customer/token/refresh", tag = "customer", request_body = crate::openapi::RefreshRequest, responses((status = 200, description = "New token pair", body = crate::openapi::TokenResponse), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)))]
pub async fn refresh(
    State(state): State<ServerState>,
    payload: Result<Json<RefreshInput>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let input = body(payload)?;
    Ok(Json(state.customers.refresh(input).await?))
}

#[utoipa::path(get, path = "/customer/me", tag = "customer", responses((status = 200, description = "Current customer", body = crate::openapi::CustomerResponse), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn me(Extension(customer): Extension<CustomerView>) -> Json<CustomerView> {
    Json(customer)
}

/// Resolve `Authorization: Bearer <access token>` to the customer and stash it in request extensions.
/// Missing, malformed, invalid or expired tokens all yield 401.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let token = match token {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(ApiError::unauthorized("invalid authorization header"));
            }
        },
        None => {
            warn!(path = %path, "missing Authorization header");
            return Err(ApiError::unauthorized("missing bearer token"));
        }
    };

    let customer = state.customers.current(&token).await.map_err(ApiError::from)?;
    req.extensions_mut().insert(customer);
    Ok(next.run(req).await)
}
