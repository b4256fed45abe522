use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use serde::Serialize;
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub nickname: String,
    pub phone: String,
    /// 8-20 characters with at least one letter, one digit and one special character
    pub password: String,
    pub phone_verified: bool,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub phone: String, pub password: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest { pub refresh_token: String }

#[derive(ToSchema)]
pub struct CustomerResponse { pub nickname: String, pub phone: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse { pub access_token: String, pub refresh_token: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String, pub code: u16 }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::customer::register,
        crate::routes::customer::login,
        crate::routes::customer::refresh,
        crate::routes::customer::me,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            CustomerResponse,
            TokenResponse,
            ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "customer")
    )
)]
pub struct ApiDoc;
