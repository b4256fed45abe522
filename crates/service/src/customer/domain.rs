use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::{validate_nickname, validate_password, validate_phone};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(
        required(message = "nickname cannot be null"),
        custom(function = "validate_nickname")
    )]
    pub nickname: Option<String>,
    #[validate(
        length(min = 1, message = "phone cannot be null"),
        custom(function = "validate_phone")
    )]
    pub phone: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    /// Outcome of the phone verification step; absent counts as not verified.
    #[serde(default)]
    pub phone_verified: Option<bool>,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1, message = "phone cannot be null"))]
    pub phone: String,
    #[validate(length(min = 1, message = "password cannot be null"))]
    pub password: String,
}

/// Refresh-token exchange input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Persisted customer. Holds the password hash, so it never leaves the service layer.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub phone: String,
    pub nickname: String,
    pub password_hash: String,
    pub phone_verified: bool,
}

/// Customer row to be inserted
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub phone: String,
    pub nickname: String,
    pub password_hash: String,
    pub phone_verified: bool,
}

/// Public view of a customer returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerView {
    pub nickname: String,
    pub phone: String,
}

impl From<&Customer> for CustomerView {
    fn from(c: &Customer) -> Self {
        Self { nickname: c.nickname.clone(), phone: c.phone.clone() }
    }
}

/// Access/refresh token pair issued on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_input_reads_camel_case() {
        let input: RegisterInput = serde_json::from_value(serde_json::json!({
            "nickname": "baker",
            "phone": "01012345678",
            "password": "bread123!",
            "phoneVerified": true
        }))
        .unwrap();
        assert_eq!(input.nickname.as_deref(), Some("baker"));
        assert_eq!(input.phone_verified, Some(true));
    }

    #[test]
    fn missing_phone_verified_is_none() {
        let input: RegisterInput = serde_json::from_value(serde_json::json!({
            "nickname": null,
            "phone": "01012345678",
            "password": "bread123!"
        }))
        .unwrap();
        assert!(input.nickname.is_none());
        assert!(input.phone_verified.is_none());
    }

    #[test]
    fn view_has_no_password_field() {
        let c = Customer {
            id: Uuid::new_v4(),
            phone: "01012345678".into(),
            nickname: "baker".into(),
            password_hash: "$argon2id$secret".into(),
            phone_verified: true,
        };
        let json = serde_json::to_value(CustomerView::from(&c)).unwrap();
        assert_eq!(json, serde_json::json!({"nickname": "baker", "phone": "01012345678"}));
    }

    #[test]
    fn token_pair_writes_camel_case() {
        let pair = TokenPair { access_token: "a".into(), refresh_token: "r".into() };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }
}
