use thiserror::Error;

/// Business errors for customer workflows
#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("{0}")]
    Validation(String),
    #[error("phone number already exists")]
    DuplicatePhone,
    #[error("phone number must be authenticated")]
    UnverifiedPhone,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl CustomerError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            CustomerError::Validation(_) => 1001,
            CustomerError::DuplicatePhone => 1002,
            CustomerError::UnverifiedPhone => 1003,
            CustomerError::Unauthorized => 1004,
            CustomerError::HashError(_) => 1101,
            CustomerError::TokenError(_) => 1102,
            CustomerError::Repository(_) => 1200,
        }
    }

    /// Label used for the rejection metrics
    pub fn reason(&self) -> &'static str {
        match self {
            CustomerError::Validation(_) => "validation",
            CustomerError::DuplicatePhone => "duplicate_phone",
            CustomerError::UnverifiedPhone => "unverified_phone",
            CustomerError::Unauthorized => "unauthorized",
            CustomerError::HashError(_) => "hash",
            CustomerError::TokenError(_) => "token",
            CustomerError::Repository(_) => "repository",
        }
    }

    /// Whether the caller can fix the request; everything else is an internal fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CustomerError::Validation(_)
                | CustomerError::DuplicatePhone
                | CustomerError::UnverifiedPhone
                | CustomerError::Unauthorized
        )
    }
}

impl From<models::errors::ModelError> for CustomerError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::UniqueViolation(_) => CustomerError::DuplicatePhone,
            models::errors::ModelError::Validation(msg) => CustomerError::Validation(msg),
            models::errors::ModelError::Db(msg) => CustomerError::Repository(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(CustomerError::DuplicatePhone.to_string(), "phone number already exists");
        assert_eq!(CustomerError::UnverifiedPhone.to_string(), "phone number must be authenticated");
        assert_eq!(CustomerError::Validation("nickname: nickname cannot be null".into()).to_string(), "nickname: nickname cannot be null");
    }

    #[test]
    fn unique_violation_becomes_duplicate_phone() {
        let e: CustomerError = ModelError::UniqueViolation("uniq_customer_phone".into()).into();
        assert!(matches!(e, CustomerError::DuplicatePhone));
        let e: CustomerError = ModelError::Db("connection reset".into()).into();
        assert!(matches!(e, CustomerError::Repository(_)));
        assert!(!e.is_client_error());
    }
}
