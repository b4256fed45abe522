//! One-way salted password hashing (Argon2id, PHC string format).

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;

use super::errors::CustomerError;

/// Hashing collaborator used by registration and login.
pub trait PasswordEncoder: Send + Sync {
    fn hash(&self, raw: &str) -> Result<String, CustomerError>;
    /// `Ok(false)` on mismatch; `Err` only when the stored digest is unusable.
    fn verify(&self, raw: &str, digest: &str) -> Result<bool, CustomerError>;
}

/// Argon2id with default parameters and a random per-hash salt.
#[derive(Clone, Default)]
pub struct Argon2PasswordEncoder {
    pepper: Option<String>,
}

impl Argon2PasswordEncoder {
    pub fn new(pepper: Option<String>) -> Self { Self { pepper } }

    fn peppered<'a>(&self, raw: &'a str) -> std::borrow::Cow<'a, str> {
        match &self.pepper {
            Some(p) => format!("{p}{raw}").into(),
            None => raw.into(),
        }
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn hash(&self, raw: &str) -> Result<String, CustomerError> {
        let salt = SaltString::generate(&mut OsRng);
        let input = self.peppered(raw);
        Ok(Argon2::default()
            .hash_password(input.as_bytes(), &salt)
            .map_err(|e| CustomerError::HashError(e.to_string()))?
            .to_string())
    }

    fn verify(&self, raw: &str, digest: &str) -> Result<bool, CustomerError> {
        let parsed = PasswordHash::new(digest).map_err(|e| CustomerError::HashError(e.to_string()))?;
        let input = self.peppered(raw);
        match Argon2::default().verify_password(input.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CustomerError::HashError(e.to_string())),
        }
    }
}
