//! JWT access/refresh token issuance and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::domain::{Customer, TokenPair};
use super::errors::CustomerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both token kinds; `sub` is the customer's phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub typ: TokenKind,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Token issuance collaborator used by login and refresh.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, customer: &Customer) -> Result<TokenPair, CustomerError>;
    /// Verify signature, expiry, issuer and kind. Any failure is `Unauthorized`.
    fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, CustomerError>;
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

// Ten years; keeps `now + ttl` far from chrono's range limits.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            access_ttl: ttl(cfg.access_ttl_secs),
            refresh_ttl: ttl(cfg.refresh_ttl_secs),
        }
    }

    fn sign(&self, sub: &str, typ: TokenKind, ttl: Duration) -> Result<String, CustomerError> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            typ,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CustomerError::TokenError(e.to_string()))
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, customer: &Customer) -> Result<TokenPair, CustomerError> {
        Ok(TokenPair {
            access_token: self.sign(&customer.phone, TokenKind::Access, self.access_ttl)?,
            refresh_token: self.sign(&customer.phone, TokenKind::Refresh, self.refresh_ttl)?,
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, CustomerError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(err = %e, "token rejected");
                CustomerError::Unauthorized
            })?
            .claims;
        if claims.typ != kind {
            debug!(expected = ?kind, got = ?claims.typ, "token kind mismatch");
            return Err(CustomerError::Unauthorized);
        }
        Ok(claims)
    }
}
