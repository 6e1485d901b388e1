//! Admin authentication.
//!
//! Passwords are stored as argon2 PHC strings. A successful login returns
//! an HS256 JWT that the sale recording routes require as
//! `Authorization: Bearer <token>`.
//!
//! ```text
//! POST /login ──► verify_password ──► JwtManager::issue ──► { token }
//!
//! POST /sales
//!   Authorization: Bearer eyJ...
//!        │
//!        ▼
//!   AuthAdmin extractor ── no header ──► 401 "No Token Provided"
//!        │             └─ bad token ──► 401 "Invalid Token"
//!        ▼
//!   handler
//! ```

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin id)
    pub sub: String,

    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issue a token for an admin.
    pub fn issue(&self, admin_id: &str, username: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: admin_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "Failed to encode token");
            ApiError::internal("Login failed")
        })
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(token, &self.decoding, &Validation::default())
            .map_err(|e| {
                debug!(error = %e, "Rejected token");
                ApiError::unauthorized("Invalid Token")
            })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Password hashing
// =============================================================================

/// Hashes a password into a PHC string with a random 16-byte salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|e| {
        error!(error = %e, "Failed to build salt");
        ApiError::internal("Registration failed")
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::internal("Registration failed")
        })
}

/// Checks a password against a stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated admin of a request.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("No Token Provided"))?;

        state.jwt.validate(token).map(AuthAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.issue("admin-001", "admin").unwrap();
        let claims = manager.validate(&token).unwrap();

        assert_eq!(claims.sub, "admin-001");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);

        let token = issuer.issue("admin-001", "admin").unwrap();
        assert!(verifier.validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60 s leeway.
        let manager = JwtManager::new("test-secret", -120);
        let token = manager.issue("admin-001", "admin").unwrap();
        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
