use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, models::User};

/// Sessions are valid for a fixed window of 7 days from issuance.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// Claims
///
/// The payload signed into every session JWT. Verification is stateless: the
/// claims ARE the caller's identity for the lifetime of the token, so a deleted
/// or demoted user keeps access until `exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID.
    pub sub: Uuid,
    /// The user's email at issuance time.
    pub email: String,
    /// The user's role at issuance time: 'citizen' or 'admin'.
    pub role: String,
    /// Expiration Time (exp): timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the JWT was issued.
    pub iat: usize,
}

/// issue_token
///
/// Converts a verified identity into a signed, time-bounded bearer credential.
pub fn issue_token(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// hash_password
///
/// One-way hashes a secret with Argon2 (default parameters) and a fresh random
/// salt, producing a PHC string for storage. The plaintext is dropped here.
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| e.to_string())?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| e.to_string())?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// verify_password
///
/// Compares a candidate secret against a stored PHC hash. An unparseable hash
/// counts as a failed verification rather than an error.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request, decoded from the bearer
/// token's claims. Handlers use this struct for ownership and role checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// The user's role as signed into the token. Used for Role-Based Access Control.
    pub role: String,
}

/// require_admin
///
/// The single access-policy check: gates an operation to the elevated role.
pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.role != "admin" {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler, and separating authentication from the
/// handlers' business logic.
///
/// Verification is a pure function of token, server secret, and clock:
/// 1. Bearer token extraction from the Authorization header.
/// 2. Signature and expiry validation against the configured secret.
/// 3. Identity taken from the claims, with no database lookup.
///
/// Rejection: 401 when no token is presented, 403 when the token is invalid
/// or expired.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the JWT secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // 1. Token Extraction
        // Retrieve the Authorization header and ensure it is prefixed with "Bearer ".
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

        // 2. JWT Decoding Setup
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        // 3. Decode and Validate the Token
        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                return Err(match e.kind() {
                    // Token expired: the most common failure for a valid-but-old token.
                    ErrorKind::ExpiredSignature => {
                        ApiError::Forbidden("Invalid or expired token".to_string())
                    }
                    // Catch all other failure types (bad signature, malformed token, etc.).
                    _ => ApiError::Forbidden("Invalid or expired token".to_string()),
                });
            }
        };

        // Success: the claims are the identity.
        Ok(AuthUser {
            id: token_data.claims.sub,
            email: token_data.claims.email,
            role: token_data.claims.role,
        })
    }
}
