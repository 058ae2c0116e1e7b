mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, header},
};
use chrono::Utc;
use civic_tracker::{
    AppConfig, AppState, MockStorageService,
    auth::{self, AuthUser, Claims},
    error::ApiError,
    models::User,
    repository::RepositoryState,
    storage::StorageState,
};
use common::InMemoryRepository;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use uuid::Uuid;

// --- Helpers ---

fn test_state() -> AppState {
    AppState {
        repo: Arc::new(InMemoryRepository::default()) as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig::default(),
    }
}

fn test_user(role: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Alice".to_string(),
        email: "alice@x.com".to_string(),
        password_hash: String::new(),
        phone: None,
        role: role.to_string(),
        created_at: Utc::now(),
    }
}

/// Runs the AuthUser extractor against a request carrying the given
/// Authorization header value (or none).
async fn extract(auth_header: Option<String>) -> Result<AuthUser, ApiError> {
    let state = test_state();
    let mut builder = Request::builder().uri("/api/reports");
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = builder.body(()).unwrap();
    let (mut parts, _) = request.into_parts();

    AuthUser::from_request_parts(&mut parts, &state).await
}

// --- Token Round Trip ---

#[tokio::test]
async fn test_issued_token_resolves_to_same_identity() {
    let user = test_user("citizen");
    let secret = AppConfig::default().jwt_secret;

    let token = auth::issue_token(&user, &secret).expect("issue failed");
    let resolved = extract(Some(format!("Bearer {token}")))
        .await
        .expect("extraction failed");

    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.email, user.email);
    assert_eq!(resolved.role, user.role);
}

#[tokio::test]
async fn test_admin_role_survives_round_trip() {
    let user = test_user("admin");
    let secret = AppConfig::default().jwt_secret;

    let token = auth::issue_token(&user, &secret).expect("issue failed");
    let resolved = extract(Some(format!("Bearer {token}"))).await.unwrap();

    assert_eq!(resolved.role, "admin");
    assert!(auth::require_admin(&resolved).is_ok());
}

// --- Rejections ---

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let result = extract(None).await;
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let result = extract(Some("Token abcdef".to_string())).await;
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
}

#[tokio::test]
async fn test_garbage_token_is_forbidden() {
    let result = extract(Some("Bearer not-a-jwt".to_string())).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_forbidden() {
    let user = test_user("citizen");
    let token = auth::issue_token(&user, "some-other-secret").unwrap();

    let result = extract(Some(format!("Bearer {token}"))).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    // Hand-roll claims whose expiry is well past the validation leeway.
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: "alice@x.com".to_string(),
        role: "citizen".to_string(),
        iat: (now - 14_400) as usize,
        exp: (now - 7_200) as usize,
    };
    let secret = AppConfig::default().jwt_secret;
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let result = extract(Some(format!("Bearer {token}"))).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

// --- Access Policy ---

#[tokio::test]
async fn test_require_admin_rejects_citizen() {
    let citizen = AuthUser {
        id: Uuid::new_v4(),
        email: "alice@x.com".to_string(),
        role: "citizen".to_string(),
    };
    assert!(matches!(
        auth::require_admin(&citizen),
        Err(ApiError::Forbidden(_))
    ));
}

// --- Password Hashing ---

#[test]
fn test_hash_is_one_way_and_salted() {
    let hash = auth::hash_password("pw123").expect("hash failed");

    // PHC string, not the plaintext.
    assert!(hash.starts_with("$argon2"));
    assert!(!hash.contains("pw123"));

    // A second hash of the same secret differs (fresh salt per hash).
    let second = auth::hash_password("pw123").expect("hash failed");
    assert_ne!(hash, second);
}

#[test]
fn test_verify_accepts_correct_and_rejects_wrong_candidate() {
    let hash = auth::hash_password("pw123").expect("hash failed");

    assert!(auth::verify_password(&hash, "pw123"));
    assert!(!auth::verify_password(&hash, "pw124"));
    assert!(!auth::verify_password(&hash, ""));
}

#[test]
fn test_verify_rejects_unparseable_hash() {
    assert!(!auth::verify_password("not-a-phc-string", "pw123"));
}
