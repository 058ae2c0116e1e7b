use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// These are the service liveness check and the identity gateway; everything
/// else in the API requires a bearer token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // A simple, unauthenticated endpoint used for monitoring and load balancer
        // checks. Confirms the service is running and responsive.
        .route("/health", get(handlers::health))
        // POST /api/auth/register
        // Creates a new identity (role 'citizen') and returns a session token.
        // Duplicate emails are rejected before the insert.
        .route("/auth/register", post(handlers::register))
        // POST /api/auth/login
        // Verifies credentials against the stored hash and issues a fresh token.
        .route("/auth/login", post(handlers::login))
}
