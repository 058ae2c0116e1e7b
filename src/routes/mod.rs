/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. This structure ensures that
/// access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.
///
/// The three modules map directly to the defined access roles.

/// Routes accessible to all clients: health check and the auth gateway
/// (register, login).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a valid bearer token.
pub mod authenticated;

/// Routes restricted exclusively to users with the 'admin' role.
/// Handlers perform the mandatory role check after authentication.
pub mod admin;
