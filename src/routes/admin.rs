use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the 'admin' role:
/// report triage (status, assignee, priority) and report deletion.
///
/// Access Control:
/// This router is merged behind the same authentication layer as the
/// authenticated routes; on top of that, every handler here explicitly checks
/// for the `role='admin'` permission (`require_admin`) before proceeding. A
/// valid token with a citizen role gets a 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // PUT /api/reports/{id}
        // The core triage endpoint: moves a report through its lifecycle
        // (Pending / In Progress / Resolved), assigns it, and sets priority.
        // Partial payloads only touch the provided fields.
        // DELETE /api/reports/{id}
        // Removes a report and, best-effort, its stored photo.
        .route(
            "/reports/{id}",
            put(handlers::update_report).delete(handlers::delete_report),
        )
}
