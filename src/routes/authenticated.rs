use crate::{AppState, handlers};
use axum::{Router, extract::DefaultBodyLimit, routing::get};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: profile access, report reads, and report submission.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that all
/// handlers receive a validated `AuthUser` struct containing the caller's ID and
/// role, which is then used for ownership scoping (e.g. in `get_my_reports` and
/// `create_report`).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/auth/profile
        // Retrieves the currently authenticated user's identity record, hash excluded.
        .route("/auth/profile", get(handlers::get_profile))
        // GET /api/reports
        // Lists all reports in the system, newest submission first, with owner info.
        // POST /api/reports
        // Submits a new report as multipart form data with an optional photo.
        // The body limit is raised above the 5 MiB file ceiling so an oversized
        // upload reaches the explicit check and gets a 400 rather than a 413.
        .route(
            "/reports",
            get(handlers::get_reports)
                .post(handlers::create_report)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        // GET /api/reports/my
        // Lists the caller's own reports. The owner filter is the verified identity.
        .route("/reports/my", get(handlers::get_my_reports))
        // GET /api/reports/{id}
        // Retrieves a single report with owner info.
        .route("/reports/{id}", get(handlers::get_report))
}
