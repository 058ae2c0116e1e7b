use crate::models::{NewReport, NewUser, Report, UpdateReportRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, in-memory
/// test double, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
///
/// Every method surfaces storage failures as `sqlx::Error`; the endpoint boundary
/// converts them to generic 500 responses.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Inserts a new identity. The secret arrives pre-hashed. Callers check for an
    // existing email first; the unique index backstops concurrent duplicates.
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;
    // Lookup by the login key.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    // --- Reports ---
    // Owner is always the verified caller, never taken from the request body.
    async fn create_report(&self, report: NewReport, user_id: Uuid)
    -> Result<Report, sqlx::Error>;
    // All reports, newest submission first, joined with owner name/email.
    async fn get_reports(&self) -> Result<Vec<Report>, sqlx::Error>;
    // Same ordering and join, filtered to one owner.
    async fn get_reports_by_user(&self, user_id: Uuid) -> Result<Vec<Report>, sqlx::Error>;
    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, sqlx::Error>;
    // Partial triage update (status/assignee/priority); always refreshes updated_at.
    // Returns None when the report does not exist.
    async fn update_report(
        &self,
        id: Uuid,
        changes: UpdateReportRequest,
    ) -> Result<Option<Report>, sqlx::Error>;
    // Deletes and returns the removed row so the caller can clean up the stored
    // photo. Returns None when the report does not exist.
    async fn delete_report(&self, id: Uuid) -> Result<Option<Report>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// create_user
    ///
    /// Inserts a new identity with the 'citizen'/'admin' role supplied by the caller.
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, name, email, password_hash, phone, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.phone)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, phone, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, phone, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_report
    ///
    /// Inserts a new report with lifecycle defaults (Pending / Medium / unassigned)
    /// and immediately joins with `users` to return the enriched record, owner info
    /// included. Uses a CTE to perform the insert and join in one round trip.
    async fn create_report(
        &self,
        report: NewReport,
        user_id: Uuid,
    ) -> Result<Report, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            WITH inserted AS (
                INSERT INTO reports
                    (id, issue_type, title, description, location, location_source,
                     photo, status, submitted_at, updated_at, assigned_to, priority, user_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'Pending', NOW(), NOW(), '', 'Medium', $8)
                RETURNING *
            )
            SELECT i.id, i.issue_type, i.title, i.description, i.location, i.location_source,
                   i.photo, i.status, i.submitted_at, i.updated_at, i.assigned_to, i.priority,
                   i.user_id, u.name AS owner_name, u.email AS owner_email
            FROM inserted i
            JOIN users u ON i.user_id = u.id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report.issue_type)
        .bind(report.title)
        .bind(report.description)
        .bind(report.location)
        .bind(report.location_source)
        .bind(report.photo)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// get_reports
    ///
    /// Retrieves every report for the triage views, newest submission first.
    async fn get_reports(&self) -> Result<Vec<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            SELECT r.id, r.issue_type, r.title, r.description, r.location, r.location_source,
                   r.photo, r.status, r.submitted_at, r.updated_at, r.assigned_to, r.priority,
                   r.user_id, u.name AS owner_name, u.email AS owner_email
            FROM reports r
            JOIN users u ON r.user_id = u.id
            ORDER BY r.submitted_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_reports_by_user(&self, user_id: Uuid) -> Result<Vec<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            SELECT r.id, r.issue_type, r.title, r.description, r.location, r.location_source,
                   r.photo, r.status, r.submitted_at, r.updated_at, r.assigned_to, r.priority,
                   r.user_id, u.name AS owner_name, u.email AS owner_email
            FROM reports r
            JOIN users u ON r.user_id = u.id
            WHERE r.user_id = $1
            ORDER BY r.submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            SELECT r.id, r.issue_type, r.title, r.description, r.location, r.location_source,
                   r.photo, r.status, r.submitted_at, r.updated_at, r.assigned_to, r.priority,
                   r.user_id, u.name AS owner_name, u.email AS owner_email
            FROM reports r
            JOIN users u ON r.user_id = u.id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// update_report
    ///
    /// Triage update. Uses COALESCE so only provided fields change, while
    /// `updated_at` is refreshed unconditionally. Any status may transition to
    /// any other status.
    async fn update_report(
        &self,
        id: Uuid,
        changes: UpdateReportRequest,
    ) -> Result<Option<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            WITH updated AS (
                UPDATE reports
                SET status = COALESCE($2, status),
                    assigned_to = COALESCE($3, assigned_to),
                    priority = COALESCE($4, priority),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT i.id, i.issue_type, i.title, i.description, i.location, i.location_source,
                   i.photo, i.status, i.submitted_at, i.updated_at, i.assigned_to, i.priority,
                   i.user_id, u.name AS owner_name, u.email AS owner_email
            FROM updated i
            JOIN users u ON i.user_id = u.id
            "#,
        )
        .bind(id)
        .bind(changes.status)
        .bind(changes.assigned_to)
        .bind(changes.priority)
        .fetch_optional(&self.pool)
        .await
    }

    /// delete_report
    ///
    /// Deletes and returns the row. No owner join here; the caller only needs the
    /// photo path for file cleanup.
    async fn delete_report(&self, id: Uuid) -> Result<Option<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            DELETE FROM reports
            WHERE id = $1
            RETURNING id, issue_type, title, description, location, location_source,
                      photo, status, submitted_at, updated_at, assigned_to, priority, user_id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
