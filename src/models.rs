use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Allowed Values ---

// The original data model declared these as field-level enums; here they are
// explicit allow-lists consulted by the per-entity validation functions below.
pub const ROLES: &[&str] = &["citizen", "admin"];
pub const REPORT_STATUSES: &[&str] = &["Pending", "In Progress", "Resolved"];
pub const REPORT_PRIORITIES: &[&str] = &["Low", "Medium", "High", "Urgent"];
pub const LOCATION_SOURCES: &[&str] = &["gps", "manual", "unknown"];

/// FieldError
///
/// Structured result of a failed entity validation: which field, and why.
/// Handlers flatten this into the standard `{"error": ...}` 400 body.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            message: format!("{field} is required"),
        }
    }

    fn not_allowed(field: &'static str, value: &str, allowed: &[&str]) -> Self {
        Self {
            field,
            message: format!("{field} '{value}' is not one of {}", allowed.join(", ")),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The user's canonical identity record from the `users` table.
///
/// This struct is internal-only and deliberately does NOT derive `Serialize`:
/// the password hash must never travel on any read path. API responses use the
/// `UserSummary` and `UserProfile` projections below.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // The login key. Unique across all users.
    pub email: String,
    // Argon2 PHC string. Only ever compared, never returned.
    pub password_hash: String,
    pub phone: Option<String>,
    // The RBAC field: 'citizen' or 'admin'.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for the users table. The secret arrives here already hashed;
/// plaintext never crosses the repository boundary.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: String,
}

/// Report
///
/// A civic-issue report record from the `reports` table. List and detail queries
/// join the owner's name and email from `users`; `owner_name`/`owner_email` stay
/// `None` on query paths that skip the join (e.g. delete RETURNING).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Report {
    pub id: Uuid,
    pub issue_type: String,
    pub title: String,
    pub description: String,
    // Free-form location string ("12.34, 56.78" or a street address).
    pub location: String,
    // How the location was captured: gps, manual, or unknown.
    pub location_source: String,
    // Path to the stored photo, e.g. "uploads/photo-....jpg".
    pub photo: Option<String>,
    // Lifecycle state: Pending, In Progress, Resolved.
    pub status: String,
    #[ts(type = "string")]
    pub submitted_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub assigned_to: String,
    pub priority: String,
    // FK to users.id (Owner). Fixed at creation, never reassigned.
    pub user_id: Uuid,

    // Loaded via a JOIN with users on read paths.
    #[sqlx(default)]
    pub owner_name: Option<String>,
    #[sqlx(default)]
    pub owner_email: Option<String>,
}

/// NewReport
///
/// Fields assembled from the multipart report-creation request, after upload
/// handling. Not a serde payload: the handler builds it field by field.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub issue_type: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub location_source: String,
    pub photo: Option<String>,
}

impl NewReport {
    /// validate
    ///
    /// Explicit pre-persistence validation: required fields present, location
    /// source in the allow-list. An empty source falls back to "unknown" rather
    /// than failing, matching the field's default.
    pub fn validate(&mut self) -> Result<(), FieldError> {
        if self.issue_type.trim().is_empty() {
            return Err(FieldError::required("issueType"));
        }
        if self.title.trim().is_empty() {
            return Err(FieldError::required("title"));
        }
        if self.description.trim().is_empty() {
            return Err(FieldError::required("description"));
        }
        if self.location.trim().is_empty() {
            return Err(FieldError::required("location"));
        }
        if self.location_source.is_empty() {
            self.location_source = "unknown".to_string();
        } else if !LOCATION_SOURCES.contains(&self.location_source.as_str()) {
            return Err(FieldError::not_allowed(
                "locationSource",
                &self.location_source,
                LOCATION_SOURCES,
            ));
        }
        Ok(())
    }
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /api/auth/register. The password is hashed before it
/// reaches the repository and is never persisted or logged in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::required("name"));
        }
        if self.email.trim().is_empty() {
            return Err(FieldError::required("email"));
        }
        if self.password.is_empty() {
            return Err(FieldError::required("password"));
        }
        Ok(())
    }
}

/// LoginRequest
///
/// Input payload for POST /api/auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// UpdateReportRequest
///
/// Partial update payload for PUT /api/reports/{id} (admin triage). Uses
/// `Option<T>` for all fields so only the provided ones are written; the
/// repository refreshes `updated_at` unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl UpdateReportRequest {
    /// validate
    ///
    /// Status and priority, when given, must be known values. Any status may
    /// transition to any other status; there is no ordering constraint.
    pub fn validate(&self) -> Result<(), FieldError> {
        if let Some(status) = &self.status {
            if !REPORT_STATUSES.contains(&status.as_str()) {
                return Err(FieldError::not_allowed("status", status, REPORT_STATUSES));
            }
        }
        if let Some(priority) = &self.priority {
            if !REPORT_PRIORITIES.contains(&priority.as_str()) {
                return Err(FieldError::not_allowed(
                    "priority",
                    priority,
                    REPORT_PRIORITIES,
                ));
            }
        }
        Ok(())
    }
}

// --- Response Schemas (Output) ---

/// UserSummary
///
/// The user projection embedded in auth responses: identity without secret
/// material or contact details.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// UserProfile
///
/// Output schema for GET /api/auth/profile: the full identity record minus the
/// password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// AuthResponse
///
/// Output schema for register and login: a signed bearer token plus the user
/// summary the clients cache.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// ReportEnvelope
///
/// Output schema for report create/update: confirmation message plus the
/// affected record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportEnvelope {
    pub message: String,
    pub report: Report,
}

/// MessageResponse
///
/// Bare confirmation body, used by DELETE /api/reports/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// HealthResponse
///
/// Output schema for GET /api/health.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
