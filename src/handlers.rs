use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        AuthResponse, HealthResponse, LoginRequest, MessageResponse, NewReport, NewUser,
        RegisterRequest, Report, ReportEnvelope, UpdateReportRequest, UserProfile, UserSummary,
    },
    storage::FileCleanup,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Upload size ceiling: 5 MiB, checked per file before any report row is written.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

// --- Handlers ---

/// health
///
/// [Public Route] Liveness endpoint for monitoring and load balancer checks.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Civic Issue Tracker API is running!".to_string(),
    })
}

/// register
///
/// [Public Route] Creates a new identity and immediately issues a session token.
///
/// *Flow*: validate input, reject a duplicate email, hash the secret (the
/// plaintext never reaches the repository), insert, sign a token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Missing field or duplicate email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    // Check if user already exists
    let existing = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::storage("Failed to register user", e))?;
    if existing.is_some() {
        return Err(ApiError::validation("User already exists with this email"));
    }

    let password_hash = auth::hash_password(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::Internal("Failed to register user".to_string())
    })?;

    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            phone: payload.phone,
            role: "citizen".to_string(),
        })
        .await
        .map_err(|e| ApiError::storage("Failed to register user", e))?;

    let token = auth::issue_token(&user, &state.config.jwt_secret).map_err(|e| {
        tracing::error!(error = ?e, "token issuance failed");
        ApiError::Internal("Failed to register user".to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserSummary::from(&user),
        }),
    ))
}

/// login
///
/// [Public Route] Verifies credentials and issues a fresh 7-day session token.
/// A missing user and a wrong password produce the same 401, so the endpoint
/// does not reveal which emails are registered.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::storage("Failed to login", e))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !auth::verify_password(&user.password_hash, &payload.password) {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = auth::issue_token(&user, &state.config.jwt_secret).map_err(|e| {
        tracing::error!(error = ?e, "token issuance failed");
        ApiError::Internal("Failed to login".to_string())
    })?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}

/// get_profile
///
/// [Authenticated Route] Returns the caller's identity record, minus the secret.
/// Unlike token verification this does consult the store, so a deleted user gets
/// a 404 here even while their token is still valid.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await
        .map_err(|e| ApiError::storage("Failed to fetch user profile", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(user)))
}

/// get_reports
///
/// [Authenticated Route] Lists every report in the system, newest first, each
/// joined with the owner's name and email. Any authenticated user may read the
/// full list; only mutation is admin-gated.
#[utoipa::path(
    get,
    path = "/api/reports",
    responses((status = 200, description = "All reports, newest first", body = [Report]))
)]
pub async fn get_reports(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = state
        .repo
        .get_reports()
        .await
        .map_err(|e| ApiError::storage("Failed to fetch reports", e))?;
    Ok(Json(reports))
}

/// get_my_reports
///
/// [Authenticated Route] Lists the caller's own reports, newest first.
/// The owner filter comes from the verified identity, never from the request.
#[utoipa::path(
    get,
    path = "/api/reports/my",
    responses((status = 200, description = "Caller's reports, newest first", body = [Report]))
)]
pub async fn get_my_reports(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = state
        .repo
        .get_reports_by_user(id)
        .await
        .map_err(|e| ApiError::storage("Failed to fetch user reports", e))?;
    Ok(Json(reports))
}

/// get_report
///
/// [Authenticated Route] Retrieves a single report by ID, joined with owner info.
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Found", body = Report),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_report(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
    let report = state
        .repo
        .get_report(id)
        .await
        .map_err(|e| ApiError::storage("Failed to fetch report", e))?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    Ok(Json(report))
}

/// create_report
///
/// [Authenticated Route] Handles the multipart report submission, including the
/// optional photo attachment (field `photo`, at most one).
///
/// Upload admission happens here, before any row is written: the declared
/// content type must be `image/*` and the file at most 5 MiB. Accepted photos
/// are written to the uploads directory under a generated unique name, and the
/// resulting path is stored on the report.
///
/// The owner is always the verified caller.
#[utoipa::path(
    post,
    path = "/api/reports",
    responses(
        (status = 201, description = "Created", body = ReportEnvelope),
        (status = 400, description = "Invalid field, oversized or non-image file")
    )
)]
pub async fn create_report(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ReportEnvelope>), ApiError> {
    let mut fields = NewReport::default();
    let mut photo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart request"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "issueType" => fields.issue_type = read_text(field).await?,
            "title" => fields.title = read_text(field).await?,
            "description" => fields.description = read_text(field).await?,
            "location" => fields.location = read_text(field).await?,
            "locationSource" => fields.location_source = read_text(field).await?,
            "photo" => {
                // Only parts carrying a filename count as file uploads; clients
                // may send the field empty when no photo was taken.
                let original_name = match field.file_name() {
                    Some(n) if !n.is_empty() => n.to_string(),
                    _ => continue,
                };

                let content_type = field.content_type().unwrap_or_default().to_string();
                if !content_type.starts_with("image/") {
                    return Err(ApiError::validation("Only image files are allowed!"));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::validation("Failed to read uploaded file"))?;
                if data.len() > MAX_PHOTO_BYTES {
                    return Err(ApiError::validation(
                        "File too large. Maximum size is 5MB.",
                    ));
                }

                photo = Some((original_name, data.to_vec()));
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    fields
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    if let Some((original_name, data)) = photo {
        let path = state
            .storage
            .store_image(&original_name, &data)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "photo storage failed");
                ApiError::Internal("Failed to create report".to_string())
            })?;
        fields.photo = Some(path);
    }

    let report = state
        .repo
        .create_report(fields, user_id)
        .await
        .map_err(|e| ApiError::storage("Failed to create report", e))?;

    Ok((
        StatusCode::CREATED,
        Json(ReportEnvelope {
            message: "Report created successfully".to_string(),
            report,
        }),
    ))
}

/// update_report
///
/// [Admin Route] Triage endpoint: updates status, assignee, and/or priority.
///
/// *RBAC*: strict enforcement of the "admin" role before touching the repository.
/// Provided enum values are validated explicitly; absent fields are untouched.
#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Updated", body = ReportEnvelope),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReportRequest>,
) -> Result<Json<ReportEnvelope>, ApiError> {
    auth::require_admin(&auth)?;

    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let report = state
        .repo
        .update_report(id, payload)
        .await
        .map_err(|e| ApiError::storage("Failed to update report", e))?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    Ok(Json(ReportEnvelope {
        message: "Report updated successfully".to_string(),
        report,
    }))
}

/// delete_report
///
/// [Admin Route] Removes a report and, best-effort, its stored photo.
///
/// File cleanup is explicit but non-fatal: a failed removal is logged with the
/// report id and the client still receives the deletion confirmation, since the
/// record itself is gone.
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth::require_admin(&auth)?;

    let report = state
        .repo
        .delete_report(id)
        .await
        .map_err(|e| ApiError::storage("Failed to delete report", e))?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    let cleanup = match report.photo.as_deref() {
        None => FileCleanup::NoFile,
        Some(path) => match state.storage.remove_upload(path).await {
            Ok(()) => FileCleanup::Removed,
            Err(reason) => FileCleanup::Failed(reason),
        },
    };

    if let FileCleanup::Failed(reason) = &cleanup {
        tracing::warn!(report_id = %id, %reason, "report deleted but photo cleanup failed");
    }

    Ok(Json(MessageResponse {
        message: "Report deleted successfully".to_string(),
    }))
}

/// read_text
///
/// Pulls a multipart text field, mapping transport errors to a 400.
async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart request"))
}
