#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use civic_tracker::{
    AppConfig, AppState, MockStorageService, auth, create_router,
    models::{NewReport, NewUser, Report, UpdateReportRequest, User},
    repository::{Repository, RepositoryState},
    storage::StorageState,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- In-Memory Repository ---

/// InMemoryRepository
///
/// A full `Repository` implementation over plain Vecs, letting the integration
/// suite exercise the complete HTTP surface without a Postgres instance. The
/// trait seam in the application exists exactly for this substitution.
#[derive(Default)]
pub struct InMemoryRepository {
    users: Mutex<Vec<User>>,
    reports: Mutex<Vec<Report>>,
}

impl InMemoryRepository {
    fn owner_info(&self, user_id: Uuid) -> (Option<String>, Option<String>) {
        let users = self.users.lock().unwrap();
        match users.iter().find(|u| u.id == user_id) {
            Some(u) => (Some(u.name.clone()), Some(u.email.clone())),
            None => (None, None),
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            role: user.role,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create_report(
        &self,
        report: NewReport,
        user_id: Uuid,
    ) -> Result<Report, sqlx::Error> {
        let (owner_name, owner_email) = self.owner_info(user_id);
        let now = Utc::now();
        let record = Report {
            id: Uuid::new_v4(),
            issue_type: report.issue_type,
            title: report.title,
            description: report.description,
            location: report.location,
            location_source: report.location_source,
            photo: report.photo,
            status: "Pending".to_string(),
            submitted_at: now,
            updated_at: now,
            assigned_to: String::new(),
            priority: "Medium".to_string(),
            user_id,
            owner_name,
            owner_email,
        };
        self.reports.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get_reports(&self) -> Result<Vec<Report>, sqlx::Error> {
        // Insertion order reversed = newest submission first.
        Ok(self.reports.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn get_reports_by_user(&self, user_id: Uuid) -> Result<Vec<Report>, sqlx::Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, sqlx::Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update_report(
        &self,
        id: Uuid,
        changes: UpdateReportRequest,
    ) -> Result<Option<Report>, sqlx::Error> {
        let mut reports = self.reports.lock().unwrap();
        let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            report.status = status;
        }
        if let Some(assigned_to) = changes.assigned_to {
            report.assigned_to = assigned_to;
        }
        if let Some(priority) = changes.priority {
            report.priority = priority;
        }
        report.updated_at = Utc::now();
        Ok(Some(report.clone()))
    }

    async fn delete_report(&self, id: Uuid) -> Result<Option<Report>, sqlx::Error> {
        let mut reports = self.reports.lock().unwrap();
        let Some(pos) = reports.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        Ok(Some(reports.remove(pos)))
    }
}

// --- Test Application ---

pub struct TestApp {
    pub address: String,
    pub repo: Arc<InMemoryRepository>,
    pub storage: MockStorageService,
}

/// spawn_app
///
/// Boots the full router (auth middleware, routes, layers) on an ephemeral port
/// against the in-memory repository and mock storage, and hands back handles for
/// direct seeding and assertions.
pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::default());
    let storage = MockStorageService::new();

    let state = AppState {
        repo: repo.clone() as RepositoryState,
        storage: Arc::new(storage.clone()) as StorageState,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        storage,
    }
}

impl TestApp {
    /// Seeds an admin identity directly through the repository (registration
    /// only ever creates citizens) and returns it.
    pub async fn seed_admin(&self, email: &str, password: &str) -> User {
        let password_hash = auth::hash_password(password).expect("hash failed");
        self.repo
            .create_user(NewUser {
                name: "System Administrator".to_string(),
                email: email.to_string(),
                password_hash,
                phone: None,
                role: "admin".to_string(),
            })
            .await
            .unwrap()
    }
}

/// register
///
/// Drives POST /api/auth/register and returns the issued token.
pub async fn register(client: &reqwest::Client, address: &str, name: &str, email: &str) -> String {
    let response = client
        .post(format!("{address}/api/auth/register"))
        .json(&serde_json::json!({
            "name": name, "email": email, "password": "pw123"
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// login
///
/// Drives POST /api/auth/login and returns the issued token.
pub async fn login(
    client: &reqwest::Client,
    address: &str,
    email: &str,
    password: &str,
) -> String {
    let response = client
        .post(format!("{address}/api/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// report_form
///
/// Builds the standard multipart report submission used across the suite.
pub fn report_form() -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("issueType", "Pothole")
        .text("title", "Big hole")
        .text("description", "Deep pothole near the crossing")
        .text("location", "12.34, 56.78")
        .text("locationSource", "gps")
}
