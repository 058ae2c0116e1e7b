use civic_tracker::{
    auth,
    config::AppConfig,
    models::NewUser,
    repository::{PostgresRepository, Repository},
};
use sqlx::postgres::PgPoolOptions;

/// Seeds the well-known administrator identity. Run once against a fresh
/// database; exits quietly if the admin already exists.
///
/// The default credentials are for bootstrap only and should be rotated after
/// the first login.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civic_tracker=info".into()),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = PostgresRepository::new(pool);

    let admin_email = "admin@civicissues.com";

    match repo.find_user_by_email(admin_email).await {
        Ok(Some(_)) => {
            tracing::info!("Admin user already exists, nothing to do.");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = ?e, "failed to check for existing admin");
            std::process::exit(1);
        }
    }

    let password_hash = match auth::hash_password("admin123") {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "failed to hash admin password");
            std::process::exit(1);
        }
    };

    let admin = NewUser {
        name: "System Administrator".to_string(),
        email: admin_email.to_string(),
        password_hash,
        phone: Some("+1234567890".to_string()),
        role: "admin".to_string(),
    };

    match repo.create_user(admin).await {
        Ok(user) => {
            tracing::info!(email = %user.email, "Admin user created successfully.");
            tracing::warn!("Default password is 'admin123' - change it after first login!");
        }
        Err(e) => {
            tracing::error!(error = ?e, "failed to create admin user");
            std::process::exit(1);
        }
    }
}
