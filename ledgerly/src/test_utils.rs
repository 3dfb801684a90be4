//! Test utilities shared across unit tests.

use sqlx::PgConnection;

use crate::db::{
    handlers::users::Users,
    models::users::{User, UserCreateDBRequest},
};

/// Insert a user for repository tests. Email derives from the username, so
/// distinct usernames never trip the uniqueness constraints.
pub async fn create_test_user(conn: &mut PgConnection, username: &str) -> User {
    Users::new(conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            phone_number: None,
            password_hash: "argon2id-placeholder".to_string(),
            email_confirmation_token: format!("confirm-{username}"),
        })
        .await
        .expect("test user")
}

/// A config suitable for tests: file email transport into a per-process temp
/// directory, reports disabled, fixed secret.
pub fn create_test_config() -> crate::config::Config {
    let temp_dir = std::env::temp_dir().join(format!("ledgerly-test-emails-{}", std::process::id()));

    crate::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        email: crate::config::EmailConfig {
            transport: crate::config::EmailTransportConfig::File {
                path: temp_dir.to_string_lossy().to_string(),
            },
            ..Default::default()
        },
        reports: crate::config::ReportConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}
