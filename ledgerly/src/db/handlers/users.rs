//! Database repository for users.
//!
//! Users sit outside the owner-scoped trait: they are looked up by email or
//! username during authentication, before any owner exists.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::users::{User, UserCreateDBRequest},
    },
    types::{UserId, abbrev_uuid},
};

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, phone_number, password_hash, email_confirmation_token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.password_hash)
        .bind(&request.email_confirmation_token)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// All users with a confirmed email, for report fan-out.
    #[instrument(skip(self), err)]
    pub async fn list_confirmed(&mut self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_confirmed ORDER BY created_at ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    /// Confirm the email address matching this token. Returns false when the
    /// token does not match, which covers already-confirmed accounts too.
    #[instrument(skip(self, email, token), err)]
    pub async fn confirm_email(&mut self, email: &str, token: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_confirmed = TRUE, email_confirmation_token = NULL, updated_at = NOW()
            WHERE email = $1 AND email_confirmation_token = $2 AND NOT email_confirmed
            "#,
        )
        .bind(email)
        .bind(token)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, password_hash), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn update_password(&mut self, id: UserId, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::{db::errors::DbError, test_utils::create_test_user};

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_fetch_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let created = create_test_user(&mut conn, "alice").await;
        assert!(!created.email_confirmed);

        let mut repo = Users::new(&mut conn);
        let by_email = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_username = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_username.id, created.id);

        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_confirm_email_requires_matching_token(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let user = create_test_user(&mut conn, "bob").await;
        let token = user.email_confirmation_token.as_deref().unwrap().to_string();

        let mut repo = Users::new(&mut conn);
        assert!(!repo.confirm_email(&user.email, "wrong-token").await.unwrap());
        assert!(repo.confirm_email(&user.email, &token).await.unwrap());

        // Token is cleared on confirmation; replaying it matches nothing
        assert!(!repo.confirm_email(&user.email, &token).await.unwrap());

        let confirmed = repo.list_confirmed().await.unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, user.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_username_is_a_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        create_test_user(&mut conn, "taken").await;

        let result = Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                username: "taken".to_string(),
                email: "different@example.com".to_string(),
                phone_number: None,
                password_hash: "argon2id-placeholder".to_string(),
                email_confirmation_token: "confirm-other".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_password_reports_missing_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let user = create_test_user(&mut conn, "carol").await;

        let mut repo = Users::new(&mut conn);
        assert!(repo.update_password(user.id, "new-hash").await.unwrap());
        assert!(!repo.update_password(uuid::Uuid::new_v4(), "new-hash").await.unwrap());

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");
    }
}
