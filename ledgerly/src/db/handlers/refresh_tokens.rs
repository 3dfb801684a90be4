//! Database repository for refresh tokens.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{errors::Result, models::refresh_tokens::RefreshToken},
    types::{UserId, abbrev_uuid},
};

pub struct RefreshTokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> RefreshTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, token), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn issue(&mut self, user_id: UserId, token: &str, expires_at: DateTime<Utc>) -> Result<RefreshToken> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    /// Atomically revoke and return the token. The single UPDATE is the
    /// rotation's linearization point: of two concurrent refreshes with the
    /// same token, exactly one gets the row back and the other gets None.
    /// Expiry is NOT checked here; callers must reject expired rows.
    #[instrument(skip_all, err)]
    pub async fn claim(&mut self, token: &str) -> Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1 AND NOT revoked
            RETURNING *
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row)
    }

    /// Revoke every live token a user holds, e.g. after a password reset.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn revoke_all_for_user(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND NOT revoked")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sqlx::PgPool;

    use super::*;
    use crate::test_utils::create_test_user;

    #[sqlx::test]
    #[test_log::test]
    async fn test_claim_succeeds_exactly_once(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let user = create_test_user(&mut conn, "paula").await;

        let mut repo = RefreshTokens::new(&mut conn);
        let expires = Utc::now() + Duration::days(30);
        repo.issue(user.id, "opaque-refresh-token", expires).await.unwrap();

        let claimed = repo.claim("opaque-refresh-token").await.unwrap().unwrap();
        assert_eq!(claimed.user_id, user.id);
        assert!(claimed.revoked);

        // The token was revoked by the claim; a replay gets nothing
        assert!(repo.claim("opaque-refresh-token").await.unwrap().is_none());
        assert!(repo.claim("never-issued").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_revoke_all_clears_every_live_token(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let user = create_test_user(&mut conn, "quinn").await;

        let mut repo = RefreshTokens::new(&mut conn);
        let expires = Utc::now() + Duration::days(30);
        repo.issue(user.id, "token-a", expires).await.unwrap();
        repo.issue(user.id, "token-b", expires).await.unwrap();

        assert_eq!(repo.revoke_all_for_user(user.id).await.unwrap(), 2);
        assert!(repo.claim("token-a").await.unwrap().is_none());
        assert!(repo.claim("token-b").await.unwrap().is_none());
    }
}
