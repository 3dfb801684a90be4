//! Database repository for password reset tokens.

use chrono::Utc;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::password,
    config::Config,
    db::{
        errors::{DbError, Result},
        models::password_reset_tokens::PasswordResetToken,
    },
    types::{UserId, abbrev_uuid},
};

pub struct PasswordResetTokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PasswordResetTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Mint a reset token for a user. Returns the raw token (for the email)
    /// alongside the stored row, which only ever holds the hash.
    #[instrument(skip(self, config), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn create_for_user(&mut self, user_id: UserId, config: &Config) -> Result<(String, PasswordResetToken)> {
        let raw_token = password::generate_opaque_token();
        let token_hash = password::hash_string(&raw_token).map_err(|e| DbError::Other(anyhow::anyhow!(e)))?;
        let expires_at = Utc::now()
            + chrono::Duration::from_std(config.auth.reset_token_expiry).unwrap_or(chrono::Duration::hours(1));

        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok((raw_token, token))
    }

    /// Find the user's live token matching this raw token, if any.
    ///
    /// Lookup is by user, so every unused unexpired token is checked against
    /// the hash. Verification failures are treated as no match.
    #[instrument(skip(self, raw_token), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn find_valid_for_user(&mut self, user_id: UserId, raw_token: &str) -> Result<Option<PasswordResetToken>> {
        let candidates = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT * FROM password_reset_tokens
            WHERE user_id = $1 AND used_at IS NULL AND expires_at > NOW()
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        for token in candidates {
            match password::verify_string(raw_token, &token.token_hash) {
                Ok(true) => return Ok(Some(token)),
                Ok(false) => continue,
                Err(e) => {
                    tracing::error!("token verification error for token {}: {:?}", token.id, e);
                    continue;
                }
            }
        }

        Ok(None)
    }

    /// Mark a token as consumed so it cannot be replayed.
    #[instrument(skip(self), err)]
    pub async fn mark_used(&mut self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE password_reset_tokens SET used_at = NOW() WHERE id = $1 AND used_at IS NULL")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Invalidate all outstanding tokens for a user.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn invalidate_for_user(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("UPDATE password_reset_tokens SET used_at = NOW() WHERE user_id = $1 AND used_at IS NULL")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
