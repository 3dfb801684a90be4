//! Database models for refresh tokens.
//!
//! Tokens are revoked logically rather than deleted, so a replayed token is
//! distinguishable from a token that never existed.

use chrono::{DateTime, Utc};

use crate::types::UserId;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
