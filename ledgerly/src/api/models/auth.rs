//! Authentication request/response models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{errors::Error, types::UserId};

/// The authenticated principal, decoded from the bearer access token.
///
/// This is the sole source of ownership scoping: services receive it
/// explicitly rather than reading an ambient identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

impl RegisterRequest {
    /// Field-level validation; malformed input never reaches the store.
    pub fn validate(&self) -> Result<(), Error> {
        if self.username.trim().len() < 3 {
            return Err(Error::bad_request("username must be at least 3 characters"));
        }
        if !self.email.contains('@') {
            return Err(Error::bad_request("email address is not valid"));
        }
        if self.password.len() < 8 {
            return Err(Error::bad_request("password must be at least 8 characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfirmationRequest {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

impl ConfirmResetPasswordRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.new_password.len() < 8 {
            return Err(Error::bad_request("password must be at least 8 characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let valid = RegisterRequest {
            username: "frugal_frank".to_string(),
            email: "frank@example.com".to_string(),
            password: "correct-horse".to_string(),
            phone_number: None,
        };
        assert!(valid.validate().is_ok());

        let short_name = RegisterRequest {
            username: "ab".to_string(),
            ..valid.clone()
        };
        assert!(short_name.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-address".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());
    }
}
