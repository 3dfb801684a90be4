//! HTTP handlers for authentication endpoints.
//!
//! Login and refresh both return an access/refresh token pair. Registration
//! responds before the confirmation email and default wallet are in place;
//! that work runs on a spawned task so SMTP latency never shows up in the
//! request path. Password reset deliberately responds identically whether or
//! not the address is known.

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::auth::{
        ConfirmResetPasswordRequest, CurrentUser, EmailConfirmationRequest, LoginRequest, RefreshTokenRequest,
        RegisterRequest, ResetPasswordRequest, TokenPairResponse,
    },
    auth::{password, session},
    db::{
        handlers::{
            password_reset_tokens::PasswordResetTokens, refresh_tokens::RefreshTokens, repository::OwnedRepository,
            users::Users, wallets::Wallets,
        },
        models::{users::UserCreateDBRequest, wallets::WalletCreateDBRequest},
    },
    errors::{Error, Result},
};

/// Name of the wallet created for every new account.
const DEFAULT_WALLET_NAME: &str = "Default Wallet";

/// Issue an access/refresh pair for an authenticated user.
async fn issue_token_pair(state: &AppState, user: &CurrentUser) -> Result<TokenPairResponse> {
    let access_token = session::create_access_token(user, &state.config)?;

    let refresh_token = password::generate_opaque_token();
    let expires_at = Utc::now()
        + chrono::Duration::from_std(state.config.auth.refresh_expiry).unwrap_or(chrono::Duration::days(30));

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    RefreshTokens::new(&mut conn).issue(user.id, &refresh_token, expires_at).await?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
    })
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    summary = "Log in",
    description = "Authenticate with username and password, receiving an access/refresh token pair. Accounts with unconfirmed email addresses cannot log in.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenPairResponse),
        (status = 401, description = "Invalid credentials or unconfirmed email"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %data.username))]
pub async fn login(State(state): State<AppState>, Json(data): Json<LoginRequest>) -> Result<Json<TokenPairResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_by_username(&data.username)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !password::verify_string(&data.password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    if !user.email_confirmed {
        return Err(Error::Unauthenticated {
            message: Some("Email address is not confirmed".to_string()),
        });
    }
    drop(conn);

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
    };
    let pair = issue_token_pair(&state, &current_user).await?;

    Ok(Json(pair))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    summary = "Register",
    description = "Create an account. A confirmation email is sent and a default wallet created; the account cannot log in until the email is confirmed.",
    request_body = RegisterRequest,
    responses(
        (status = 204, description = "Account created, confirmation email on its way"),
        (status = 400, description = "Validation failed, or username or email already in use"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %data.username))]
pub async fn register(State(state): State<AppState>, Json(data): Json<RegisterRequest>) -> Result<StatusCode> {
    data.validate()?;

    let password_hash = password::hash_string(&data.password)?;
    let confirmation_token = password::generate_opaque_token();

    let request = UserCreateDBRequest {
        username: data.username,
        email: data.email,
        phone_number: data.phone_number,
        password_hash,
        email_confirmation_token: confirmation_token.clone(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).create(&request).await?;
    drop(conn);

    // Confirmation email and default wallet happen off the request path; a
    // failure is logged, not surfaced, since the account already exists.
    let task_state = state.clone();
    tokio::spawn(async move {
        match task_state.db.acquire().await {
            Ok(mut conn) => {
                let wallet = WalletCreateDBRequest {
                    name: DEFAULT_WALLET_NAME.to_string(),
                    description: None,
                    balance: rust_decimal::Decimal::ZERO,
                };
                if let Err(e) = Wallets::new(&mut conn).create(user.id, &wallet).await {
                    tracing::warn!(user_id = %user.id, error = %e, "Failed to create default wallet");
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to acquire connection for default wallet");
            }
        }

        if let Err(e) = task_state
            .email
            .send_confirmation_email(&user.email, &user.username, &confirmation_token)
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send confirmation email");
        }
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh-token",
    tag = "auth",
    summary = "Refresh tokens",
    description = "Exchange a live refresh token for a new access/refresh pair. The presented token is revoked in the same step; a replayed token fails.",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPairResponse),
        (status = 401, description = "Unknown, revoked or expired refresh token"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(data): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPairResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let claimed = RefreshTokens::new(&mut conn)
        .claim(&data.refresh_token)
        .await?
        .ok_or(Error::Unauthenticated {
            message: Some("Refresh token is not valid".to_string()),
        })?;

    // The token is revoked either way; an expired one just stops here.
    if claimed.is_expired(Utc::now()) {
        return Err(Error::Unauthenticated {
            message: Some("Refresh token has expired".to_string()),
        });
    }

    let user = Users::new(&mut conn)
        .get_by_id(claimed.user_id)
        .await?
        .ok_or(Error::Unauthenticated {
            message: Some("Refresh token is not valid".to_string()),
        })?;
    drop(conn);

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
    };
    let pair = issue_token_pair(&state, &current_user).await?;

    Ok(Json(pair))
}

/// Confirm an email address
#[utoipa::path(
    post,
    path = "/auth/confirm-email",
    tag = "auth",
    summary = "Confirm email",
    description = "Activate an account using the token from the confirmation email.",
    request_body = EmailConfirmationRequest,
    responses(
        (status = 204, description = "Email confirmed"),
        (status = 400, description = "Token does not match"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(data): Json<EmailConfirmationRequest>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let confirmed = Users::new(&mut conn).confirm_email(&data.email, &data.token).await?;
    if !confirmed {
        return Err(Error::bad_request("Confirmation token is not valid"));
    }

    let user = Users::new(&mut conn).get_by_email(&data.email).await?;
    drop(conn);

    // Welcome mail is a courtesy; the confirmation already committed.
    if let Some(user) = user {
        let task_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = task_state.email.send_welcome_email(&user.email, &user.username).await {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to send welcome email");
            }
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Request a password reset
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    summary = "Request password reset",
    description = "Send a password reset email if the address belongs to an account. The response does not reveal whether it does.",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "If the address exists, an email is on its way"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(data): Json<ResetPasswordRequest>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let Some(user) = Users::new(&mut conn).get_by_email(&data.email).await? else {
        // Same response as the success path
        return Ok(StatusCode::NO_CONTENT);
    };

    let (raw_token, _) = PasswordResetTokens::new(&mut conn)
        .create_for_user(user.id, &state.config)
        .await?;
    drop(conn);

    let task_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = task_state
            .email
            .send_password_reset_email(&user.email, &user.username, &raw_token)
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Complete a password reset
#[utoipa::path(
    post,
    path = "/auth/confirm-reset-password",
    tag = "auth",
    summary = "Confirm password reset",
    description = "Set a new password using the token from the reset email. All refresh tokens and outstanding reset tokens are invalidated.",
    request_body = ConfirmResetPasswordRequest,
    responses(
        (status = 204, description = "Password updated"),
        (status = 400, description = "Token is not valid or password too weak"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn confirm_reset_password(
    State(state): State<AppState>,
    Json(data): Json<ConfirmResetPasswordRequest>,
) -> Result<StatusCode> {
    data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // An unknown email and a bad token get the same answer.
    let Some(user) = Users::new(&mut conn).get_by_email(&data.email).await? else {
        return Err(Error::bad_request("Reset token is not valid"));
    };

    let mut reset_tokens = PasswordResetTokens::new(&mut conn);
    let token = reset_tokens
        .find_valid_for_user(user.id, &data.token)
        .await?
        .ok_or_else(|| Error::bad_request("Reset token is not valid"))?;

    reset_tokens.mark_used(token.id).await?;
    reset_tokens.invalidate_for_user(user.id).await?;

    let password_hash = password::hash_string(&data.new_password)?;
    Users::new(&mut conn).update_password(user.id, &password_hash).await?;

    // A reset logs out every session
    RefreshTokens::new(&mut conn).revoke_all_for_user(user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
