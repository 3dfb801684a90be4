//! HTTP handlers for wallet endpoints.

use axum::{
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
};

use crate::{
    AppState,
    api::handlers::options_response,
    api::models::{
        auth::CurrentUser,
        wallets::{WalletCreate, WalletListQuery, WalletResponse, WalletSort, WalletUpdate},
    },
    db::{
        handlers::{
            repository::OwnedRepository,
            wallets::{WalletFilter, Wallets},
        },
        models::wallets::{WalletCreateDBRequest, WalletUpdateDBRequest},
    },
    errors::{Error, Result},
    types::WalletId,
};

/// List wallets
#[utoipa::path(
    get,
    path = "/wallets",
    tag = "wallets",
    summary = "List wallets",
    description = "List the authenticated user's wallets, optionally filtered by search text. Default order is balance, largest first.",
    params(WalletListQuery),
    responses(
        (status = 200, description = "Wallets", body = [WalletResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_wallets(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<WalletListQuery>,
) -> Result<Json<Vec<WalletResponse>>> {
    let filter = WalletFilter {
        search: query.search,
        sort: WalletSort::parse(query.sort_by.as_deref()),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let wallets = Wallets::new(&mut conn).list(current_user.id, &filter).await?;

    Ok(Json(wallets.into_iter().map(WalletResponse::from).collect()))
}

/// Create a wallet
#[utoipa::path(
    post,
    path = "/wallets",
    tag = "wallets",
    summary = "Create a wallet",
    request_body = WalletCreate,
    responses(
        (status = 201, description = "Wallet created", body = WalletResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_wallet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<WalletCreate>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<WalletResponse>)> {
    data.validate()?;

    let request = WalletCreateDBRequest {
        name: data.name,
        description: data.description,
        balance: data.balance.unwrap_or_default(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let wallet = Wallets::new(&mut conn).create(current_user.id, &request).await?;

    let location = format!("/api/wallets/{}", wallet.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(WalletResponse::from(wallet)),
    ))
}

/// Get a wallet
#[utoipa::path(
    get,
    path = "/wallets/{id}",
    tag = "wallets",
    summary = "Get a wallet",
    params(("id" = String, Path, description = "Wallet ID (UUID)")),
    responses(
        (status = 200, description = "Wallet", body = WalletResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_wallet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<WalletId>,
) -> Result<Json<WalletResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let wallet = Wallets::new(&mut conn)
        .get_by_id(current_user.id, id)
        .await?
        .ok_or_else(|| Error::not_found("Wallet", id))?;

    Ok(Json(WalletResponse::from(wallet)))
}

/// Update a wallet
#[utoipa::path(
    put,
    path = "/wallets/{id}",
    tag = "wallets",
    summary = "Update a wallet",
    description = "Full-replace update of name, description and balance. The body id must match the path id.",
    params(("id" = String, Path, description = "Wallet ID (UUID)")),
    request_body = WalletUpdate,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Validation failed or id mismatch"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_wallet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<WalletId>,
    Json(data): Json<WalletUpdate>,
) -> Result<StatusCode> {
    if data.id != id {
        return Err(Error::bad_request("Body id does not match path id"));
    }
    data.validate()?;

    let request = WalletUpdateDBRequest {
        name: data.name,
        description: data.description,
        balance: data.balance,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Wallets::new(&mut conn).update(current_user.id, id, &request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a wallet
#[utoipa::path(
    delete,
    path = "/wallets/{id}",
    tag = "wallets",
    summary = "Delete a wallet",
    description = "Delete a wallet that no transfer references.",
    params(("id" = String, Path, description = "Wallet ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transfers still reference this wallet"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_wallet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<WalletId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Wallets::new(&mut conn);

    if repo.is_referenced(current_user.id, id).await? {
        return Err(Error::Conflict {
            message: "Wallet has transfers and cannot be deleted".to_string(),
        });
    }

    if !repo.delete(current_user.id, id).await? {
        return Err(Error::not_found("Wallet", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Supported methods for the wallets resource
#[utoipa::path(
    options,
    path = "/wallets",
    tag = "wallets",
    summary = "Wallet resource options",
    responses((status = 200, description = "Supported methods in the X-Options header")),
)]
pub async fn wallet_options() -> impl axum::response::IntoResponse {
    options_response("GET,POST,PUT,DELETE,OPTIONS")
}
