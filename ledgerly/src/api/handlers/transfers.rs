//! HTTP handlers for transfer endpoints.
//!
//! The list endpoint is the only paginated one in the API; its metadata goes
//! out both in the response body and in the `X-Pagination` header.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
};

use crate::{
    AppState,
    api::handlers::options_response,
    api::models::{
        auth::CurrentUser,
        pagination::{PageMetadata, PaginatedResponse, X_PAGINATION},
        transfers::{TransferCreate, TransferListQuery, TransferResponse, TransferSort, TransferUpdate},
    },
    db::{
        handlers::{
            categories::Categories,
            repository::OwnedRepository,
            transfers::{TransferFilter, Transfers},
            wallets::Wallets,
        },
        models::transfers::{TransferCreateDBRequest, TransferUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{CategoryId, TransferId, UserId, WalletId},
};

/// Reject a create/update that points at a category or wallet the user does
/// not own. Foreign rows and missing rows get the same 404.
async fn check_references(
    conn: &mut sqlx::PgConnection,
    owner: UserId,
    category_id: CategoryId,
    wallet_id: WalletId,
) -> Result<()> {
    Categories::new(conn)
        .get_by_id(owner, category_id)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))?;

    Wallets::new(conn)
        .get_by_id(owner, wallet_id)
        .await?
        .ok_or_else(|| Error::not_found("Wallet", wallet_id))?;

    Ok(())
}

/// List transfers
#[utoipa::path(
    get,
    path = "/transfers",
    tag = "transfers",
    summary = "List transfers",
    description = "Paginated list of the authenticated user's transfers. Supports text search, amount and date ranges, a category-kind filter and sorting. Pagination metadata is repeated in the X-Pagination header.",
    params(TransferListQuery),
    responses(
        (status = 200, description = "One page of transfers", body = PaginatedResponse<TransferResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_transfers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TransferListQuery>,
) -> Result<(
    StatusCode,
    [(HeaderName, HeaderValue); 1],
    Json<PaginatedResponse<TransferResponse>>,
)> {
    let page = query.page();
    let filter = TransferFilter {
        search: query.search,
        min_amount: query.min_amount,
        max_amount: query.max_amount,
        min_date: query.min_date,
        max_date: query.max_date,
        kind: query.kind,
        category_id: None,
        sort: TransferSort::parse(query.sort_by.as_deref()),
        limit: page.page_size(),
        offset: page.offset(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Transfers::new(&mut conn);

    let total_count = repo.count(current_user.id, &filter).await?;
    let transfers = repo.list(current_user.id, &filter).await?;

    let metadata = PageMetadata::new(total_count, page.page_size(), page.page_number());
    let header_value = metadata.to_header_value();

    Ok((
        StatusCode::OK,
        [(X_PAGINATION.clone(), header_value)],
        Json(PaginatedResponse::new(transfers, metadata)),
    ))
}

/// Create a transfer
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfers",
    summary = "Create a transfer",
    description = "Record a movement of money. The referenced category and wallet must belong to the authenticated user.",
    request_body = TransferCreate,
    responses(
        (status = 201, description = "Transfer created", body = TransferResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category or wallet not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<TransferCreate>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<TransferResponse>)> {
    data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    check_references(&mut conn, current_user.id, data.category_id, data.wallet_id).await?;

    let request = TransferCreateDBRequest {
        title: data.title,
        notes: data.notes,
        amount: data.amount,
        occurred_on: data.date,
        category_id: data.category_id,
        wallet_id: data.wallet_id,
    };

    let transfer = Transfers::new(&mut conn).create(current_user.id, &request).await?;

    let location = format!("/api/transfers/{}", transfer.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(transfer)))
}

/// Get a transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    tag = "transfers",
    summary = "Get a transfer",
    params(("id" = String, Path, description = "Transfer ID (UUID)")),
    responses(
        (status = 200, description = "Transfer", body = TransferResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TransferId>,
) -> Result<Json<TransferResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let transfer = Transfers::new(&mut conn)
        .get_by_id(current_user.id, id)
        .await?
        .ok_or_else(|| Error::not_found("Transfer", id))?;

    Ok(Json(transfer))
}

/// Update a transfer
#[utoipa::path(
    put,
    path = "/transfers/{id}",
    tag = "transfers",
    summary = "Update a transfer",
    description = "Full-replace update. The body id must match the path id; the category and wallet may be repointed to any the user owns.",
    params(("id" = String, Path, description = "Transfer ID (UUID)")),
    request_body = TransferUpdate,
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
pub async fn update_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TransferId>,
    Json(data): Json<TransferUpdate>,
) -> Result<StatusCode> {
    if data.id != id {
        return Err(Error::bad_request("Body id does not match path id"));
    }
    data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    check_references(&mut conn, current_user.id, data.category_id, data.wallet_id).await?;

    let request = TransferUpdateDBRequest {
        title: data.title,
        notes: data.notes,
        amount: data.amount,
        occurred_on: data.date,
        category_id: data.category_id,
        wallet_id: data.wallet_id,
    };

    Transfers::new(&mut conn).update(current_user.id, id, &request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a transfer
#[utoipa::path(
    delete,
    path = "/transfers/{id}",
    tag = "transfers",
    summary = "Delete a transfer",
    params(("id" = String, Path, description = "Transfer ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TransferId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Transfers::new(&mut conn).delete(current_user.id, id).await? {
        return Err(Error::not_found("Transfer", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Supported methods for the transfers resource
#[utoipa::path(
    options,
    path = "/transfers",
    tag = "transfers",
    summary = "Transfer resource options",
    responses((status = 200, description = "Supported methods in the X-Options header")),
)]
pub async fn transfer_options() -> impl axum::response::IntoResponse {
    options_response("GET,POST,PUT,DELETE,OPTIONS")
}
