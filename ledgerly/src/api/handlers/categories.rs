//! HTTP handlers for category endpoints.

use axum::{
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
};

use crate::{
    AppState,
    api::handlers::options_response,
    api::models::{
        auth::CurrentUser,
        categories::{CategoryCreate, CategoryListQuery, CategoryResponse, CategorySort, CategoryUpdate},
        transfers::{TransferResponse, TransferSort},
    },
    db::{
        handlers::{
            categories::{Categories, CategoryFilter},
            repository::OwnedRepository,
            transfers::{TransferFilter, Transfers},
        },
        models::categories::{CategoryCreateDBRequest, CategoryUpdateDBRequest},
    },
    errors::{Error, Result},
    types::CategoryId,
};

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    summary = "List categories",
    description = "List the authenticated user's categories, optionally filtered by search text and kind.",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<CategoryResponse>>> {
    let filter = CategoryFilter {
        search: query.search,
        kind: query.kind,
        sort: CategorySort::parse(query.sort_by.as_deref()),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let categories = Categories::new(&mut conn).list(current_user.id, &filter).await?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    summary = "Create a category",
    description = "Create an income or expense category. The kind is fixed for the category's lifetime.",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<CategoryCreate>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CategoryResponse>)> {
    data.validate()?;

    let request = CategoryCreateDBRequest {
        name: data.name,
        description: data.description,
        kind: data.kind,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn).create(current_user.id, &request).await?;

    let location = format!("/api/categories/{}", category.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CategoryResponse::from(category)),
    ))
}

/// Get a category
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Get a category",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn)
        .get_by_id(current_user.id, id)
        .await?
        .ok_or_else(|| Error::not_found("Category", id))?;

    Ok(Json(CategoryResponse::from(category)))
}

/// List a category's transfers
#[utoipa::path(
    get,
    path = "/categories/{id}/transfers",
    tag = "categories",
    summary = "List a category's transfers",
    description = "All transfers recorded against one category, newest first.",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    responses(
        (status = 200, description = "Transfers", body = [TransferResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_category_transfers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<TransferResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // 404 for an unknown or foreign category, same as the plain get
    Categories::new(&mut conn)
        .get_by_id(current_user.id, id)
        .await?
        .ok_or_else(|| Error::not_found("Category", id))?;

    let filter = TransferFilter {
        category_id: Some(id),
        sort: TransferSort::DateDesc,
        limit: i64::MAX,
        offset: 0,
        ..Default::default()
    };
    let transfers = Transfers::new(&mut conn).list(current_user.id, &filter).await?;

    Ok(Json(transfers))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Update a category",
    description = "Full-replace update of name and description. The body id must match the path id; the kind cannot change.",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    request_body = CategoryUpdate,
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
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CategoryId>,
    Json(data): Json<CategoryUpdate>,
) -> Result<StatusCode> {
    if data.id != id {
        return Err(Error::bad_request("Body id does not match path id"));
    }
    data.validate()?;

    let request = CategoryUpdateDBRequest {
        name: data.name,
        description: data.description,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Categories::new(&mut conn).update(current_user.id, id, &request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Delete a category",
    description = "Delete a category that no transfer references.",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transfers still reference this category"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);

    if repo.is_referenced(current_user.id, id).await? {
        return Err(Error::Conflict {
            message: "Category has transfers and cannot be deleted".to_string(),
        });
    }

    if !repo.delete(current_user.id, id).await? {
        return Err(Error::not_found("Category", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Supported methods for the categories resource
#[utoipa::path(
    options,
    path = "/categories",
    tag = "categories",
    summary = "Category resource options",
    responses((status = 200, description = "Supported methods in the X-Options header")),
)]
pub async fn category_options() -> impl axum::response::IntoResponse {
    options_response("GET,POST,PUT,DELETE,OPTIONS")
}
