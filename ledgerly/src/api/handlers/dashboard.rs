//! HTTP handler for the dashboard endpoint.

use axum::extract::{Json, State};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{auth::CurrentUser, dashboard::DashboardResponse},
    dashboard::build_dashboard,
    db::handlers::transfers::Transfers,
    errors::{Error, Result},
};

/// Get the dashboard
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    summary = "Get the dashboard",
    description = "All-time totals, the last seven days of income/expense, the expense breakdown by category and the ten most recent transfers. A user with no transfers gets zeros and empty lists.",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<DashboardResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = Transfers::new(&mut conn).rows_for_user(current_user.id).await?;

    let today = Utc::now().date_naive();
    Ok(Json(build_dashboard(&rows, today)))
}
