//! Dashboard API models.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{api::models::transfers::TransferResponse, types::CategoryId};

/// Everything the dashboard shows, assembled in one response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// All-time income minus all-time expense
    pub balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// Last seven days, oldest first, with a point for every day
    pub week_series: Vec<DaySeriesPoint>,
    /// Per-category expense totals, largest first
    pub category_breakdown: Vec<CategorySlice>,
    /// Ten most recent transfers, newest first
    pub recent_transfers: Vec<TransferResponse>,
}

/// One day of the week series. Days with no transfers carry zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySeriesPoint {
    /// Day label in `%d-%b` form, e.g. "04-Jan"
    pub day: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// One slice of the expense-by-category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySlice {
    #[schema(value_type = String, format = "uuid")]
    pub category_id: CategoryId,
    pub category_name: String,
    pub amount: Decimal,
    /// Currency-formatted amount, e.g. "$1,200"
    pub formatted_amount: String,
}
