//! Dashboard aggregation.
//!
//! All aggregation is pure: the handler fetches the user's joined transfer
//! rows once and these functions fold them into the widgets, the seven-day
//! series, the expense breakdown and the recent list. A user with no
//! transfers gets zero totals, seven zero-valued days and empty lists,
//! never an error.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    api::models::categories::CategoryKind,
    api::models::dashboard::{CategorySlice, DashboardResponse, DaySeriesPoint},
    api::models::transfers::TransferResponse,
    db::models::transfers::TransferRow,
    types::CategoryId,
};

/// How many days the spline series spans, today included.
const SERIES_DAYS: u64 = 7;

/// How many transfers the recent-activity list shows.
const RECENT_LIMIT: usize = 10;

/// Assemble the full dashboard from a user's transfer rows.
pub fn build_dashboard(rows: &[TransferRow], today: NaiveDate) -> DashboardResponse {
    let (total_income, total_expense) = totals(rows);

    DashboardResponse {
        balance: total_income - total_expense,
        total_income,
        total_expense,
        week_series: week_series(rows, today),
        category_breakdown: category_breakdown(rows),
        recent_transfers: recent_transfers(rows),
    }
}

/// All-time income and expense sums.
fn totals(rows: &[TransferRow]) -> (Decimal, Decimal) {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for row in rows {
        match row.category_kind {
            CategoryKind::Income => income += row.amount,
            CategoryKind::Expense => expense += row.amount,
        }
    }
    (income, expense)
}

/// Per-day income/expense sums for the last seven days, oldest first.
///
/// The canonical day axis is generated first and observed sums merged in, so
/// days with no transfers still appear with zeros.
fn week_series(rows: &[TransferRow], today: NaiveDate) -> Vec<DaySeriesPoint> {
    let mut by_day: HashMap<NaiveDate, (Decimal, Decimal)> = HashMap::new();
    for row in rows {
        let entry = by_day.entry(row.occurred_on).or_default();
        match row.category_kind {
            CategoryKind::Income => entry.0 += row.amount,
            CategoryKind::Expense => entry.1 += row.amount,
        }
    }

    let start = today - Days::new(SERIES_DAYS - 1);
    start
        .iter_days()
        .take(SERIES_DAYS as usize)
        .map(|day| {
            let (income, expense) = by_day.get(&day).copied().unwrap_or_default();
            DaySeriesPoint {
                day: day.format("%d-%b").to_string(),
                income,
                expense,
            }
        })
        .collect()
}

/// Expense totals per category, largest first, name then id as tiebreaks.
/// Income categories never appear here.
///
/// Grouping is by category id, not name: nothing stops a user from owning
/// two categories with the same name, and those must stay separate slices.
fn category_breakdown(rows: &[TransferRow]) -> Vec<CategorySlice> {
    let mut by_category: HashMap<CategoryId, (&str, Decimal)> = HashMap::new();
    for row in rows {
        if row.category_kind == CategoryKind::Expense {
            let entry = by_category.entry(row.category_id).or_insert((row.category_name.as_str(), Decimal::ZERO));
            entry.1 += row.amount;
        }
    }

    let mut slices: Vec<(CategoryId, (&str, Decimal))> = by_category.into_iter().collect();
    slices.sort_by(|a, b| (b.1.1).cmp(&a.1.1).then_with(|| (a.1.0).cmp(b.1.0)).then_with(|| a.0.cmp(&b.0)));

    slices
        .into_iter()
        .map(|(id, (name, amount))| CategorySlice {
            category_id: id,
            category_name: name.to_string(),
            amount,
            formatted_amount: format_currency(amount),
        })
        .collect()
}

/// The ten most recent transfers, newest first, id as tiebreak within a day.
fn recent_transfers(rows: &[TransferRow]) -> Vec<TransferResponse> {
    let mut sorted: Vec<&TransferRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on).then_with(|| b.id.cmp(&a.id)));

    sorted
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|row| TransferResponse::from(row.clone()))
        .collect()
}

/// Format an amount as whole-dollar currency with thousands separators,
/// e.g. "$1,200" or "-$350". Midpoints round away from zero.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    /// Stable per-name category id so rows built from the same name group
    /// together, the way rows of one real category share its id.
    fn cat_id(name: &str) -> Uuid {
        let mut bytes = [0u8; 16];
        for (i, b) in name.bytes().take(16).enumerate() {
            bytes[i] = b;
        }
        Uuid::from_bytes(bytes)
    }

    fn row(kind: CategoryKind, category: &str, amount: Decimal, date: NaiveDate) -> TransferRow {
        TransferRow {
            id: Uuid::new_v4(),
            title: format!("{category} transfer"),
            notes: None,
            amount,
            occurred_on: date,
            category_id: cat_id(category),
            category_name: category.to_string(),
            category_kind: kind,
            wallet_id: Uuid::new_v4(),
            wallet_name: "Main".to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_widgets_balance_income_minus_expense() {
        let today = day(2026, 3, 15);
        let rows = vec![
            row(CategoryKind::Income, "Salary", dec!(5000), day(2026, 3, 1)),
            row(CategoryKind::Expense, "Food", dec!(1200), day(2026, 3, 10)),
        ];
        let dashboard = build_dashboard(&rows, today);
        assert_eq!(dashboard.total_income, dec!(5000));
        assert_eq!(dashboard.total_expense, dec!(1200));
        assert_eq!(dashboard.balance, dec!(3800));
    }

    #[test]
    fn test_empty_rows_give_zeroed_dashboard() {
        let dashboard = build_dashboard(&[], day(2026, 3, 15));
        assert_eq!(dashboard.balance, Decimal::ZERO);
        assert_eq!(dashboard.week_series.len(), 7);
        assert!(dashboard.week_series.iter().all(|p| p.income.is_zero() && p.expense.is_zero()));
        assert!(dashboard.category_breakdown.is_empty());
        assert!(dashboard.recent_transfers.is_empty());
    }

    #[test]
    fn test_week_series_covers_seven_days_oldest_first() {
        let today = day(2026, 1, 7);
        let series = week_series(&[], today);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].day, "01-Jan");
        assert_eq!(series[6].day, "07-Jan");
    }

    #[test]
    fn test_week_series_fills_gaps_and_sums_per_day() {
        let today = day(2026, 1, 7);
        let rows = vec![
            row(CategoryKind::Income, "Salary", dec!(100), day(2026, 1, 3)),
            row(CategoryKind::Income, "Salary", dec!(50), day(2026, 1, 3)),
            row(CategoryKind::Expense, "Food", dec!(20), day(2026, 1, 3)),
            // Outside the window, must not appear
            row(CategoryKind::Expense, "Food", dec!(999), day(2025, 12, 31)),
        ];
        let series = week_series(&rows, today);
        let jan3 = series.iter().find(|p| p.day == "03-Jan").unwrap();
        assert_eq!(jan3.income, dec!(150));
        assert_eq!(jan3.expense, dec!(20));
        assert!(series.iter().all(|p| p.expense != dec!(999)));
    }

    #[test]
    fn test_week_series_spans_month_boundary() {
        let series = week_series(&[], day(2026, 2, 2));
        assert_eq!(series[0].day, "27-Jan");
        assert_eq!(series[6].day, "02-Feb");
    }

    #[test]
    fn test_breakdown_is_expense_only_and_sorted_desc() {
        let today = day(2026, 3, 15);
        let rows = vec![
            row(CategoryKind::Expense, "Rent", dec!(900), day(2026, 3, 1)),
            row(CategoryKind::Expense, "Food", dec!(300), day(2026, 3, 2)),
            row(CategoryKind::Expense, "Food", dec!(150), day(2026, 3, 3)),
            row(CategoryKind::Income, "Salary", dec!(5000), day(2026, 3, 1)),
        ];
        let dashboard = build_dashboard(&rows, today);
        let names: Vec<&str> = dashboard.category_breakdown.iter().map(|s| s.category_name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food"]);
        assert_eq!(dashboard.category_breakdown[1].amount, dec!(450));
        assert_eq!(dashboard.category_breakdown[0].formatted_amount, "$900");
    }

    #[test]
    fn test_breakdown_keeps_same_named_categories_separate() {
        // Nothing enforces per-user name uniqueness, so two categories may
        // both be called "Food"; they must stay distinct slices.
        let dining = Uuid::new_v4();
        let groceries = Uuid::new_v4();
        let mut first = row(CategoryKind::Expense, "Food", dec!(300), day(2026, 3, 2));
        first.category_id = dining;
        let mut second = row(CategoryKind::Expense, "Food", dec!(120), day(2026, 3, 3));
        second.category_id = groceries;

        let dashboard = build_dashboard(&[first, second], day(2026, 3, 15));
        assert_eq!(dashboard.category_breakdown.len(), 2);
        assert_eq!(dashboard.category_breakdown[0].category_id, dining);
        assert_eq!(dashboard.category_breakdown[0].amount, dec!(300));
        assert_eq!(dashboard.category_breakdown[1].category_id, groceries);
        assert_eq!(dashboard.category_breakdown[1].category_name, "Food");
    }

    #[test]
    fn test_recent_transfers_newest_first_capped_at_ten() {
        let rows: Vec<TransferRow> = (1..=12)
            .map(|d| row(CategoryKind::Expense, "Food", dec!(10), day(2026, 3, d)))
            .collect();
        let recent = recent_transfers(&rows);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].date, day(2026, 3, 12));
        assert_eq!(recent[9].date, day(2026, 3, 3));
    }

    #[test]
    fn test_recent_transfers_same_day_tiebreak_is_stable() {
        let d = day(2026, 3, 5);
        let rows = vec![
            row(CategoryKind::Expense, "Food", dec!(1), d),
            row(CategoryKind::Expense, "Food", dec!(2), d),
        ];
        let first = recent_transfers(&rows);
        let second = recent_transfers(&rows);
        assert_eq!(
            first.iter().map(|t| t.id).collect::<Vec<_>>(),
            second.iter().map(|t| t.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(dec!(0)), "$0");
        assert_eq!(format_currency(dec!(999)), "$999");
        assert_eq!(format_currency(dec!(1200)), "$1,200");
        assert_eq!(format_currency(dec!(1234567)), "$1,234,567");
    }

    #[test]
    fn test_format_currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(dec!(10.5)), "$11");
        assert_eq!(format_currency(dec!(10.4)), "$10");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-350)), "-$350");
        assert_eq!(format_currency(dec!(-1200.6)), "-$1,201");
    }
}
