//! Monthly report background job.
//!
//! Wakes up on a configurable interval and, whenever a new calendar month has
//! started since the last run, sends every confirmed user a summary of the
//! month that just ended: email always, SMS when a gateway is configured and
//! the user has a phone number. One user's failure never stops the fan-out.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::{
    api::models::categories::CategoryKind,
    config::Config,
    db::handlers::{transfers::Transfers, users::Users},
    db::models::transfers::TransferRow,
    dashboard::format_currency,
    email::EmailService,
    sms::SmsService,
};

/// One user's totals for a finished month.
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    /// Human-readable month, e.g. "March 2026"
    pub month_label: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Inclusive date range and label of the month before the one `today` is in.
pub fn previous_month_range(today: NaiveDate) -> (NaiveDate, NaiveDate, String) {
    // Stepping back from the first of the current month lands on the last
    // day of the previous one.
    let first_of_current = today.with_day(1).unwrap_or(today);
    let last_of_previous = first_of_current - Days::new(1);
    let first_of_previous = last_of_previous.with_day(1).unwrap_or(last_of_previous);
    let label = first_of_previous.format("%B %Y").to_string();
    (first_of_previous, last_of_previous, label)
}

/// Fold a month's transfer rows into income/expense totals.
pub fn summarize(rows: &[TransferRow], month_label: String) -> MonthlySummary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for row in rows {
        match row.category_kind {
            CategoryKind::Income => income += row.amount,
            CategoryKind::Expense => expense += row.amount,
        }
    }
    MonthlySummary {
        month_label,
        income,
        expense,
    }
}

pub async fn run_monthly_reporter(
    config: Config,
    pool: PgPool,
    email: Arc<EmailService>,
    sms: Option<Arc<SmsService>>,
    shutdown: CancellationToken,
) {
    let interval = config.reports.check_interval;
    tracing::info!(check_interval = ?interval, "Starting monthly report job");

    // Months already covered don't get re-sent; starting mid-month must not
    // trigger a report for the month in progress.
    let mut last_seen_month = current_month();

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Monthly report job shutting down");
                return;
            }
        }

        let month = current_month();
        if month == last_seen_month {
            continue;
        }

        let today = Utc::now().date_naive();
        tracing::info!(month = %today.format("%Y-%m"), "New month started, sending reports");
        send_reports(&pool, &email, sms.as_deref(), today).await;
        last_seen_month = month;
    }
}

fn current_month() -> (i32, u32) {
    let today = Utc::now().date_naive();
    (today.year(), today.month())
}

/// Fan the previous month's report out to every confirmed user.
async fn send_reports(pool: &PgPool, email: &EmailService, sms: Option<&SmsService>, today: NaiveDate) {
    let (from, to, month_label) = previous_month_range(today);

    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to acquire connection for monthly reports");
            return;
        }
    };

    let users = match Users::new(&mut *conn).list_confirmed().await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list users for monthly reports");
            return;
        }
    };

    let mut sent = 0usize;
    for user in users {
        let rows = match Transfers::new(&mut *conn).rows_in_range(user.id, from, to).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load transfers for report, skipping user");
                continue;
            }
        };

        let summary = summarize(&rows, month_label.clone());

        if let Err(e) = email.send_monthly_report(&user.email, &user.username, &summary).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send report email");
            continue;
        }

        if let (Some(sms), Some(phone)) = (sms, user.phone_number.as_deref()) {
            let text = format!(
                "{}: income {}, expenses {}, net {}",
                summary.month_label,
                format_currency(summary.income),
                format_currency(summary.expense),
                format_currency(summary.income - summary.expense),
            );
            if let Err(e) = sms.send(phone, &text).await {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to send report SMS");
            }
        }

        sent += 1;
    }

    tracing::info!(sent, month = %month_label, "Monthly reports finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_month_range_mid_month() {
        let (from, to, label) = previous_month_range(day(2026, 3, 15));
        assert_eq!(from, day(2026, 2, 1));
        assert_eq!(to, day(2026, 2, 28));
        assert_eq!(label, "February 2026");
    }

    #[test]
    fn test_previous_month_range_january_wraps_year() {
        let (from, to, label) = previous_month_range(day(2026, 1, 1));
        assert_eq!(from, day(2025, 12, 1));
        assert_eq!(to, day(2025, 12, 31));
        assert_eq!(label, "December 2025");
    }

    #[test]
    fn test_previous_month_range_leap_february() {
        let (from, to, _) = previous_month_range(day(2024, 3, 10));
        assert_eq!(from, day(2024, 2, 1));
        assert_eq!(to, day(2024, 2, 29));
    }

    #[test]
    fn test_summarize_totals() {
        let row = |kind, amount| TransferRow {
            id: Uuid::new_v4(),
            title: "t".into(),
            notes: None,
            amount,
            occurred_on: day(2026, 2, 10),
            category_id: Uuid::new_v4(),
            category_name: "c".into(),
            category_kind: kind,
            wallet_id: Uuid::new_v4(),
            wallet_name: "w".into(),
        };
        let rows = vec![
            row(CategoryKind::Income, dec!(3000)),
            row(CategoryKind::Expense, dec!(800)),
            row(CategoryKind::Expense, dec!(200)),
        ];
        let summary = summarize(&rows, "February 2026".into());
        assert_eq!(summary.income, dec!(3000));
        assert_eq!(summary.expense, dec!(1000));
    }

    #[test]
    fn test_summarize_empty_month() {
        let summary = summarize(&[], "February 2026".into());
        assert_eq!(summary.income, Decimal::ZERO);
        assert_eq!(summary.expense, Decimal::ZERO);
    }
}
