//! Runs the per-kind date-range queries concurrently and totals the results.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    expense::Expense,
    income::Income,
    investment::Investment,
    record::{DateRange, Record, get_records_in_date_range, serialize_date},
};

/// How long a single kind's query may take before it is reported as empty.
const REPORT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// A sum of amounts in cents.
///
/// Wide enough that adding up any number of record amounts cannot overflow.
pub type Total = i128;

/// The totals shown on the reports page, in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// The sum of all income.
    pub total_income: Total,
    /// The sum of all expenses.
    pub total_expenses: Total,
    /// The sum of all investments.
    pub total_investments: Total,
    /// Income minus expenses minus investments.
    pub net_savings: Total,
}

impl ReportSummary {
    /// Total the amounts of each kind.
    pub fn new(income: &[Income], expenses: &[Expense], investments: &[Investment]) -> Self {
        let total_income = sum_amounts(income);
        let total_expenses = sum_amounts(expenses);
        let total_investments = sum_amounts(investments);

        Self {
            total_income,
            total_expenses,
            total_investments,
            net_savings: total_income - total_expenses - total_investments,
        }
    }
}

fn sum_amounts<R: Record>(records: &[R]) -> Total {
    records.iter().map(|record| Total::from(record.amount())).sum()
}

/// The records and totals for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// The first day in the report.
    #[serde(serialize_with = "serialize_date")]
    pub start_date: Date,
    /// The last day in the report.
    #[serde(serialize_with = "serialize_date")]
    pub end_date: Date,
    /// The income received in the range.
    pub income: Vec<Income>,
    /// The expenses paid in the range.
    pub expenses: Vec<Expense>,
    /// The investments made in the range.
    pub investments: Vec<Investment>,
    /// The totals of the above.
    pub summary: ReportSummary,
}

impl ReportData {
    /// The days the report covers.
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Fetch every record in `range` and total them.
///
/// The three kinds are queried concurrently on the blocking thread pool. A
/// kind whose query fails, panics or times out is logged and counted as
/// having no records, so this function never fails.
pub async fn fetch_report_data(db_connection: Arc<Mutex<Connection>>, range: DateRange) -> ReportData {
    fetch_report_data_within(db_connection, range, REPORT_QUERY_TIMEOUT).await
}

async fn fetch_report_data_within(
    db_connection: Arc<Mutex<Connection>>,
    range: DateRange,
    query_timeout: Duration,
) -> ReportData {
    let (income, expenses, investments) = if range.is_empty() {
        (Vec::new(), Vec::new(), Vec::new())
    } else {
        tokio::join!(
            fetch_records::<Income>(db_connection.clone(), range, query_timeout),
            fetch_records::<Expense>(db_connection.clone(), range, query_timeout),
            fetch_records::<Investment>(db_connection, range, query_timeout),
        )
    };

    let summary = ReportSummary::new(&income, &expenses, &investments);

    ReportData {
        start_date: range.start,
        end_date: range.end,
        income,
        expenses,
        investments,
        summary,
    }
}

async fn fetch_records<R: Record>(
    db_connection: Arc<Mutex<Connection>>,
    range: DateRange,
    query_timeout: Duration,
) -> Vec<R> {
    run_report_query(R::NAME, db_connection, query_timeout, move |connection| {
        get_records_in_date_range::<R>(range, connection)
    })
    .await
}

/// Run `query` on the blocking thread pool, giving up after `query_timeout`.
///
/// Every failure is logged and becomes an empty list.
async fn run_report_query<T, F>(
    name: &'static str,
    db_connection: Arc<Mutex<Connection>>,
    query_timeout: Duration,
    query: F,
) -> Vec<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<Vec<T>, Error> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        let connection = db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        query(&connection)
    });

    match tokio::time::timeout(query_timeout, task).await {
        Ok(Ok(Ok(records))) => records,
        Ok(Ok(Err(error))) => {
            tracing::error!("could not fetch {name} records for report: {error}");
            Vec::new()
        }
        Ok(Err(error)) => {
            tracing::error!("{name} report query did not complete: {error}");
            Vec::new()
        }
        Err(_) => {
            tracing::error!("{name} report query timed out after {query_timeout:?}");
            Vec::new()
        }
    }
}
