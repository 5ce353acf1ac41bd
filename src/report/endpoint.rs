//! The JSON report endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use time_tz::Tz;

use crate::{
    AppState, Error,
    record::DateRangeQuery,
    report::{ReportData, fetch_report_data},
    timezone::get_timezone,
};

/// The state needed for building reports.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl ReportState {
    pub(super) fn timezone(&self) -> Result<&'static Tz, Error> {
        get_timezone(&self.local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", self.local_timezone);
            Error::InvalidTimezoneError(self.local_timezone.clone())
        })
    }
}

/// A route handler for the records and totals over a date range.
///
/// Both `startDate` and `endDate` are required.
pub async fn get_report_summary(
    State(state): State<ReportState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<ReportData>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidDate(rejection.body_text()))?;
    let range = query.parse(state.timezone()?)?;

    Ok(Json(fetch_report_data(state.db_connection, range).await))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "Etc/UTC").unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn summary_totals_each_kind() {
        let server = get_test_server();
        server
            .post(endpoints::INCOME)
            .json(&json!({ "amount": 500000, "source": "Salary", "date": "2025-05-01" }))
            .await;
        server
            .post(endpoints::INCOME)
            .json(&json!({ "amount": 500000, "source": "Salary", "date": "2025-06-01" }))
            .await;
        server
            .post(endpoints::EXPENSES)
            .json(&json!({ "amount": 4599, "category": "Food & Dining", "date": "2025-05-20" }))
            .await;
        server
            .post(endpoints::INVESTMENTS)
            .json(&json!({ "amount": 100000, "type": "Index Fund", "date": "2025-05-15" }))
            .await;

        let response = server
            .get(endpoints::REPORT_SUMMARY)
            .add_query_param("startDate", "2025-05-01")
            .add_query_param("endDate", "2025-05-31")
            .await;

        response.assert_status_ok();
        let report = response.json::<Value>();
        assert_eq!(report["startDate"], "2025-05-01");
        assert_eq!(report["endDate"], "2025-05-31");
        assert_eq!(report["income"].as_array().unwrap().len(), 1);
        assert_eq!(
            report["summary"],
            json!({
                "totalIncome": 500000,
                "totalExpenses": 4599,
                "totalInvestments": 100000,
                "netSavings": 395401
            })
        );
    }

    #[tokio::test]
    async fn summary_of_largest_amounts_is_exact() {
        let server = get_test_server();
        for date in ["2025-05-01", "2025-05-02"] {
            server
                .post(endpoints::INCOME)
                .json(&json!({ "amount": i64::MAX, "source": "Salary", "date": date }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get(endpoints::REPORT_SUMMARY)
            .add_query_param("startDate", "2025-05-01")
            .add_query_param("endDate", "2025-05-31")
            .await;

        response.assert_status_ok();
        let body = response.text();
        assert!(
            body.contains(r#""totalIncome":18446744073709551614"#),
            "unexpected body: {body}"
        );
        assert!(
            body.contains(r#""netSavings":18446744073709551614"#),
            "unexpected body: {body}"
        );
    }

    #[tokio::test]
    async fn summary_requires_both_dates() {
        let server = get_test_server();

        server
            .get(endpoints::REPORT_SUMMARY)
            .add_query_param("startDate", "2025-05-01")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn summary_rejects_malformed_dates() {
        let server = get_test_server();

        let response = server
            .get(endpoints::REPORT_SUMMARY)
            .add_query_param("startDate", "May")
            .add_query_param("endDate", "2025-05-31")
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["statusCode"], 400);
    }
}
