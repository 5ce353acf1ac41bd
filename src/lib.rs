//! Budget Assistant is a web app for tracking expenses, income and investments.
//!
//! This library provides a JSON REST API for each record kind and a
//! server-rendered reports page that summarises all three over a date range.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod expense;
mod html;
mod income;
mod investment;
mod logging;
mod navigation;
mod not_found;
mod record;
mod report;
mod routing;
mod timezone;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use expense::{Expense, ExpenseUpdate, Importance, NewExpense};
pub use income::{Income, IncomeUpdate, NewIncome};
pub use investment::{Investment, InvestmentUpdate, NewInvestment};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use record::{
    Cents, DateRange, Patch, Record, RecordDate, RecordId, RecordList, WireDate, create_record,
    delete_record, get_record, get_records_in_date_range, list_records, update_record,
};
pub use report::{ReportData, ReportSummary, Total, fetch_report_data};
pub use routing::build_router;
pub use timezone::{get_local_date, get_local_offset, get_timezone};

use crate::html::error_view;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent a payload that is missing a required field, has a
    /// field of the wrong type, or is not valid JSON.
    #[error("{0}")]
    Validation(String),

    /// A date or date-time string could not be parsed.
    ///
    /// Callers should include the offending input in the message.
    #[error("{0}")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    error: &'static str,
    message: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidDate(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::DatabaseLockError | Error::InvalidTimezoneError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message that is safe to show to the client.
    fn client_message(&self) -> String {
        match self {
            Error::Validation(_) | Error::InvalidDate(_) | Error::NotFound => self.to_string(),
            // Any errors that are not handled above are not intended to be shown to the client.
            _ => "An unexpected error occurred, check the server logs for more details.".to_owned(),
        }
    }

    /// Render the error as an HTML page instead of a JSON body.
    fn into_page_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        let page = error_view(
            status_code.canonical_reason().unwrap_or("Error"),
            status_code.as_str(),
            status_code.canonical_reason().unwrap_or("Error"),
            &self.client_message(),
        );

        (status_code, page).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        let body = ErrorBody {
            status_code: status_code.as_u16(),
            error: status_code.canonical_reason().unwrap_or("Error"),
            message: self.client_message(),
        };

        (status_code, Json(body)).into_response()
    }
}
