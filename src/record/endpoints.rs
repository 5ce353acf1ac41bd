//! Route handlers exposing the record operations as a JSON REST API.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderName, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
    routing::get,
};
use maud::Markup;
use rusqlite::Connection;
use serde::Deserialize;
use time_tz::Tz;

use crate::{
    AppState, Error,
    endpoints::format_endpoint,
    html::accepts_html,
    record::{
        DateRange, Record, RecordId, RecordList, TableQuery, create_record, delete_record,
        get_record, get_records_in_date_range, list_records, update_record,
        view::records_page,
    },
    timezone::get_timezone,
};

/// The state needed to manage records.
#[derive(Debug, Clone)]
pub struct RecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl RecordState {
    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }

    fn timezone(&self) -> Result<&'static Tz, Error> {
        get_timezone(&self.local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", self.local_timezone);
            Error::InvalidTimezoneError(self.local_timezone.clone())
        })
    }
}

/// The query string for date-range queries.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    /// The first day to include.
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// The last day to include.
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    /// Parse both bounds, which must be present.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a bound is missing or malformed.
    pub fn parse(&self, timezone: &Tz) -> Result<DateRange, Error> {
        let start = self
            .start_date
            .as_deref()
            .ok_or_else(|| Error::InvalidDate("startDate is required".to_owned()))?;
        let end = self
            .end_date
            .as_deref()
            .ok_or_else(|| Error::InvalidDate("endDate is required".to_owned()))?;

        DateRange::parse(start, end, timezone)
    }
}

/// The routes for creating, reading, updating, deleting and querying records of kind `R`.
pub fn record_routes<R: Record>() -> Router<AppState> {
    Router::new()
        .route(
            R::COLLECTION_ENDPOINT,
            get(list_records_endpoint::<R>).post(create_record_endpoint::<R>),
        )
        .route(
            R::DATE_RANGE_ENDPOINT,
            get(get_records_in_date_range_endpoint::<R>),
        )
        .route(
            R::RECORD_ENDPOINT,
            get(get_record_endpoint::<R>)
                .patch(update_record_endpoint::<R>)
                .delete(delete_record_endpoint::<R>),
        )
}

/// Any ID that is not a UUID cannot belong to a record.
fn parse_id(id: &str) -> Result<RecordId, Error> {
    RecordId::parse(id).map_err(|_| Error::NotFound)
}

fn json_rejection_to_error(rejection: JsonRejection) -> Error {
    Error::Validation(rejection.body_text())
}

/// A route handler for creating a record, responds with the created record
/// and its URL in the `Location` header.
async fn create_record_endpoint<R: Record>(
    State(state): State<RecordState>,
    payload: Result<Json<R::New>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<R>), Error> {
    let Json(new) = payload.map_err(json_rejection_to_error)?;
    let timezone = state.timezone()?;
    let connection = state.connection()?;

    let record = create_record::<R>(new, timezone, &connection)
        .inspect_err(|error| tracing::debug!("could not create {}: {error}", R::NAME))?;

    tracing::info!("created {} {}", R::NAME, record.id());

    let location = format_endpoint(R::RECORD_ENDPOINT, record.id());

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(record)))
}

/// A route handler for listing records.
///
/// Browsers get the table page, filtered by the query string. Everyone else
/// gets every record as JSON.
async fn list_records_endpoint<R: Record>(
    State(state): State<RecordState>,
    headers: HeaderMap,
    query: Result<Query<TableQuery>, QueryRejection>,
) -> Response {
    if !accepts_html(&headers) {
        return list_records_json::<R>(&state).into_response();
    }

    match get_records_page::<R>(&state, query) {
        Ok(page) => page.into_response(),
        Err(error) => error.into_page_response(),
    }
}

fn list_records_json<R: Record>(state: &RecordState) -> Result<Json<RecordList<R>>, Error> {
    let connection = state.connection()?;

    list_records(&connection).map(Json)
}

fn get_records_page<R: Record>(
    state: &RecordState,
    query: Result<Query<TableQuery>, QueryRejection>,
) -> Result<Markup, Error> {
    let Query(query) = query.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let timezone = state.timezone()?;
    let records = {
        let connection = state.connection()?;
        list_records::<R>(&connection)?
    };

    records_page(records, &query, timezone)
}

async fn get_record_endpoint<R: Record>(
    State(state): State<RecordState>,
    Path(id): Path<String>,
) -> Result<Json<R>, Error> {
    let id = parse_id(&id)?;
    let connection = state.connection()?;

    get_record(id, &connection).map(Json)
}

async fn get_records_in_date_range_endpoint<R: Record>(
    State(state): State<RecordState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<R>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidDate(rejection.body_text()))?;
    let range = query.parse(state.timezone()?)?;

    tracing::debug!(
        "{} date range request from {} to {}",
        R::NAME,
        range.start,
        range.end
    );

    let connection = state.connection()?;

    get_records_in_date_range(range, &connection).map(Json)
}

/// A route handler for partially updating a record, responds with the updated record.
async fn update_record_endpoint<R: Record>(
    State(state): State<RecordState>,
    Path(id): Path<String>,
    payload: Result<Json<R::Update>, JsonRejection>,
) -> Result<Json<R>, Error> {
    let id = parse_id(&id)?;
    let Json(update) = payload.map_err(json_rejection_to_error)?;
    let timezone = state.timezone()?;
    let connection = state.connection()?;

    update_record(id, update, timezone, &connection).map(Json)
}

/// A route handler for deleting a record, responds with no content.
async fn delete_record_endpoint<R: Record>(
    State(state): State<RecordState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    let id = parse_id(&id)?;
    let connection = state.connection()?;

    delete_record::<R>(id, &connection)?;

    tracing::info!("deleted {} {id}", R::NAME);

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header::LOCATION};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints, endpoints::format_endpoint};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "Etc/UTC").unwrap();

        TestServer::new(build_router(state))
    }

    async fn must_create(server: &TestServer, endpoint: &str, body: Value) -> Value {
        let response = server.post(endpoint).json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn create_expense_returns_201_with_generated_fields() {
        let server = get_test_server();

        let expense = must_create(
            &server,
            endpoints::EXPENSES,
            json!({
                "amount": 4599,
                "category": "Food & Dining",
                "date": "2025-05-20",
                "location": "Grocery Store"
            }),
        )
        .await;

        assert_eq!(expense["amount"], 4599);
        assert_eq!(expense["category"], "Food & Dining");
        assert_eq!(expense["date"], "2025-05-20");
        assert_eq!(expense["location"], "Grocery Store");
        assert_eq!(expense["description"], Value::Null);
        assert_eq!(expense["importance"], Value::Null);
        assert!(expense["id"].is_string());
        assert!(expense["createdAt"].is_string());
        assert!(expense["updatedAt"].is_string());

        let fetched = server
            .get(&format_endpoint(
                endpoints::EXPENSE,
                expense["id"].as_str().unwrap(),
            ))
            .await;
        fetched.assert_status_ok();
        assert_eq!(fetched.json::<Value>(), expense);
    }

    #[tokio::test]
    async fn create_sets_location_header() {
        let server = get_test_server();

        let response = server
            .post(endpoints::INCOME)
            .json(&json!({ "amount": 100, "source": "Salary", "date": "2025-05-01" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let income = response.json::<Value>();
        assert_eq!(
            response.header(LOCATION),
            format_endpoint(endpoints::INCOME_RECORD, income["id"].as_str().unwrap())
        );
    }

    #[tokio::test]
    async fn create_with_missing_field_is_400() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({ "amount": 100, "date": "2025-05-20" }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["statusCode"], 400);
        assert!(body["message"].as_str().unwrap().contains("category"));
    }

    #[tokio::test]
    async fn create_with_wrong_type_is_400() {
        let server = get_test_server();

        server
            .post(endpoints::INCOME)
            .json(&json!({ "amount": "lots", "source": "Salary", "date": "2025-05-20" }))
            .await
            .assert_status_bad_request();

        server
            .post(endpoints::INCOME)
            .json(&json!({ "amount": 45.99, "source": "Salary", "date": "2025-05-20" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_with_malformed_date_is_400() {
        let server = get_test_server();

        server
            .post(endpoints::INVESTMENTS)
            .json(&json!({ "amount": 100, "type": "Stocks", "date": "last tuesday" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_with_invalid_json_is_400() {
        let server = get_test_server();

        server
            .post(endpoints::EXPENSES)
            .content_type("application/json")
            .bytes("{\"amount\": ".into())
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn client_cannot_set_server_fields() {
        let server = get_test_server();

        let income = must_create(
            &server,
            endpoints::INCOME,
            json!({
                "id": "not-an-id",
                "amount": 100,
                "source": "Salary",
                "date": "2025-05-20",
                "createdAt": "1999-01-01T00:00:00Z"
            }),
        )
        .await;

        assert_ne!(income["id"], "not-an-id");
        assert_ne!(income["createdAt"], "1999-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn list_returns_items_and_count() {
        let server = get_test_server();
        for amount in [100, 200] {
            must_create(
                &server,
                endpoints::INVESTMENTS,
                json!({ "amount": amount, "type": "Index Fund", "date": "2025-05-20" }),
            )
            .await;
        }

        let response = server.get(endpoints::INVESTMENTS).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["count"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_or_malformed_id_is_404() {
        let server = get_test_server();

        server
            .get(&format_endpoint(
                endpoints::EXPENSE,
                "67e55044-10b1-426f-9247-bb680e5fe0c8",
            ))
            .await
            .assert_status_not_found();
        server
            .get(&format_endpoint(endpoints::EXPENSE, "42"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn patch_updates_present_fields_only() {
        let server = get_test_server();
        let expense = must_create(
            &server,
            endpoints::EXPENSES,
            json!({ "amount": 5, "category": "Other", "date": "2025-05-20", "description": "Snacks" }),
        )
        .await;
        let endpoint = format_endpoint(endpoints::EXPENSE, expense["id"].as_str().unwrap());

        let response = server.patch(&endpoint).json(&json!({ "amount": 10 })).await;

        response.assert_status_ok();
        let updated = response.json::<Value>();
        assert_eq!(updated["amount"], 10);
        assert_eq!(updated["category"], "Other");
        assert_eq!(updated["description"], "Snacks");
        assert_eq!(updated["id"], expense["id"]);
        assert_eq!(updated["createdAt"], expense["createdAt"]);
    }

    #[tokio::test]
    async fn patch_with_null_clears_optional_field() {
        let server = get_test_server();
        let expense = must_create(
            &server,
            endpoints::EXPENSES,
            json!({
                "amount": 5,
                "category": "Other",
                "date": "2025-05-20",
                "importance": "High",
                "location": "Market"
            }),
        )
        .await;
        let endpoint = format_endpoint(endpoints::EXPENSE, expense["id"].as_str().unwrap());

        let updated = server
            .patch(&endpoint)
            .json(&json!({ "location": null }))
            .await
            .json::<Value>();

        assert_eq!(updated["location"], Value::Null);
        assert_eq!(updated["importance"], "High");
    }

    #[tokio::test]
    async fn patch_with_null_required_field_is_400() {
        let server = get_test_server();
        let income = must_create(
            &server,
            endpoints::INCOME,
            json!({ "amount": 5, "source": "Gift", "date": "2025-05-20" }),
        )
        .await;
        let endpoint = format_endpoint(endpoints::INCOME_RECORD, income["id"].as_str().unwrap());

        server
            .patch(&endpoint)
            .json(&json!({ "source": null }))
            .await
            .assert_status_bad_request();

        let unchanged = server.get(&endpoint).await.json::<Value>();
        assert_eq!(unchanged, income);
    }

    #[tokio::test]
    async fn patch_unknown_id_is_404() {
        let server = get_test_server();

        server
            .patch(&format_endpoint(
                endpoints::INVESTMENT,
                "67e55044-10b1-426f-9247-bb680e5fe0c8",
            ))
            .json(&json!({ "amount": 10 }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_returns_204_then_404() {
        let server = get_test_server();
        let investment = must_create(
            &server,
            endpoints::INVESTMENTS,
            json!({ "amount": 1000, "type": "Bonds", "date": "2025-05-20" }),
        )
        .await;
        let endpoint = format_endpoint(endpoints::INVESTMENT, investment["id"].as_str().unwrap());

        let response = server.delete(&endpoint).await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.as_bytes().is_empty());

        server.get(&endpoint).await.assert_status_not_found();
        server.delete(&endpoint).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn date_range_returns_matching_records() {
        let server = get_test_server();
        let may = must_create(
            &server,
            endpoints::INCOME,
            json!({ "amount": 300000, "source": "Salary", "date": "2025-05-01" }),
        )
        .await;
        must_create(
            &server,
            endpoints::INCOME,
            json!({ "amount": 300000, "source": "Salary", "date": "2025-06-01" }),
        )
        .await;

        let response = server
            .get(&format!(
                "{}?startDate=2025-05-01&endDate=2025-05-31",
                endpoints::INCOME_DATE_RANGE
            ))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!([may]));
    }

    #[tokio::test]
    async fn date_range_with_start_after_end_is_empty() {
        let server = get_test_server();
        must_create(
            &server,
            endpoints::EXPENSES,
            json!({ "amount": 1, "category": "Other", "date": "2025-05-15" }),
        )
        .await;

        let response = server
            .get(&format!(
                "{}?startDate=2025-05-31&endDate=2025-05-01",
                endpoints::EXPENSES_DATE_RANGE
            ))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!([]));
    }

    #[tokio::test]
    async fn date_range_with_bad_dates_is_400() {
        let server = get_test_server();

        server
            .get(&format!(
                "{}?startDate=2025-05-01&endDate=tomorrow",
                endpoints::EXPENSES_DATE_RANGE
            ))
            .await
            .assert_status_bad_request();

        server
            .get(&format!(
                "{}?startDate=2025-05-01",
                endpoints::EXPENSES_DATE_RANGE
            ))
            .await
            .assert_status_bad_request();
    }
}
