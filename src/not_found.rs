//! The fallback for routes that do not exist.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    html::{accepts_html, error_view},
};

/// Respond with a 404 page for browsers and a JSON error for API clients.
pub async fn get_404_not_found(headers: HeaderMap) -> Response {
    if accepts_html(&headers) {
        get_404_not_found_page()
    } else {
        Error::NotFound.into_response()
    }
}

fn get_404_not_found_page() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Page not found.",
            "Sorry, we can't find that page. You'll find lots to explore on the reports page.",
        ),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode, header::ACCEPT};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use serde_json::Value;

    use crate::{AppState, build_router};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "Etc/UTC").unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let server = get_test_server();

        let response = server.get("/budgets").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn unknown_page_is_html_404_for_browsers() {
        let server = get_test_server();

        let response = server
            .get("/budgets")
            .add_header(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let html = Html::parse_document(&response.text());
        let heading = Selector::parse("h1").unwrap();
        assert_eq!(
            html.select(&heading)
                .next()
                .map(|h1| h1.text().collect::<String>()),
            Some("404".to_owned())
        );
    }
}
