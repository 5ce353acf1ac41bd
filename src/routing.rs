//! Application router configuration.

use axum::{Router, response::Redirect, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    expense::Expense,
    income::Income,
    investment::Investment,
    not_found::get_404_not_found,
    record::record_routes,
    report::{get_report_summary, get_reports_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::REPORT_SUMMARY, get(get_report_summary))
        .merge(record_routes::<Expense>())
        .merge(record_routes::<Income>())
        .merge(record_routes::<Investment>())
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the reports page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::REPORTS_VIEW)
}
