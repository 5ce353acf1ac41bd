//! The reports page.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, Duration};

use crate::{
    Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency,
    },
    navigation::NavBar,
    record::{DateRange, DateRangeQuery},
    report::{ReportData, Total, endpoint::ReportState, fetch_report_data},
    timezone::get_local_date,
};

/// Display the totals for a date range.
///
/// Without query parameters the page covers the current month up to today.
pub async fn get_reports_page(
    State(state): State<ReportState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Response {
    let range = match resolve_range(&state, query) {
        Ok(range) => range,
        Err(error) => return error.into_page_response(),
    };

    let report = fetch_report_data(state.db_connection, range).await;

    reports_view(&report).into_response()
}

fn resolve_range(
    state: &ReportState,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<DateRange, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidDate(rejection.body_text()))?;
    let timezone = state.timezone()?;
    let today = get_local_date(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let start = query
        .start_date
        .unwrap_or_else(|| first_of_month(today).to_string());
    let end = query.end_date.unwrap_or_else(|| today.to_string());

    DateRange::parse(&start, &end, timezone)
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

fn reports_view(report: &ReportData) -> Markup {
    let summary = report.summary;
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { "Financial Reports" }

            form
                method="get"
                action=(endpoints::REPORTS_VIEW)
                class="flex flex-wrap items-end gap-4 mb-8"
            {
                div
                {
                    label for="startDate" class=(FORM_LABEL_STYLE) { "Start Date" }
                    input
                        type="date"
                        id="startDate"
                        name="startDate"
                        value=(report.start_date.to_string())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="endDate" class=(FORM_LABEL_STYLE) { "End Date" }
                    input
                        type="date"
                        id="endDate"
                        name="endDate"
                        value=(report.end_date.to_string())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update" }
            }

            @if report.range().is_empty()
            {
                p class="mb-4 text-red-500" { "The start date is after the end date." }
            }

            div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 w-full max-w-5xl"
            {
                (summary_card("total-income", "Total Income", summary.total_income, report.income.len()))
                (summary_card("total-expenses", "Total Expenses", summary.total_expenses, report.expenses.len()))
                (summary_card("total-investments", "Total Investments", summary.total_investments, report.investments.len()))
                (net_savings_card(summary.net_savings))
            }
        }
    };

    base("Reports", &content)
}

fn summary_card(id: &str, title: &str, amount: Total, record_count: usize) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class="amount text-2xl font-semibold" { (format_currency(amount)) }
            p class="text-xs text-gray-500 dark:text-gray-400"
            {
                (record_count) @if record_count == 1 { " record" } @else { " records" }
            }
        }
    }
}

fn net_savings_card(amount: Total) -> Markup {
    let colour = if amount < 0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        div id="net-savings" class=(CARD_STYLE)
        {
            h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { "Net Savings" }
            p class={ "amount text-2xl font-semibold " (colour) } { (format_currency(amount)) }
        }
    }
}
