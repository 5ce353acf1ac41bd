//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{id}', use [format_endpoint].

/// The root route which redirects to the reports page.
pub const ROOT: &str = "/";
/// The page summarising income, expenses and investments over a date range.
pub const REPORTS_VIEW: &str = "/reports";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create and list expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to query expenses by date range.
pub const EXPENSES_DATE_RANGE: &str = "/expenses/date-range";
/// The route to access a single expense.
pub const EXPENSE: &str = "/expenses/{id}";

/// The route to create and list income.
pub const INCOME: &str = "/income";
/// The route to query income by date range.
pub const INCOME_DATE_RANGE: &str = "/income/date-range";
/// The route to access a single income record.
pub const INCOME_RECORD: &str = "/income/{id}";

/// The route to create and list investments.
pub const INVESTMENTS: &str = "/investments";
/// The route to query investments by date range.
pub const INVESTMENTS_DATE_RANGE: &str = "/investments/date-range";
/// The route to access a single investment.
pub const INVESTMENT: &str = "/investments/{id}";

/// The route for the JSON summary behind the reports page.
pub const REPORT_SUMMARY: &str = "/reports/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{id}', '{id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
