//! Reports module
//!
//! Totals income, expenses and investments over a date range. The totals are
//! served as JSON and as an HTML page.

mod aggregation;
mod endpoint;
mod page;

pub use aggregation::{ReportData, ReportSummary, Total, fetch_report_data};
pub use endpoint::get_report_summary;
pub use page::get_reports_page;
