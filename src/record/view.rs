//! HTML rendering for the record table pages.

use std::{cmp::Reverse, collections::BTreeSet};

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use time_tz::Tz;

use crate::{
    Error,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    record::{DateRange, DateRangeQuery, Record, RecordList},
};

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// The filters of a record table page.
///
/// Empty values, as sent by a form with blank inputs, do not filter.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    /// Only show records with this text in one of their fields, ignoring case.
    pub search: Option<String>,
    /// Only show records with this label, e.g. one expense category.
    pub category: Option<String>,
    /// The first day to show.
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// The last day to show.
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// The parsed form of a [TableQuery].
#[derive(Debug)]
struct TableFilter<'a> {
    search: Option<String>,
    label: Option<&'a str>,
    range: Option<DateRange>,
}

impl TableQuery {
    fn filter(&self, timezone: &Tz) -> Result<TableFilter<'_>, Error> {
        let range = match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (None, None) => None,
            (start, end) => Some(
                DateRangeQuery {
                    start_date: start.map(str::to_owned),
                    end_date: end.map(str::to_owned),
                }
                .parse(timezone)?,
            ),
        };

        Ok(TableFilter {
            search: non_empty(&self.search).map(str::to_lowercase),
            label: non_empty(&self.category),
            range,
        })
    }
}

impl TableFilter<'_> {
    fn matches<R: Record>(&self, record: &R) -> bool {
        let in_range = self
            .range
            .is_none_or(|range| range.contains(record.date().date()));
        let has_label = self.label.is_none_or(|label| record.label() == label);
        let has_text = self.search.as_deref().is_none_or(|search| {
            searchable_text(record)
                .iter()
                .any(|text| text.to_lowercase().contains(search))
        });

        in_range && has_label && has_text
    }
}

fn display_date(date: Date) -> String {
    date.format(DISPLAY_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// The text a search is matched against: every column as displayed, plus the ISO date.
fn searchable_text<R: Record>(record: &R) -> Vec<String> {
    let date = record.date().date();
    let mut text = vec![
        display_date(date),
        date.to_string(),
        format_currency(record.amount()),
        record.label().to_owned(),
    ];
    text.extend(record.detail_cells());

    text
}

/// Render the table page for every record of kind `R`, newest first.
///
/// # Errors
/// Returns [Error::InvalidDate] if the query has a malformed or missing date bound.
pub(crate) fn records_page<R: Record>(
    list: RecordList<R>,
    query: &TableQuery,
    timezone: &Tz,
) -> Result<Markup, Error> {
    let filter = query.filter(timezone)?;
    let total = list.count;

    let labels: BTreeSet<String> = list
        .items
        .iter()
        .map(|record| record.label().to_owned())
        .collect();

    let mut rows: Vec<R> = list
        .items
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect();
    rows.sort_by_key(|record| Reverse(record.date()));

    Ok(records_view(&rows, total, &labels, query, filter.label))
}

fn records_view<R: Record>(
    rows: &[R],
    total: usize,
    labels: &BTreeSet<String>,
    query: &TableQuery,
    selected_label: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(R::COLLECTION_ENDPOINT).into_html();
    let kind = R::TITLE.to_lowercase();
    let column_count = 3 + R::DETAIL_HEADERS.len();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { (R::TITLE) }

            form
                method="get"
                action=(R::COLLECTION_ENDPOINT)
                class="flex flex-wrap items-end gap-4 mb-8"
            {
                div
                {
                    label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                    input
                        type="search"
                        id="search"
                        name="search"
                        placeholder={ "Search " (kind) "..." }
                        value=(query.search.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { (R::LABEL_NAME) }
                    select id="category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "All" }
                        @for label in labels {
                            option value=(label) selected[selected_label == Some(label.as_str())]
                            {
                                (label)
                            }
                        }
                    }
                }

                div
                {
                    label for="startDate" class=(FORM_LABEL_STYLE) { "Start Date" }
                    input
                        type="date"
                        id="startDate"
                        name="startDate"
                        value=(query.start_date.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="endDate" class=(FORM_LABEL_STYLE) { "End Date" }
                    input
                        type="date"
                        id="endDate"
                        name="endDate"
                        value=(query.end_date.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
            }

            p id="record-count" class="mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "Showing " (rows.len()) " of " (total) " " (kind)
            }

            div class="w-full max-w-5xl overflow-x-auto"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class="px-6 py-4 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { (R::LABEL_NAME) }
                            @for header in R::DETAIL_HEADERS {
                                th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                            }
                        }
                    }

                    tbody
                    {
                        @for record in rows {
                            (record_row_view(record))
                        }

                        @if rows.is_empty() {
                            tr
                            {
                                td
                                    colspan=(column_count)
                                    data-empty-state="true"
                                    class="px-6 py-4 text-center"
                                {
                                    "No " (kind) " found."
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(R::TITLE, &content)
}

fn record_row_view<R: Record>(record: &R) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE) data-record-id=(record.id().to_string())
        {
            td class=(TABLE_CELL_STYLE) { (display_date(record.date().date())) }
            td class="px-6 py-4 text-right" { (format_currency(record.amount())) }
            td class=(TABLE_CELL_STYLE) { (record.label()) }
            @for cell in record.detail_cells() {
                td class=(TABLE_CELL_STYLE) { (cell) }
            }
        }
    }
}
