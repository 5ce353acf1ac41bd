//! The behaviour shared by every record kind: expenses, income and investments.
//!
//! Each kind is a struct implementing [Record]. The CRUD and date-range
//! operations in [store] and the HTTP handlers in [endpoints] are written
//! once against the trait.

mod date;
mod endpoints;
mod id;
mod patch;
mod store;
mod view;

use rusqlite::{Connection, Row};
use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use time_tz::Tz;

pub use date::{DateRange, RecordDate, WireDate};
pub(crate) use date::serialize_date;
pub(crate) use endpoints::{DateRangeQuery, record_routes};
pub use view::TableQuery;
pub use id::RecordId;
pub use patch::Patch;
pub use store::{
    RecordList, create_record, delete_record, get_record, get_records_in_date_range,
    list_records, update_record,
};

use crate::Error;

/// An amount of money in integer minor units, e.g. cents.
pub type Cents = i64;

/// A kind of financial record that is stored in its own table.
pub trait Record: Serialize + Send + Sized + 'static {
    /// The payload for creating a record. Every required field must be present.
    type New: DeserializeOwned + Send + 'static;

    /// The payload for partially updating a record.
    type Update: DeserializeOwned + Default + Send + 'static;

    /// The name of the kind for messages, e.g. "Expense".
    const NAME: &'static str;

    /// The name of the database table.
    const TABLE: &'static str;

    /// The columns to select, in the order [Record::map_row] expects them.
    const COLUMNS: &'static str;

    /// The route for creating and listing records.
    const COLLECTION_ENDPOINT: &'static str;

    /// The route for the date-range query.
    const DATE_RANGE_ENDPOINT: &'static str;

    /// The route for a single record, with an `{id}` parameter.
    const RECORD_ENDPOINT: &'static str;

    /// The plural name of the kind for page titles, e.g. "Expenses".
    const TITLE: &'static str;

    /// The name of the field that groups records, e.g. "Category".
    const LABEL_NAME: &'static str;

    /// The headings of the table columns filled by [Record::detail_cells].
    const DETAIL_HEADERS: &'static [&'static str];

    /// The ID of the record.
    fn id(&self) -> RecordId;

    /// The amount of money the record is for.
    fn amount(&self) -> Cents;

    /// When the record happened.
    fn date(&self) -> RecordDate;

    /// The value of the field named by [Record::LABEL_NAME].
    fn label(&self) -> &str;

    /// The text of the kind specific table cells, in [Record::DETAIL_HEADERS] order.
    fn detail_cells(&self) -> Vec<String>;

    /// Convert a row selected with [Record::COLUMNS] into a record.
    fn map_row(row: &Row) -> Result<Self, rusqlite::Error>;

    /// Validate a create payload and build the record to be inserted.
    ///
    /// `created_at` is used for both timestamps. Dates are resolved in
    /// `timezone`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a required field is blank.
    fn build(
        new: Self::New,
        id: RecordId,
        created_at: OffsetDateTime,
        timezone: &Tz,
    ) -> Result<Self, Error>;

    /// Overlay the fields present in `update` onto the record.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a required field would be cleared or left blank.
    fn apply_update(&mut self, update: Self::Update, timezone: &Tz) -> Result<(), Error>;

    /// Set the last-modified timestamp.
    fn touch(&mut self, updated_at: OffsetDateTime);

    /// Insert the record and return the row as stored.
    fn insert(&self, connection: &Connection) -> Result<Self, rusqlite::Error>;

    /// Overwrite the stored row that has the record's ID and return the row as stored.
    fn save(&self, connection: &Connection) -> Result<Self, rusqlite::Error>;
}

/// Check that a required text field is not blank and trim it.
///
/// # Errors
/// Returns [Error::Validation] naming `field_name` if `value` is empty or whitespace.
pub(crate) fn require_text(field_name: &str, value: String) -> Result<String, Error> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field_name} should not be empty")));
    }

    Ok(trimmed.to_owned())
}
