//! CRUD and date-range queries for any [Record] kind.

use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    Error,
    record::{DateRange, Record, RecordId},
};

/// Every record of one kind and how many there are.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordList<R> {
    /// The records, in the order the database returned them.
    pub items: Vec<R>,
    /// The number of records.
    pub count: usize,
}

/// Validate `new` and insert it as a new record with a fresh ID.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a required field is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_record<R: Record>(
    new: R::New,
    timezone: &Tz,
    connection: &Connection,
) -> Result<R, Error> {
    let record = R::build(new, RecordId::new(), OffsetDateTime::now_utc(), timezone)?;

    record.insert(connection).map_err(Error::from)
}

/// Retrieve every record of kind `R`.
///
/// No ordering is applied, records come back in insertion order.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_records<R: Record>(connection: &Connection) -> Result<RecordList<R>, Error> {
    let items = connection
        .prepare(&format!("SELECT {} FROM \"{}\"", R::COLUMNS, R::TABLE))?
        .query_map([], R::map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordList {
        count: items.len(),
        items,
    })
}

/// Retrieve a record by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a record of kind `R`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_record<R: Record>(id: RecordId, connection: &Connection) -> Result<R, Error> {
    let record = connection
        .prepare(&format!(
            "SELECT {} FROM \"{}\" WHERE id = :id",
            R::COLUMNS,
            R::TABLE
        ))?
        .query_one(&[(":id", &id)], R::map_row)?;

    Ok(record)
}

/// Overlay the fields present in `update` onto the record `id` and save it.
///
/// The read and the write are not protected against concurrent editors, the
/// last write wins.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a record of kind `R`,
/// - [Error::Validation] if the update would clear or blank a required field,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_record<R: Record>(
    id: RecordId,
    update: R::Update,
    timezone: &Tz,
    connection: &Connection,
) -> Result<R, Error> {
    let mut record: R = get_record(id, connection)?;

    record.apply_update(update, timezone)?;
    record.touch(OffsetDateTime::now_utc());

    record.save(connection).map_err(Error::from)
}

/// Permanently delete the record `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no row was deleted,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_record<R: Record>(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!("DELETE FROM \"{}\" WHERE id = :id", R::TABLE),
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Retrieve the records whose date falls on a day within `range`.
///
/// Stored dates are truncated to their calendar date before comparing, so the
/// stored time of day never excludes a record. An empty range (start after
/// end) matches nothing.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_records_in_date_range<R: Record>(
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<R>, Error> {
    connection
        .prepare(&format!(
            "SELECT {} FROM \"{}\" WHERE DATE(date) >= DATE(:start) AND DATE(date) <= DATE(:end)",
            R::COLUMNS,
            R::TABLE
        ))?
        .query_map(
            &[(":start", &range.start), (":end", &range.end)],
            R::map_row,
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}
