//! Creates and upgrades the application's database schema.
//!
//! The schema version is kept in SQLite's `user_version` header field. Each
//! entry of [MIGRATIONS] moves the schema forward by one version and is applied
//! at most once.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::Error;

/// The schema changes in the order they must be applied.
///
/// Never edit or reorder a published entry, add a new one instead.
const MIGRATIONS: [&str; 5] = [
    // 1: The first expense table.
    "CREATE TABLE expense (
        id TEXT PRIMARY KEY NOT NULL,
        amount INTEGER NOT NULL,
        description TEXT NOT NULL,
        category TEXT,
        importance TEXT CHECK (importance IN ('Low', 'Medium', 'High')),
        date TEXT NOT NULL,
        source TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );",
    // 2: Where the money was spent is a location, not a source.
    "ALTER TABLE expense RENAME COLUMN source TO location;",
    // 3: Categories are required, descriptions are optional.
    "CREATE TABLE expense_new (
        id TEXT PRIMARY KEY NOT NULL,
        amount INTEGER NOT NULL,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT,
        importance TEXT CHECK (importance IN ('Low', 'Medium', 'High')),
        location TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    INSERT INTO expense_new (id, amount, category, date, description, importance, location, created_at, updated_at)
        SELECT id, amount, COALESCE(category, 'Other'), date, description, importance, location, created_at, updated_at
        FROM expense;
    DROP TABLE expense;
    ALTER TABLE expense_new RENAME TO expense;
    CREATE INDEX idx_expense_date ON expense(date);",
    // 4
    "CREATE TABLE income (
        id TEXT PRIMARY KEY NOT NULL,
        amount INTEGER NOT NULL,
        source TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX idx_income_date ON income(date);",
    // 5
    "CREATE TABLE investment (
        id TEXT PRIMARY KEY NOT NULL,
        amount INTEGER NOT NULL,
        type TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX idx_investment_date ON investment(date);",
];

/// Create the tables for the domain models, or bring an existing database up
/// to the latest schema.
///
/// All pending migrations run in one exclusive transaction, so a failed
/// upgrade leaves the database untouched. Calling this on an up-to-date
/// database does nothing.
///
/// # Errors
/// Returns an [Error::SqlError] if a migration fails.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let version: i64 = transaction.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    // Negative versions are never written by this crate, treat them as a fresh database.
    let version = usize::try_from(version).unwrap_or(0);

    if version > MIGRATIONS.len() {
        tracing::warn!(
            "database schema version {version} is newer than the latest known version {}",
            MIGRATIONS.len()
        );
    }

    for (index, migration) in MIGRATIONS.iter().enumerate().skip(version) {
        let next_version = index + 1;
        tracing::info!("migrating database schema to version {next_version}");

        transaction.execute_batch(migration)?;
        transaction.execute_batch(&format!("PRAGMA user_version = {next_version}"))?;
    }

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        db::{MIGRATIONS, initialize},
        expense::Expense,
        record::{RecordDate, RecordId, get_record},
    };

    fn user_version(connection: &Connection) -> i64 {
        connection
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn creates_latest_schema() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(user_version(&connection), MIGRATIONS.len() as i64);
        for table in ["expense", "income", "investment"] {
            let count: i64 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn reads_version_written_by_sqlite() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch("PRAGMA user_version = -1").unwrap();

        initialize(&connection).unwrap();

        assert_eq!(user_version(&connection), MIGRATIONS.len() as i64);
    }

    #[test]
    fn initialize_twice_is_a_no_op() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        initialize(&connection).unwrap();

        assert_eq!(user_version(&connection), MIGRATIONS.len() as i64);
    }

    #[test]
    fn upgrades_legacy_expense_table() {
        let connection = Connection::open_in_memory().unwrap();
        connection.execute_batch(MIGRATIONS[0]).unwrap();
        connection.execute_batch("PRAGMA user_version = 1").unwrap();
        let id = RecordId::new();
        let created_at = OffsetDateTime::UNIX_EPOCH;
        connection
            .execute(
                "INSERT INTO expense (id, amount, description, category, importance, date, source, created_at, updated_at)
                 VALUES (?1, 4599, 'Weekly shop', NULL, 'High', '2025-05-20 00:00:00', 'Grocery Store', ?2, ?2)",
                (id, created_at),
            )
            .unwrap();

        initialize(&connection).unwrap();

        let expense: Expense = get_record(id, &connection).unwrap();
        assert_eq!(user_version(&connection), MIGRATIONS.len() as i64);
        assert_eq!(expense.amount, 4599);
        assert_eq!(expense.category, "Other");
        assert_eq!(expense.location.as_deref(), Some("Grocery Store"));
        assert_eq!(expense.description.as_deref(), Some("Weekly shop"));
        assert_eq!(expense.date, RecordDate::from(date!(2025 - 05 - 20)));
        assert_eq!(expense.created_at, created_at);
    }

    #[test]
    fn description_is_optional_after_upgrade() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = connection.execute(
            "INSERT INTO expense (id, amount, category, date, created_at, updated_at)
             VALUES ('a', 1, 'Other', '2025-05-20 00:00:00', '', '')",
            [],
        );

        assert_eq!(result, Ok(1));
    }

    #[test]
    fn category_is_required_after_upgrade() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = connection.execute(
            "INSERT INTO expense (id, amount, date, created_at, updated_at)
             VALUES ('a', 1, '2025-05-20 00:00:00', '', '')",
            [],
        );

        assert!(result.is_err());
    }
}
