//! Defines the income record and its database table.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    Error, endpoints,
    record::{Cents, Patch, Record, RecordDate, RecordId, WireDate, require_text},
};

/// Money that was earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    /// The ID of the income record.
    pub id: RecordId,
    /// The amount earned in cents.
    pub amount: Cents,
    /// Where the money came from, e.g. "Salary".
    pub source: String,
    /// When the money was received.
    pub date: RecordDate,
    /// A free-form note.
    pub description: Option<String>,
    /// When the income was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the income was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The payload for creating an [Income] record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewIncome {
    /// The amount earned in cents.
    pub amount: Cents,
    /// Where the money came from.
    pub source: String,
    /// When the money was received.
    pub date: WireDate,
    /// A free-form note.
    #[serde(default)]
    pub description: Option<String>,
}

/// The payload for partially updating an [Income] record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IncomeUpdate {
    #[allow(missing_docs)]
    pub amount: Patch<Cents>,
    #[allow(missing_docs)]
    pub source: Patch<String>,
    #[allow(missing_docs)]
    pub date: Patch<WireDate>,
    #[allow(missing_docs)]
    pub description: Patch<String>,
}

impl Record for Income {
    type New = NewIncome;
    type Update = IncomeUpdate;

    const NAME: &'static str = "Income";
    const TABLE: &'static str = "income";
    const COLUMNS: &'static str = "id, amount, source, date, description, created_at, updated_at";

    const COLLECTION_ENDPOINT: &'static str = endpoints::INCOME;
    const DATE_RANGE_ENDPOINT: &'static str = endpoints::INCOME_DATE_RANGE;
    const RECORD_ENDPOINT: &'static str = endpoints::INCOME_RECORD;

    const TITLE: &'static str = "Income";
    const LABEL_NAME: &'static str = "Source";
    const DETAIL_HEADERS: &'static [&'static str] = &["Description"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn amount(&self) -> Cents {
        self.amount
    }

    fn date(&self) -> RecordDate {
        self.date
    }

    fn label(&self) -> &str {
        &self.source
    }

    fn detail_cells(&self) -> Vec<String> {
        vec![self.description.clone().unwrap_or_default()]
    }

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            source: row.get(2)?,
            date: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn build(
        new: NewIncome,
        id: RecordId,
        created_at: OffsetDateTime,
        timezone: &Tz,
    ) -> Result<Self, Error> {
        Ok(Self {
            id,
            amount: new.amount,
            source: require_text("source", new.source)?,
            date: RecordDate::new(new.date.to_local(timezone)),
            description: new.description,
            created_at,
            updated_at: created_at,
        })
    }

    fn apply_update(&mut self, update: IncomeUpdate, timezone: &Tz) -> Result<(), Error> {
        update.amount.apply_required("amount", &mut self.amount)?;
        update
            .source
            .try_map(|source| require_text("source", source))?
            .apply_required("source", &mut self.source)?;
        update
            .date
            .try_map(|date| Ok(RecordDate::new(date.to_local(timezone))))?
            .apply_required("date", &mut self.date)?;
        update.description.apply_optional(&mut self.description);

        Ok(())
    }

    fn touch(&mut self, updated_at: OffsetDateTime) {
        self.updated_at = updated_at;
    }

    fn insert(&self, connection: &Connection) -> Result<Self, rusqlite::Error> {
        connection
            .prepare(&format!(
                "INSERT INTO income (id, amount, source, date, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {}",
                Self::COLUMNS
            ))?
            .query_row(
                (
                    self.id,
                    self.amount,
                    &self.source,
                    self.date,
                    &self.description,
                    self.created_at,
                    self.updated_at,
                ),
                Self::map_row,
            )
    }

    fn save(&self, connection: &Connection) -> Result<Self, rusqlite::Error> {
        connection
            .prepare(&format!(
                "UPDATE income
                 SET amount = ?2, source = ?3, date = ?4, description = ?5, updated_at = ?6
                 WHERE id = ?1
                 RETURNING {}",
                Self::COLUMNS
            ))?
            .query_row(
                (
                    self.id,
                    self.amount,
                    &self.source,
                    self.date,
                    &self.description,
                    self.updated_at,
                ),
                Self::map_row,
            )
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;
    use time_tz::Tz;

    use crate::{
        Error,
        income::{Income, IncomeUpdate, NewIncome},
        initialize_db,
        record::{
            DateRange, Patch, RecordDate, create_record, get_records_in_date_range,
            update_record,
        },
        timezone::get_timezone,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        connection
    }

    fn utc() -> &'static Tz {
        get_timezone("Etc/UTC").unwrap()
    }

    fn must_create(amount: i64, date: &str, connection: &Connection) -> Income {
        create_record(
            NewIncome {
                amount,
                source: "Salary".to_owned(),
                date: date.parse().unwrap(),
                description: None,
            },
            utc(),
            connection,
        )
        .unwrap()
    }

    #[test]
    fn date_range_excludes_next_month() {
        let connection = get_test_connection();
        let may = must_create(500_000, "2025-05-01", &connection);
        must_create(500_000, "2025-06-01", &connection);

        let got: Vec<Income> = get_records_in_date_range(
            DateRange::parse("2025-05-01", "2025-05-31", utc()).unwrap(),
            &connection,
        )
        .unwrap();

        assert_eq!(got, vec![may]);
    }

    #[test]
    fn rfc3339_date_is_stored_in_local_timezone() {
        let connection = get_test_connection();
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        let income: Income = create_record(
            NewIncome {
                amount: 100,
                source: "Gift".to_owned(),
                date: "2025-05-19T13:00:00Z".parse().unwrap(),
                description: None,
            },
            auckland,
            &connection,
        )
        .unwrap();

        // 13:00 UTC is 01:00 the next day in Auckland (UTC+12 in May).
        assert_eq!(income.date.date(), date!(2025 - 05 - 20));
    }

    #[test]
    fn update_source_and_clear_description() {
        let connection = get_test_connection();
        let income: Income = create_record(
            NewIncome {
                amount: 100,
                source: "Salary".to_owned(),
                date: "2025-05-01".parse().unwrap(),
                description: Some("May pay".to_owned()),
            },
            utc(),
            &connection,
        )
        .unwrap();

        let updated: Income = update_record(
            income.id,
            IncomeUpdate {
                source: Patch::Value("Bonus".to_owned()),
                description: Patch::Null,
                ..Default::default()
            },
            utc(),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.source, "Bonus");
        assert_eq!(updated.description, None);
        assert_eq!(updated.amount, 100);
        assert_eq!(updated.date, RecordDate::from(date!(2025 - 05 - 01)));
    }

    #[test]
    fn rejects_blank_source() {
        let connection = get_test_connection();

        let result: Result<Income, Error> = create_record(
            NewIncome {
                amount: 100,
                source: "".to_owned(),
                date: "2025-05-01".parse().unwrap(),
                description: None,
            },
            utc(),
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::Validation("source should not be empty".to_owned()))
        );
    }

    #[test]
    fn serializes_camel_case_timestamps() {
        let connection = get_test_connection();
        let income = must_create(100, "2025-05-01", &connection);

        let json = serde_json::to_value(&income).unwrap();

        assert_eq!(json["date"], "2025-05-01");
        assert_eq!(json["amount"], 100);
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
        assert!(json.get("created_at").is_none());
    }
}
