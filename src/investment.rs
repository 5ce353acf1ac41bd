//! Defines the investment record and its database table.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    Error, endpoints,
    record::{Cents, Patch, Record, RecordDate, RecordId, WireDate, require_text},
};

/// Money that was put into an investment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    /// The ID of the investment.
    pub id: RecordId,
    /// The amount invested in cents.
    pub amount: Cents,
    /// The kind of investment, e.g. "Index Fund".
    #[serde(rename = "type")]
    pub investment_type: String,
    /// When the money was invested.
    pub date: RecordDate,
    /// A free-form note.
    pub description: Option<String>,
    /// When the investment was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the investment was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The payload for creating an [Investment].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewInvestment {
    /// The amount invested in cents.
    pub amount: Cents,
    /// The kind of investment.
    #[serde(rename = "type")]
    pub investment_type: String,
    /// When the money was invested.
    pub date: WireDate,
    /// A free-form note.
    #[serde(default)]
    pub description: Option<String>,
}

/// The payload for partially updating an [Investment].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InvestmentUpdate {
    #[allow(missing_docs)]
    pub amount: Patch<Cents>,
    #[allow(missing_docs)]
    #[serde(rename = "type")]
    pub investment_type: Patch<String>,
    #[allow(missing_docs)]
    pub date: Patch<WireDate>,
    #[allow(missing_docs)]
    pub description: Patch<String>,
}

impl Record for Investment {
    type New = NewInvestment;
    type Update = InvestmentUpdate;

    const NAME: &'static str = "Investment";
    const TABLE: &'static str = "investment";
    const COLUMNS: &'static str = "id, amount, type, date, description, created_at, updated_at";

    const COLLECTION_ENDPOINT: &'static str = endpoints::INVESTMENTS;
    const DATE_RANGE_ENDPOINT: &'static str = endpoints::INVESTMENTS_DATE_RANGE;
    const RECORD_ENDPOINT: &'static str = endpoints::INVESTMENT;

    const TITLE: &'static str = "Investments";
    const LABEL_NAME: &'static str = "Type";
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
        &self.investment_type
    }

    fn detail_cells(&self) -> Vec<String> {
        vec![self.description.clone().unwrap_or_default()]
    }

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            investment_type: row.get(2)?,
            date: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn build(
        new: NewInvestment,
        id: RecordId,
        created_at: OffsetDateTime,
        timezone: &Tz,
    ) -> Result<Self, Error> {
        Ok(Self {
            id,
            amount: new.amount,
            investment_type: require_text("type", new.investment_type)?,
            date: RecordDate::new(new.date.to_local(timezone)),
            description: new.description,
            created_at,
            updated_at: created_at,
        })
    }

    fn apply_update(&mut self, update: InvestmentUpdate, timezone: &Tz) -> Result<(), Error> {
        update.amount.apply_required("amount", &mut self.amount)?;
        update
            .investment_type
            .try_map(|investment_type| require_text("type", investment_type))?
            .apply_required("type", &mut self.investment_type)?;
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
                "INSERT INTO investment (id, amount, type, date, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {}",
                Self::COLUMNS
            ))?
            .query_row(
                (
                    self.id,
                    self.amount,
                    &self.investment_type,
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
                "UPDATE investment
                 SET amount = ?2, type = ?3, date = ?4, description = ?5, updated_at = ?6
                 WHERE id = ?1
                 RETURNING {}",
                Self::COLUMNS
            ))?
            .query_row(
                (
                    self.id,
                    self.amount,
                    &self.investment_type,
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
        initialize_db,
        investment::{Investment, InvestmentUpdate, NewInvestment},
        record::{RecordDate, create_record, get_record, list_records, update_record},
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

    #[test]
    fn type_field_uses_json_name() {
        let new: NewInvestment = serde_json::from_str(
            r#"{"amount": 25000, "type": "Index Fund", "date": "2025-05-15"}"#,
        )
        .unwrap();
        let connection = get_test_connection();

        let investment: Investment = create_record(new, utc(), &connection).unwrap();
        let json = serde_json::to_value(&investment).unwrap();

        assert_eq!(json["type"], "Index Fund");
        assert!(json.get("investmentType").is_none());
        assert_eq!(
            get_record::<Investment>(investment.id, &connection),
            Ok(investment)
        );
    }

    #[test]
    fn missing_type_is_rejected() {
        let result =
            serde_json::from_str::<NewInvestment>(r#"{"amount": 25000, "date": "2025-05-15"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn update_type_and_date() {
        let connection = get_test_connection();
        let investment: Investment = create_record(
            NewInvestment {
                amount: 25000,
                investment_type: "Index Fund".to_owned(),
                date: "2025-05-15".parse().unwrap(),
                description: None,
            },
            utc(),
            &connection,
        )
        .unwrap();
        let update: InvestmentUpdate =
            serde_json::from_str(r#"{"type": "Bonds", "date": "2025-06-01"}"#).unwrap();

        let updated: Investment = update_record(investment.id, update, utc(), &connection).unwrap();

        assert_eq!(updated.investment_type, "Bonds");
        assert_eq!(updated.date, RecordDate::from(date!(2025 - 06 - 01)));
        assert_eq!(updated.amount, 25000);
    }

    #[test]
    fn null_type_is_rejected() {
        let connection = get_test_connection();
        let investment: Investment = create_record(
            NewInvestment {
                amount: 25000,
                investment_type: "Shares".to_owned(),
                date: "2025-05-15".parse().unwrap(),
                description: None,
            },
            utc(),
            &connection,
        )
        .unwrap();
        let update: InvestmentUpdate = serde_json::from_str(r#"{"type": null}"#).unwrap();

        let result: Result<Investment, Error> =
            update_record(investment.id, update, utc(), &connection);

        assert_eq!(
            result,
            Err(Error::Validation("type cannot be null".to_owned()))
        );
        assert_eq!(list_records::<Investment>(&connection).unwrap().items, vec![investment]);
    }
}
