//! Defines the expense record and its database table.

use std::{fmt, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{
    Error, endpoints,
    record::{Cents, Patch, Record, RecordDate, RecordId, WireDate, require_text},
};

// ============================================================================
// MODELS
// ============================================================================

/// How much an expense matters, e.g. for deciding what to cut back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    #[allow(missing_docs)]
    Low,
    #[allow(missing_docs)]
    Medium,
    #[allow(missing_docs)]
    High,
}

impl Importance {
    fn as_str(self) -> &'static str {
        match self {
            Importance::Low => "Low",
            Importance::Medium => "Medium",
            Importance::High => "High",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Importance::Low),
            "Medium" => Ok(Importance::Medium),
            "High" => Ok(Importance::High),
            other => Err(Error::Validation(format!(
                "importance must be one of Low, Medium or High, got \"{other}\""
            ))),
        }
    }
}

impl ToSql for Importance {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Importance {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Money that was spent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: RecordId,
    /// The amount spent in cents.
    pub amount: Cents,
    /// What the money was spent on, e.g. "Food & Dining".
    pub category: String,
    /// When the money was spent.
    pub date: RecordDate,
    /// A free-form note.
    pub description: Option<String>,
    /// How much the expense matters.
    pub importance: Option<Importance>,
    /// Where the money was spent, e.g. "Grocery Store".
    pub location: Option<String>,
    /// When the expense was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the expense was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The payload for creating an [Expense].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// The amount spent in cents.
    pub amount: Cents,
    /// What the money was spent on.
    pub category: String,
    /// When the money was spent.
    pub date: WireDate,
    /// A free-form note.
    #[serde(default)]
    pub description: Option<String>,
    /// How much the expense matters.
    #[serde(default)]
    pub importance: Option<Importance>,
    /// Where the money was spent.
    #[serde(default)]
    pub location: Option<String>,
}

/// The payload for partially updating an [Expense].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[allow(missing_docs)]
    pub amount: Patch<Cents>,
    #[allow(missing_docs)]
    pub category: Patch<String>,
    #[allow(missing_docs)]
    pub date: Patch<WireDate>,
    #[allow(missing_docs)]
    pub description: Patch<String>,
    #[allow(missing_docs)]
    pub importance: Patch<Importance>,
    #[allow(missing_docs)]
    pub location: Patch<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

impl Record for Expense {
    type New = NewExpense;
    type Update = ExpenseUpdate;

    const NAME: &'static str = "Expense";
    const TABLE: &'static str = "expense";
    const COLUMNS: &'static str =
        "id, amount, category, date, description, importance, location, created_at, updated_at";

    const COLLECTION_ENDPOINT: &'static str = endpoints::EXPENSES;
    const DATE_RANGE_ENDPOINT: &'static str = endpoints::EXPENSES_DATE_RANGE;
    const RECORD_ENDPOINT: &'static str = endpoints::EXPENSE;

    const TITLE: &'static str = "Expenses";
    const LABEL_NAME: &'static str = "Category";
    const DETAIL_HEADERS: &'static [&'static str] = &["Location", "Description", "Importance"];

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
        &self.category
    }

    fn detail_cells(&self) -> Vec<String> {
        vec![
            self.location.clone().unwrap_or_default(),
            self.description.clone().unwrap_or_default(),
            self.importance
                .map(|importance| importance.to_string())
                .unwrap_or_default(),
        ]
    }

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            category: row.get(2)?,
            date: row.get(3)?,
            description: row.get(4)?,
            importance: row.get(5)?,
            location: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn build(
        new: NewExpense,
        id: RecordId,
        created_at: OffsetDateTime,
        timezone: &Tz,
    ) -> Result<Self, Error> {
        Ok(Self {
            id,
            amount: new.amount,
            category: require_text("category", new.category)?,
            date: RecordDate::new(new.date.to_local(timezone)),
            description: new.description,
            importance: new.importance,
            location: new.location,
            created_at,
            updated_at: created_at,
        })
    }

    fn apply_update(&mut self, update: ExpenseUpdate, timezone: &Tz) -> Result<(), Error> {
        update.amount.apply_required("amount", &mut self.amount)?;
        update
            .category
            .try_map(|category| require_text("category", category))?
            .apply_required("category", &mut self.category)?;
        update
            .date
            .try_map(|date| Ok(RecordDate::new(date.to_local(timezone))))?
            .apply_required("date", &mut self.date)?;
        update.description.apply_optional(&mut self.description);
        update.importance.apply_optional(&mut self.importance);
        update.location.apply_optional(&mut self.location);

        Ok(())
    }

    fn touch(&mut self, updated_at: OffsetDateTime) {
        self.updated_at = updated_at;
    }

    fn insert(&self, connection: &Connection) -> Result<Self, rusqlite::Error> {
        connection
            .prepare(&format!(
                "INSERT INTO expense (id, amount, category, date, description, importance, location, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 RETURNING {}",
                Self::COLUMNS
            ))?
            .query_row(
                (
                    self.id,
                    self.amount,
                    &self.category,
                    self.date,
                    &self.description,
                    self.importance,
                    &self.location,
                    self.created_at,
                    self.updated_at,
                ),
                Self::map_row,
            )
    }

    fn save(&self, connection: &Connection) -> Result<Self, rusqlite::Error> {
        connection
            .prepare(&format!(
                "UPDATE expense
                 SET amount = ?2, category = ?3, date = ?4, description = ?5,
                     importance = ?6, location = ?7, updated_at = ?8
                 WHERE id = ?1
                 RETURNING {}",
                Self::COLUMNS
            ))?
            .query_row(
                (
                    self.id,
                    self.amount,
                    &self.category,
                    self.date,
                    &self.description,
                    self.importance,
                    &self.location,
                    self.updated_at,
                ),
                Self::map_row,
            )
    }
}
