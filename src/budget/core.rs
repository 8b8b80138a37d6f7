//! Defines the core data models and database queries for budgets.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};

use crate::{Error, auth::UserId, database_id::DatabaseID};

// ============================================================================
// MODELS
// ============================================================================

/// The recurring timeframe a budget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The budget limit applies to each calendar month.
    Monthly,
    /// The budget limit applies to each calendar quarter.
    Quarterly,
    /// The budget limit applies to each calendar year.
    Yearly,
}

impl Period {
    /// All periods, in the order they should be displayed.
    pub const ALL: [Period; 3] = [Period::Monthly, Period::Quarterly, Period::Yearly];

    /// The date window the period covers as of `today`.
    ///
    /// The window starts at the first day of the current month, quarter or
    /// year, and ends at `today` (inclusive).
    pub fn window(&self, today: Date) -> RangeInclusive<Date> {
        let start = match self {
            Period::Monthly => today.replace_day(1),
            Period::Quarterly => {
                let quarter_start_month = match today.month() {
                    Month::January | Month::February | Month::March => Month::January,
                    Month::April | Month::May | Month::June => Month::April,
                    Month::July | Month::August | Month::September => Month::July,
                    Month::October | Month::November | Month::December => Month::October,
                };
                today.replace_day(1).and_then(|date| date.replace_month(quarter_start_month))
            }
            Period::Yearly => today
                .replace_day(1)
                .and_then(|date| date.replace_month(Month::January)),
        };

        // replace_day(1) and replacing with a 31 day month's start cannot fail.
        let start = start.unwrap_or(today);

        start..=today
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Monthly => write!(f, "monthly"),
            Period::Quarterly => write!(f, "quarterly"),
            Period::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Period::Monthly),
            "quarterly" => Ok(Period::Quarterly),
            "yearly" => Ok(Period::Yearly),
            _ => Err(Error::InvalidPeriod(s.to_owned())),
        }
    }
}

impl ToSql for Period {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Period {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A spending limit for a category over a recurring period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseID,
    /// The ID of the user who owns the budget.
    pub user_id: UserId,
    /// The category of spending the budget limits, e.g. "groceries".
    pub category: String,
    /// The spending limit for the period.
    pub amount: f64,
    /// The recurring timeframe the limit applies to.
    pub period: Period,
    /// When the budget was created. Set by the store on creation.
    pub created_at: OffsetDateTime,
    /// When the budget was last modified. Bumped by the store on every update.
    pub updated_at: OffsetDateTime,
}

/// The data needed to create a [Budget].
///
/// Each user can have at most one budget per category and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    /// The ID of the user who owns the budget.
    pub user_id: UserId,
    /// The category of spending the budget limits, e.g. "groceries".
    pub category: String,
    /// The spending limit for the period.
    pub amount: f64,
    /// The recurring timeframe the limit applies to.
    pub period: Period,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new budget in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the user already has a budget for the category and period,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(
            "INSERT INTO budget (user_id, category, amount, period, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, category, amount, period, created_at, updated_at",
        )?
        .query_row(
            (
                budget.user_id.as_i64(),
                &budget.category,
                budget.amount,
                budget.period,
                now,
                now,
            ),
            map_budget_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateBudget(budget.category.clone()),
            error => error.into(),
        })
}

/// Retrieve a budget owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_budget(
    id: DatabaseID,
    user_id: UserId,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "SELECT id, user_id, category, amount, period, created_at, updated_at
             FROM budget WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve all budgets owned by `user_id`, optionally restricted to `period`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is a SQL error.
pub fn get_budgets(
    user_id: UserId,
    period: Option<Period>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    match period {
        Some(period) => connection
            .prepare(
                "SELECT id, user_id, category, amount, period, created_at, updated_at
                 FROM budget WHERE user_id = :user_id AND period = :period
                 ORDER BY category ASC",
            )?
            .query_map(
                rusqlite::named_params! {":user_id": user_id.as_i64(), ":period": period},
                map_budget_row,
            )?
            .map(|maybe_budget| maybe_budget.map_err(Error::SqlError))
            .collect(),
        None => connection
            .prepare(
                "SELECT id, user_id, category, amount, period, created_at, updated_at
                 FROM budget WHERE user_id = :user_id
                 ORDER BY period ASC, category ASC",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
            .map(|maybe_budget| maybe_budget.map_err(Error::SqlError))
            .collect(),
    }
}

/// Overwrite the stored budget with the same ID as `budget`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the update would duplicate another budget's category and period,
/// - [Error::UpdateMissingBudget] if the budget does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_budget(budget: &Budget, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE budget SET category = ?1, amount = ?2, period = ?3, updated_at = ?4
             WHERE id = ?5 AND user_id = ?6",
            (
                &budget.category,
                budget.amount,
                budget.period,
                OffsetDateTime::now_utc(),
                budget.id,
                budget.user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateBudget(budget.category.clone()),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete the budget with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if the budget does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_budget(id: DatabaseID, user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                period TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, category, period)
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Budget.
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let period = row.get(4)?;
    let created_at = row.get(5)?;
    let updated_at = row.get(6)?;

    Ok(Budget {
        id,
        user_id: UserId::new(user_id),
        category,
        amount,
        period,
        created_at,
        updated_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
