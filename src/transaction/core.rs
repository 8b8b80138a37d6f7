//! Defines the core data models and database queries for transactions.

use std::{fmt, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserId, database_id::DatabaseID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in or takes money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. salary.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidTransactionKind(s.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The ID of the user who owns the transaction.
    pub user_id: UserId,
    /// The ID of the account the transaction belongs to, if any.
    pub account_id: Option<DatabaseID>,
    /// The ID of the budget the transaction counts towards, if any.
    pub budget_id: Option<DatabaseID>,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category of the transaction, e.g. "groceries", "salary".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded. Set by the store on creation.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserId,
        amount: f64,
        kind: TransactionKind,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            amount,
            kind,
            category: category.to_owned(),
            date,
            description: String::new(),
            account_id: None,
            budget_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to empty/none. Stores validate the builder and
/// assign the ID when the transaction is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// The ID of the user who owns the transaction.
    pub user_id: UserId,
    /// The monetary amount of the transaction.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category of the transaction, e.g. "groceries", "salary".
    pub category: String,
    /// The date when the transaction occurred.
    ///
    /// The date must not be in the future.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub description: String,
    /// The ID of the account the transaction belongs to, if any.
    pub account_id: Option<DatabaseID>,
    /// The ID of the budget the transaction counts towards, if any.
    pub budget_id: Option<DatabaseID>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the account id for the transaction.
    pub fn account_id(mut self, account_id: Option<DatabaseID>) -> Self {
        self.account_id = account_id;
        self
    }

    /// Set the budget id for the transaction.
    pub fn budget_id(mut self, budget_id: Option<DatabaseID>) -> Self {
        self.budget_id = budget_id;
        self
    }

    /// Check that the builder describes a valid transaction.
    ///
    /// # Errors
    /// Returns an [Error::FutureDate] if the date is after today.
    pub fn validate(&self) -> Result<(), Error> {
        if self.date > OffsetDateTime::now_utc().date() {
            return Err(Error::FutureDate(self.date));
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// Dates must be no later than today.
///
/// # Errors
/// This function will return a:
/// - [Error::FutureDate] if the builder's date is in the future,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                 (user_id, account_id, budget_id, amount, kind, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, user_id, account_id, budget_id, amount, kind, category, description, date, created_at",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.account_id,
                builder.budget_id,
                builder.amount,
                builder.kind,
                &builder.category,
                &builder.description,
                builder.date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: DatabaseID,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, account_id, budget_id, amount, kind, category, description, date, created_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Overwrite the stored transaction with the same ID as `transaction`.
///
/// # Errors
/// This function will return a:
/// - [Error::FutureDate] if the transaction's date is in the future,
/// - [Error::UpdateMissingTransaction] if the transaction does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    if transaction.date > OffsetDateTime::now_utc().date() {
        return Err(Error::FutureDate(transaction.date));
    }

    // created_at records when the transaction was first stored, so updates
    // leave it alone.
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET account_id = ?1, budget_id = ?2, amount = ?3, kind = ?4, category = ?5,
             description = ?6, date = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            transaction.account_id,
            transaction.budget_id,
            transaction.amount,
            transaction.kind,
            &transaction.category,
            &transaction.description,
            transaction.date,
            transaction.id,
            transaction.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the transaction does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: DatabaseID,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                account_id INTEGER,
                budget_id INTEGER,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite index used by the transactions page and the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let account_id = row.get(2)?;
    let budget_id = row.get(3)?;
    let amount = row.get(4)?;
    let kind = row.get(5)?;
    let category = row.get(6)?;
    let description = row.get(7)?;
    let date = row.get(8)?;
    let created_at = row.get(9)?;

    Ok(Transaction {
        id,
        user_id: UserId::new(user_id),
        account_id,
        budget_id,
        amount,
        kind,
        category,
        description,
        date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod transaction_kind_tests {
    use std::str::FromStr;

    use crate::Error;

    use super::TransactionKind;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            let round_tripped = TransactionKind::from_str(&kind.to_string());

            assert_eq!(round_tripped, Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let got = TransactionKind::from_str("transfer");

        assert_eq!(
            got,
            Err(Error::InvalidTransactionKind("transfer".to_owned()))
        );
    }
}
