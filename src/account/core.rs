//! Defines the core data model and database queries for accounts.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserId, database_id::DatabaseID};

/// A bank account or credit card that transactions can be recorded against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: DatabaseID,
    /// The ID of the user who owns the account.
    pub user_id: UserId,
    /// The name of the account, e.g. "Everyday Checking".
    pub name: String,
    /// The current balance of the account.
    pub balance: f64,
    /// When the balance was last updated.
    pub date: Date,
}

/// Create a new account for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountName] if the user already has an account called `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    name: &str,
    balance: f64,
    date: Date,
    user_id: UserId,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "INSERT INTO account (user_id, name, balance, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, balance, date",
        )?
        .query_row((user_id.as_i64(), name, balance, date), map_account_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(name.to_owned()),
            error => error.into(),
        })
}

/// Retrieve an account owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_account(
    id: DatabaseID,
    user_id: UserId,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, user_id, name, balance, date
             FROM account WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_account_row,
        )?;

    Ok(account)
}

/// Retrieve all accounts owned by `user_id`, sorted by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is a SQL error.
pub fn get_accounts(user_id: UserId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance, date
             FROM account WHERE user_id = :user_id ORDER BY name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(Error::SqlError))
        .collect()
}

/// Overwrite the stored account with the same ID as `account`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountName] if the new name clashes with another account,
/// - [Error::UpdateMissingAccount] if the account does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_account(account: &Account, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE account SET name = ?1, balance = ?2, date = ?3
             WHERE id = ?4 AND user_id = ?5",
            (
                &account.name,
                account.balance,
                account.date,
                account.id,
                account.user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(account.name.clone()),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Delete the account with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingAccount] if the account does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_account(
    id: DatabaseID,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}

/// Get the total balance across all of the accounts owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is a SQL error.
pub fn get_total_account_balance(user_id: UserId, connection: &Connection) -> Result<f64, Error> {
    let total = connection
        .prepare("SELECT COALESCE(SUM(balance), 0) FROM account WHERE user_id = :user_id")?
        .query_row(&[(":user_id", &user_id.as_i64())], |row| row.get(0))?;

    Ok(total)
}

/// Create the account table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            balance REAL NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(user_id, name)
        )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an Account.
pub fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let name = row.get(2)?;
    let balance = row.get(3)?;
    let date = row.get(4)?;

    Ok(Account {
        id,
        user_id: UserId::new(user_id),
        name,
        balance,
        date,
    })
}
