//! Defines the core data model and database queries for transaction categories.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserId, database_id::DatabaseID, transaction::TransactionKind};

/// The expense categories each new user starts with.
pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 10] = [
    "groceries",
    "shopping",
    "dining",
    "transportation",
    "home",
    "entertainment",
    "bills",
    "health",
    "education",
    "other",
];

/// The income categories each new user starts with.
pub const DEFAULT_INCOME_CATEGORIES: [&str; 6] = [
    "salary",
    "freelance",
    "investments",
    "gifts",
    "refunds",
    "other",
];

/// A name that transactions can be grouped under, e.g. "groceries".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: DatabaseID,
    /// The ID of the user who owns the category.
    pub user_id: UserId,
    /// The name of the category.
    pub name: String,
    /// Whether the category applies to income or expense transactions.
    pub kind: TransactionKind,
}

/// Create a new category for `user_id`.
///
/// Creating a category the user already has returns the existing row, so the
/// operation is safe to repeat.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if `name` is empty or only whitespace,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: &str,
    kind: TransactionKind,
    user_id: UserId,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyCategoryName);
    }

    connection.execute(
        "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, name, kind) DO NOTHING",
        (user_id.as_i64(), name, kind),
    )?;

    let category = connection
        .prepare(
            "SELECT id, user_id, name, kind FROM category
             WHERE user_id = ?1 AND name = ?2 AND kind = ?3",
        )?
        .query_row((user_id.as_i64(), name, kind), map_category_row)?;

    Ok(category)
}

/// Create the standard set of income and expense categories for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is a SQL error.
pub fn create_default_categories(user_id: UserId, connection: &Connection) -> Result<(), Error> {
    for name in DEFAULT_EXPENSE_CATEGORIES {
        create_category(name, TransactionKind::Expense, user_id, connection)?;
    }

    for name in DEFAULT_INCOME_CATEGORIES {
        create_category(name, TransactionKind::Income, user_id, connection)?;
    }

    Ok(())
}

/// Retrieve all of the categories owned by `user_id`, expenses before income,
/// each sorted by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is a SQL error.
pub fn get_categories(user_id: UserId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind FROM category
             WHERE user_id = :user_id
             ORDER BY kind DESC, name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::SqlError))
        .collect()
}

/// Delete the category with `id` owned by `user_id`.
///
/// Transactions keep their category name after the category is deleted.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the category does not exist,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_category(
    id: DatabaseID,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, name, kind)
                )",
        (),
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let name = row.get(2)?;
    let kind = row.get(3)?;

    Ok(Category {
        id,
        user_id: UserId::new(user_id),
        name,
        kind,
    })
}
