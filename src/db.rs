//! Creates the database tables for the application.

use rusqlite::Connection;

use crate::{
    account::create_account_table, auth::create_user_table, budget::create_budget_table,
    category::create_category_table, transaction::create_transaction_table,
};

/// Create the tables for all of the application's models.
///
/// Tables are only created if they do not already exist, so it is safe to call
/// this on every server start.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_user_table(connection)?;
    create_account_table(connection)?;
    create_category_table(connection)?;
    // The transaction table references the budget table, so budgets come first.
    create_budget_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).expect("Could not initialise database");

        assert_eq!(Ok(()), initialize(&connection));
    }
}
