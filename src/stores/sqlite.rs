//! Implements the SQLite backed transaction and budget stores.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{
    Error,
    auth::UserId,
    budget::{
        Budget, NewBudget, Period, create_budget, delete_budget, get_budget, get_budgets,
        update_budget,
    },
    database_id::DatabaseID,
    stores::{
        BudgetStore, Connectivity, TransactionStore,
        transaction::{SortOrder, TransactionQuery},
    },
    transaction::{
        Transaction, TransactionBuilder, create_transaction, delete_transaction, get_transaction,
        map_transaction_row, update_transaction,
    },
};

fn is_available(connection: &Arc<Mutex<Connection>>) -> bool {
    let Ok(connection) = connection.lock() else {
        return false;
    };

    connection
        .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .is_ok()
}

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl TransactionStore for SqliteTransactionStore {
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        create_transaction(builder, &*self.lock()?)
    }

    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Transaction, Error> {
        get_transaction(id, user_id, &*self.lock()?)
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![
            "SELECT id, user_id, account_id, budget_id, amount, kind, category, description, \
             date, created_at FROM \"transaction\""
                .to_string(),
        ];
        let (where_clause, query_parameters) = build_where_clause(query);
        query_string_parts.push(where_clause);

        match query.sort_date {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY date ASC, id ASC".to_string())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY date DESC, id DESC".to_string())
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            query_string_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.lock()?
            .prepare(&query_string)?
            .query_map(params, map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
        update_transaction(transaction, &*self.lock()?)
    }

    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error> {
        delete_transaction(id, user_id, &*self.lock()?)
    }

    fn count(&self, query: &TransactionQuery) -> Result<usize, Error> {
        let (where_clause, query_parameters) = build_where_clause(query);
        let query_string = format!("SELECT COUNT(id) FROM \"transaction\" {where_clause}");
        let params = params_from_iter(query_parameters.iter());

        self.lock()?
            .query_row(&query_string, params, |row| row.get::<_, i64>(0))
            .map(|count| count as usize)
            .map_err(|error| error.into())
    }
}

fn build_where_clause(query: &TransactionQuery) -> (String, Vec<Value>) {
    let mut where_clause_parts = vec!["user_id = ?1".to_string()];
    let mut query_parameters = vec![Value::Integer(query.user_id.as_i64())];

    if let Some(date_range) = &query.date_range {
        where_clause_parts.push(format!(
            "date BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(category) = &query.category {
        where_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(category.clone()));
    }

    if let Some(kind) = query.kind {
        where_clause_parts.push(format!("kind = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(kind.to_string()));
    }

    if let Some(budget_id) = query.budget_id {
        where_clause_parts.push(format!("budget_id = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Integer(budget_id));
    }

    (
        String::from("WHERE ") + &where_clause_parts.join(" AND "),
        query_parameters,
    )
}

impl Connectivity for SqliteTransactionStore {
    fn is_available(&self) -> bool {
        is_available(&self.connection)
    }
}

/// Stores budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl BudgetStore for SqliteBudgetStore {
    fn create(&mut self, budget: NewBudget) -> Result<Budget, Error> {
        create_budget(budget, &*self.lock()?)
    }

    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Budget, Error> {
        get_budget(id, user_id, &*self.lock()?)
    }

    fn get_for_user(&self, user_id: UserId, period: Option<Period>) -> Result<Vec<Budget>, Error> {
        get_budgets(user_id, period, &*self.lock()?)
    }

    fn update(&mut self, budget: &Budget) -> Result<(), Error> {
        update_budget(budget, &*self.lock()?)
    }

    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error> {
        delete_budget(id, user_id, &*self.lock()?)
    }
}

impl Connectivity for SqliteBudgetStore {
    fn is_available(&self) -> bool {
        is_available(&self.connection)
    }
}

#[cfg(test)]
mod sqlite_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::UserId,
        budget::{NewBudget, Period, create_budget},
        db::initialize,
        stores::{
            Connectivity, SortOrder, TransactionQuery, TransactionStore,
            sqlite::SqliteTransactionStore,
        },
        transaction::{Transaction, TransactionKind},
    };

    fn get_test_store() -> SqliteTransactionStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SqliteTransactionStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn store_is_available() {
        let store = get_test_store();

        assert!(store.is_available());
    }

    #[test]
    fn get_query_filters_and_sorts() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        store
            .create(Transaction::build(
                user_id,
                10.0,
                TransactionKind::Expense,
                "groceries",
                date!(2025 - 08 - 10),
            ))
            .unwrap();
        store
            .create(Transaction::build(
                user_id,
                20.0,
                TransactionKind::Expense,
                "dining",
                date!(2025 - 08 - 12),
            ))
            .unwrap();
        store
            .create(Transaction::build(
                user_id,
                4000.0,
                TransactionKind::Income,
                "salary",
                date!(2025 - 08 - 01),
            ))
            .unwrap();

        let expenses = store
            .get_query(
                &TransactionQuery::for_user(user_id)
                    .kind(TransactionKind::Expense)
                    .sort_date(SortOrder::Descending),
            )
            .unwrap();

        let categories: Vec<&str> = expenses
            .iter()
            .map(|transaction| transaction.category.as_str())
            .collect();
        assert_eq!(categories, ["dining", "groceries"]);
    }

    #[test]
    fn get_query_filters_by_budget() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = UserId::new(1);
        let budget = create_budget(
            NewBudget {
                user_id,
                category: "groceries".to_owned(),
                amount: 500.0,
                period: Period::Monthly,
            },
            &connection,
        )
        .unwrap();
        let mut store = SqliteTransactionStore::new(Arc::new(Mutex::new(connection)));
        store
            .create(
                Transaction::build(
                    user_id,
                    10.0,
                    TransactionKind::Expense,
                    "groceries",
                    date!(2025 - 08 - 10),
                )
                .budget_id(Some(budget.id)),
            )
            .unwrap();
        store
            .create(Transaction::build(
                user_id,
                20.0,
                TransactionKind::Expense,
                "dining",
                date!(2025 - 08 - 11),
            ))
            .unwrap();

        let linked = store
            .get_query(&TransactionQuery::for_user(user_id).budget_id(budget.id))
            .unwrap();

        assert_eq!(linked.len(), 1, "want 1 linked transaction, got {}", linked.len());
        assert_eq!(linked[0].category, "groceries");
        assert_eq!(linked[0].budget_id, Some(budget.id));
    }

    #[test]
    fn count_ignores_limit() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        for day in 1..=5 {
            store
                .create(Transaction::build(
                    user_id,
                    1.0,
                    TransactionKind::Expense,
                    "groceries",
                    date!(2025 - 08 - 01).replace_day(day).unwrap(),
                ))
                .unwrap();
        }

        let count = store
            .count(&TransactionQuery::for_user(user_id).page(2, 0))
            .unwrap();

        assert_eq!(count, 5);
    }
}
