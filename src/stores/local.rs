//! Implements the local JSON blob backed transaction and budget stores.
//!
//! The blob is a string-keyed map of JSON arrays kept in memory and persisted
//! to a single file on a best-effort basis. Reads and writes never fail with
//! anything other than not-found style errors, which is what makes the local
//! stores usable as a fallback when the database is down.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserId,
    budget::{Budget, NewBudget, Period},
    database_id::DatabaseID,
    stores::{
        BudgetStore, TransactionStore,
        transaction::{SortOrder, TransactionQuery},
    },
    transaction::{Transaction, TransactionBuilder},
};

/// The blob key the local transaction store persists under.
pub const TRANSACTIONS_KEY: &str = "budget_tracker_transactions";

/// The blob key the local budget store persists under.
pub const BUDGETS_KEY: &str = "budget_tracker_budgets";

/// A string-keyed map of JSON arrays persisted to a single file.
///
/// All writes update the in-memory map first and then write the file. A file
/// write failure is logged and otherwise ignored, so the storage keeps working
/// (without persistence) on a read-only disk.
#[derive(Debug)]
pub struct LocalBlobStorage {
    path: Option<PathBuf>,
    entries: HashMap<String, serde_json::Value>,
}

impl LocalBlobStorage {
    /// Open the blob file at `path`, creating the state for a new blob if the
    /// file does not exist or cannot be parsed.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|error| {
                tracing::warn!(
                    "Could not parse local storage file {}: {error}. Starting empty.",
                    path.display()
                );
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path: Some(path),
            entries,
        }
    }

    /// Create a blob that lives in memory only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: HashMap::new(),
        }
    }

    /// Read the array stored under `key`.
    ///
    /// A missing or malformed entry reads as an empty list.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(value) = self.entries.get(key) else {
            return Vec::new();
        };

        serde_json::from_value(value.clone()).unwrap_or_else(|error| {
            tracing::warn!("Could not parse local storage entry {key}: {error}");
            Vec::new()
        })
    }

    /// Replace the array stored under `key` and persist the blob.
    pub fn write<T: Serialize>(&mut self, key: &str, items: &[T]) {
        let value = match serde_json::to_value(items) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!("Could not serialize local storage entry {key}: {error}");
                return;
            }
        };
        self.entries.insert(key.to_owned(), value);

        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let contents = match serde_json::to_string(&self.entries) {
            Ok(contents) => contents,
            Err(error) => {
                tracing::error!("Could not serialize local storage blob: {error}");
                return;
            }
        };

        if let Err(error) = fs::write(path, contents) {
            tracing::warn!(
                "Could not write local storage file {}: {error}",
                path.display()
            );
        }
    }
}

fn next_id<'a, I: Iterator<Item = &'a DatabaseID>>(ids: I) -> DatabaseID {
    ids.max().copied().unwrap_or(0) + 1
}

/// Stores transactions in a [LocalBlobStorage] blob.
#[derive(Debug, Clone)]
pub struct LocalTransactionStore {
    storage: Arc<Mutex<LocalBlobStorage>>,
}

impl LocalTransactionStore {
    /// Create a new store backed by `storage`.
    pub fn new(storage: Arc<Mutex<LocalBlobStorage>>) -> Self {
        Self { storage }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LocalBlobStorage>, Error> {
        self.storage.lock().map_err(|error| {
            tracing::error!("Could not acquire local storage lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl TransactionStore for LocalTransactionStore {
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        builder.validate()?;

        let mut storage = self.lock()?;
        let mut transactions: Vec<Transaction> = storage.read(TRANSACTIONS_KEY);

        let transaction = Transaction {
            id: next_id(transactions.iter().map(|transaction| &transaction.id)),
            user_id: builder.user_id,
            account_id: builder.account_id,
            budget_id: builder.budget_id,
            amount: builder.amount,
            kind: builder.kind,
            category: builder.category,
            description: builder.description,
            date: builder.date,
            created_at: OffsetDateTime::now_utc(),
        };
        transactions.push(transaction.clone());
        storage.write(TRANSACTIONS_KEY, &transactions);

        Ok(transaction)
    }

    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Transaction, Error> {
        self.lock()?
            .read::<Transaction>(TRANSACTIONS_KEY)
            .into_iter()
            .find(|transaction| transaction.id == id && transaction.user_id == user_id)
            .ok_or(Error::NotFound)
    }

    fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut transactions: Vec<Transaction> = self
            .lock()?
            .read::<Transaction>(TRANSACTIONS_KEY)
            .into_iter()
            .filter(|transaction| query.matches(transaction))
            .collect();

        match query.sort_date {
            Some(SortOrder::Ascending) => {
                transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)))
            }
            Some(SortOrder::Descending) => {
                transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)))
            }
            None => {}
        }

        let transactions = transactions
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit.unwrap_or(u64::MAX) as usize)
            .collect();

        Ok(transactions)
    }

    fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
        let mut storage = self.lock()?;
        let mut transactions: Vec<Transaction> = storage.read(TRANSACTIONS_KEY);

        let Some(stored) = transactions.iter_mut().find(|stored| {
            stored.id == transaction.id && stored.user_id == transaction.user_id
        }) else {
            return Err(Error::UpdateMissingTransaction);
        };

        *stored = transaction.clone();
        storage.write(TRANSACTIONS_KEY, &transactions);

        Ok(())
    }

    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error> {
        let mut storage = self.lock()?;
        let mut transactions: Vec<Transaction> = storage.read(TRANSACTIONS_KEY);

        let count_before = transactions.len();
        transactions
            .retain(|transaction| !(transaction.id == id && transaction.user_id == user_id));

        if transactions.len() == count_before {
            return Err(Error::DeleteMissingTransaction);
        }

        storage.write(TRANSACTIONS_KEY, &transactions);

        Ok(())
    }

    fn count(&self, query: &TransactionQuery) -> Result<usize, Error> {
        let count = self
            .lock()?
            .read::<Transaction>(TRANSACTIONS_KEY)
            .iter()
            .filter(|transaction| query.matches(transaction))
            .count();

        Ok(count)
    }
}

/// Stores budgets in a [LocalBlobStorage] blob.
#[derive(Debug, Clone)]
pub struct LocalBudgetStore {
    storage: Arc<Mutex<LocalBlobStorage>>,
}

impl LocalBudgetStore {
    /// Create a new store backed by `storage`.
    pub fn new(storage: Arc<Mutex<LocalBlobStorage>>) -> Self {
        Self { storage }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LocalBlobStorage>, Error> {
        self.storage.lock().map_err(|error| {
            tracing::error!("Could not acquire local storage lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl BudgetStore for LocalBudgetStore {
    /// Create a budget, replacing any existing budget with the same category
    /// and period so repeated creates while the database is down cannot pile
    /// up duplicate rows.
    fn create(&mut self, budget: NewBudget) -> Result<Budget, Error> {
        let mut storage = self.lock()?;
        let mut budgets: Vec<Budget> = storage.read(BUDGETS_KEY);
        let now = OffsetDateTime::now_utc();

        let existing = budgets.iter().position(|stored| {
            stored.user_id == budget.user_id
                && stored.category == budget.category
                && stored.period == budget.period
        });
        if let Some(index) = existing {
            budgets[index].amount = budget.amount;
            budgets[index].updated_at = now;
            let replaced = budgets[index].clone();
            storage.write(BUDGETS_KEY, &budgets);

            return Ok(replaced);
        }

        let budget = Budget {
            id: next_id(budgets.iter().map(|budget| &budget.id)),
            user_id: budget.user_id,
            category: budget.category,
            amount: budget.amount,
            period: budget.period,
            created_at: now,
            updated_at: now,
        };
        budgets.push(budget.clone());
        storage.write(BUDGETS_KEY, &budgets);

        Ok(budget)
    }

    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Budget, Error> {
        self.lock()?
            .read::<Budget>(BUDGETS_KEY)
            .into_iter()
            .find(|budget| budget.id == id && budget.user_id == user_id)
            .ok_or(Error::NotFound)
    }

    fn get_for_user(&self, user_id: UserId, period: Option<Period>) -> Result<Vec<Budget>, Error> {
        let mut budgets: Vec<Budget> = self
            .lock()?
            .read::<Budget>(BUDGETS_KEY)
            .into_iter()
            .filter(|budget| {
                budget.user_id == user_id
                    && period.is_none_or(|period| budget.period == period)
            })
            .collect();
        budgets.sort_by(|a, b| a.category.cmp(&b.category));

        Ok(budgets)
    }

    fn update(&mut self, budget: &Budget) -> Result<(), Error> {
        let mut storage = self.lock()?;
        let mut budgets: Vec<Budget> = storage.read(BUDGETS_KEY);

        let is_duplicate = budgets.iter().any(|stored| {
            stored.id != budget.id
                && stored.user_id == budget.user_id
                && stored.category == budget.category
                && stored.period == budget.period
        });
        if is_duplicate {
            return Err(Error::DuplicateBudget(budget.category.clone()));
        }

        let Some(stored) = budgets
            .iter_mut()
            .find(|stored| stored.id == budget.id && stored.user_id == budget.user_id)
        else {
            return Err(Error::UpdateMissingBudget);
        };

        *stored = Budget {
            updated_at: OffsetDateTime::now_utc(),
            ..budget.clone()
        };
        storage.write(BUDGETS_KEY, &budgets);

        Ok(())
    }

    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error> {
        let mut storage = self.lock()?;
        let mut budgets: Vec<Budget> = storage.read(BUDGETS_KEY);

        let count_before = budgets.len();
        budgets.retain(|budget| !(budget.id == id && budget.user_id == user_id));

        if budgets.len() == count_before {
            return Err(Error::DeleteMissingBudget);
        }

        storage.write(BUDGETS_KEY, &budgets);

        Ok(())
    }
}
