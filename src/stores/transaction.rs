//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    auth::UserId,
    database_id::DatabaseID,
    transaction::{Transaction, TransactionBuilder, TransactionKind},
};

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve a transaction owned by `user_id` from the store.
    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Transaction, Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Overwrite the stored transaction with the same ID as `transaction`.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error>;

    /// Remove the transaction with `id` owned by `user_id` from the store.
    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error>;

    /// Count the transactions matching `query`, ignoring its limit and offset.
    fn count(&self, query: &TransactionQuery) -> Result<usize, Error>;
}

/// Defines which transactions to fetch from [TransactionStore::get_query].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Include only transactions owned by this user.
    pub user_id: UserId,
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only transactions with this category.
    pub category: Option<String>,
    /// Include only income or only expense transactions.
    pub kind: Option<TransactionKind>,
    /// Include only transactions counted towards this budget.
    pub budget_id: Option<DatabaseID>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Skips the first `offset` transactions.
    pub offset: u64,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

impl TransactionQuery {
    /// A query matching all of the transactions owned by `user_id`.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            date_range: None,
            category: None,
            kind: None,
            budget_id: None,
            limit: None,
            offset: 0,
            sort_date: None,
        }
    }

    /// Restrict the query to `date_range` (inclusive).
    pub fn date_range(mut self, date_range: RangeInclusive<Date>) -> Self {
        self.date_range = Some(date_range);
        self
    }

    /// Restrict the query to transactions with `category`.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Restrict the query to transactions of `kind`.
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict the query to transactions counted towards `budget_id`.
    pub fn budget_id(mut self, budget_id: DatabaseID) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    /// Select up to `limit` transactions starting from `offset`.
    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Order the selected transactions by date.
    pub fn sort_date(mut self, order: SortOrder) -> Self {
        self.sort_date = Some(order);
        self
    }

    /// Whether `transaction` matches the query's filters.
    ///
    /// Ignores the limit, offset and sort order.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if transaction.user_id != self.user_id {
            return false;
        }

        if let Some(date_range) = &self.date_range
            && !date_range.contains(&transaction.date)
        {
            return false;
        }

        if let Some(category) = &self.category
            && transaction.category != *category
        {
            return false;
        }

        if let Some(kind) = self.kind
            && transaction.kind != kind
        {
            return false;
        }

        if let Some(budget_id) = self.budget_id
            && transaction.budget_id != Some(budget_id)
        {
            return false;
        }

        true
    }
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

#[cfg(test)]
mod transaction_query_tests {
    use time::{OffsetDateTime, macros::date};

    use crate::{
        auth::UserId,
        transaction::{Transaction, TransactionKind},
    };

    use super::TransactionQuery;

    fn transaction() -> Transaction {
        Transaction {
            id: 1,
            user_id: UserId::new(1),
            account_id: None,
            budget_id: Some(3),
            amount: 10.0,
            kind: TransactionKind::Expense,
            category: "groceries".to_owned(),
            description: String::new(),
            date: date!(2025 - 08 - 15),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn matches_on_user() {
        let query = TransactionQuery::for_user(UserId::new(1));

        assert!(query.matches(&transaction()));
        assert!(!TransactionQuery::for_user(UserId::new(2)).matches(&transaction()));
    }

    #[test]
    fn matches_on_date_range() {
        let in_range = TransactionQuery::for_user(UserId::new(1))
            .date_range(date!(2025 - 08 - 01)..=date!(2025 - 08 - 31));
        let out_of_range = TransactionQuery::for_user(UserId::new(1))
            .date_range(date!(2025 - 07 - 01)..=date!(2025 - 07 - 31));

        assert!(in_range.matches(&transaction()));
        assert!(!out_of_range.matches(&transaction()));
    }

    #[test]
    fn matches_on_category_and_kind() {
        let matching = TransactionQuery::for_user(UserId::new(1))
            .category("groceries")
            .kind(TransactionKind::Expense);
        let wrong_category = TransactionQuery::for_user(UserId::new(1)).category("dining");
        let wrong_kind = TransactionQuery::for_user(UserId::new(1)).kind(TransactionKind::Income);

        assert!(matching.matches(&transaction()));
        assert!(!wrong_category.matches(&transaction()));
        assert!(!wrong_kind.matches(&transaction()));
    }

    #[test]
    fn matches_on_budget_id() {
        let matching = TransactionQuery::for_user(UserId::new(1)).budget_id(3);
        let wrong_budget = TransactionQuery::for_user(UserId::new(1)).budget_id(4);
        let unlinked = Transaction {
            budget_id: None,
            ..transaction()
        };

        assert!(matching.matches(&transaction()));
        assert!(!wrong_budget.matches(&transaction()));
        assert!(!matching.matches(&unlinked));
    }
}
