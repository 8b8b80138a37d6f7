//! Composes a primary store with a local fallback store.

use crate::{
    Error,
    auth::UserId,
    budget::{Budget, NewBudget, Period},
    database_id::DatabaseID,
    stores::{BudgetStore, Connectivity, TransactionStore, transaction::TransactionQuery},
    transaction::{Transaction, TransactionBuilder},
};

/// Whether an error means the primary store cannot serve requests, as opposed
/// to a domain error (duplicate, not found, validation) that the fallback
/// would report all the same.
fn is_backend_failure(error: &Error) -> bool {
    matches!(error, Error::SqlError(_) | Error::DatabaseLockError)
}

/// Whether an error means the record does not exist in the store that was
/// asked. Such calls are retried against the fallback, and the error is only
/// surfaced when both stores miss.
fn is_missing(error: &Error) -> bool {
    matches!(
        error,
        Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
    )
}

/// A store decorator that routes each call to a primary store, falling back to
/// a secondary store when the primary is unavailable.
///
/// The fallback is chosen per call: a failed call degrades that one operation,
/// not the whole session. Records that only exist in the fallback (created
/// while the primary was down) remain reachable because calls the primary
/// reports as missing are retried against the fallback.
#[derive(Debug, Clone)]
pub struct FallbackStore<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackStore<P, F> {
    /// Compose `primary` with `fallback`.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Connectivity, F> FallbackStore<P, F> {
    fn use_fallback(&self) -> bool {
        let use_fallback = !self.primary.is_available();

        if use_fallback {
            tracing::warn!("Primary store is unavailable, using the local fallback store.");
        }

        use_fallback
    }
}

fn log_downgrade(error: &Error) {
    tracing::warn!("Primary store call failed, retrying on the local fallback store: {error}");
}

impl<P, F> TransactionStore for FallbackStore<P, F>
where
    P: TransactionStore + Connectivity,
    F: TransactionStore,
{
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        if self.use_fallback() {
            return self.fallback.create(builder);
        }

        match self.primary.create(builder.clone()) {
            Err(error) if is_backend_failure(&error) => {
                log_downgrade(&error);
                self.fallback.create(builder)
            }
            result => result,
        }
    }

    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Transaction, Error> {
        if self.use_fallback() {
            return self.fallback.get(id, user_id);
        }

        match self.primary.get(id, user_id) {
            Err(error) if is_backend_failure(&error) || is_missing(&error) => {
                if is_backend_failure(&error) {
                    log_downgrade(&error);
                }
                self.fallback.get(id, user_id)
            }
            result => result,
        }
    }

    fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        if self.use_fallback() {
            return self.fallback.get_query(query);
        }

        match self.primary.get_query(query) {
            Err(error) if is_backend_failure(&error) => {
                log_downgrade(&error);
                self.fallback.get_query(query)
            }
            result => result,
        }
    }

    fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
        if self.use_fallback() {
            return self.fallback.update(transaction);
        }

        match self.primary.update(transaction) {
            Err(error) if is_backend_failure(&error) || is_missing(&error) => {
                if is_backend_failure(&error) {
                    log_downgrade(&error);
                }
                self.fallback.update(transaction).map_err(|_| error)
            }
            result => result,
        }
    }

    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error> {
        if self.use_fallback() {
            return self.fallback.delete(id, user_id);
        }

        match self.primary.delete(id, user_id) {
            Err(error) if is_backend_failure(&error) || is_missing(&error) => {
                if is_backend_failure(&error) {
                    log_downgrade(&error);
                }
                self.fallback.delete(id, user_id).map_err(|_| error)
            }
            result => result,
        }
    }

    fn count(&self, query: &TransactionQuery) -> Result<usize, Error> {
        if self.use_fallback() {
            return self.fallback.count(query);
        }

        match self.primary.count(query) {
            Err(error) if is_backend_failure(&error) => {
                log_downgrade(&error);
                self.fallback.count(query)
            }
            result => result,
        }
    }
}

impl<P, F> BudgetStore for FallbackStore<P, F>
where
    P: BudgetStore + Connectivity,
    F: BudgetStore,
{
    fn create(&mut self, budget: NewBudget) -> Result<Budget, Error> {
        if self.use_fallback() {
            return self.fallback.create(budget);
        }

        match self.primary.create(budget.clone()) {
            Err(error) if is_backend_failure(&error) => {
                log_downgrade(&error);
                self.fallback.create(budget)
            }
            result => result,
        }
    }

    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Budget, Error> {
        if self.use_fallback() {
            return self.fallback.get(id, user_id);
        }

        match self.primary.get(id, user_id) {
            Err(error) if is_backend_failure(&error) || is_missing(&error) => {
                if is_backend_failure(&error) {
                    log_downgrade(&error);
                }
                self.fallback.get(id, user_id)
            }
            result => result,
        }
    }

    fn get_for_user(&self, user_id: UserId, period: Option<Period>) -> Result<Vec<Budget>, Error> {
        if self.use_fallback() {
            return self.fallback.get_for_user(user_id, period);
        }

        match self.primary.get_for_user(user_id, period) {
            Err(error) if is_backend_failure(&error) => {
                log_downgrade(&error);
                self.fallback.get_for_user(user_id, period)
            }
            result => result,
        }
    }

    fn update(&mut self, budget: &Budget) -> Result<(), Error> {
        if self.use_fallback() {
            return self.fallback.update(budget);
        }

        match self.primary.update(budget) {
            Err(error) if is_backend_failure(&error) || is_missing(&error) => {
                if is_backend_failure(&error) {
                    log_downgrade(&error);
                }
                self.fallback.update(budget).map_err(|_| error)
            }
            result => result,
        }
    }

    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error> {
        if self.use_fallback() {
            return self.fallback.delete(id, user_id);
        }

        match self.primary.delete(id, user_id) {
            Err(error) if is_backend_failure(&error) || is_missing(&error) => {
                if is_backend_failure(&error) {
                    log_downgrade(&error);
                }
                self.fallback.delete(id, user_id).map_err(|_| error)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod fallback_store_tests {
    use std::sync::{Arc, Mutex};

    use time::macros::date;

    use crate::{
        Error,
        auth::UserId,
        stores::{
            Connectivity, TransactionQuery, TransactionStore,
            local::{LocalBlobStorage, LocalTransactionStore},
        },
        transaction::{Transaction, TransactionBuilder, TransactionKind},
    };

    use super::FallbackStore;

    /// A transaction store that can be switched between working, unreachable
    /// and erroring for tests.
    #[derive(Debug, Clone)]
    struct StubPrimary {
        inner: LocalTransactionStore,
        available: bool,
        fail_calls: bool,
    }

    impl StubPrimary {
        fn working() -> Self {
            Self {
                inner: LocalTransactionStore::new(Arc::new(Mutex::new(
                    LocalBlobStorage::in_memory(),
                ))),
                available: true,
                fail_calls: false,
            }
        }

        fn unreachable() -> Self {
            Self {
                available: false,
                ..Self::working()
            }
        }

        fn erroring() -> Self {
            Self {
                fail_calls: true,
                ..Self::working()
            }
        }

        fn fail_if_configured(&self) -> Result<(), Error> {
            if self.fail_calls {
                Err(Error::DatabaseLockError)
            } else {
                Ok(())
            }
        }
    }

    impl Connectivity for StubPrimary {
        fn is_available(&self) -> bool {
            self.available
        }
    }

    impl TransactionStore for StubPrimary {
        fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
            self.fail_if_configured()?;
            self.inner.create(builder)
        }

        fn get(&self, id: i64, user_id: UserId) -> Result<Transaction, Error> {
            self.fail_if_configured()?;
            self.inner.get(id, user_id)
        }

        fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
            self.fail_if_configured()?;
            self.inner.get_query(query)
        }

        fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
            self.fail_if_configured()?;
            self.inner.update(transaction)
        }

        fn delete(&mut self, id: i64, user_id: UserId) -> Result<(), Error> {
            self.fail_if_configured()?;
            self.inner.delete(id, user_id)
        }

        fn count(&self, query: &TransactionQuery) -> Result<usize, Error> {
            self.fail_if_configured()?;
            self.inner.count(query)
        }
    }

    fn builder() -> TransactionBuilder {
        Transaction::build(
            UserId::new(1),
            10.0,
            TransactionKind::Expense,
            "groceries",
            date!(2025 - 08 - 10),
        )
    }

    fn local_store() -> LocalTransactionStore {
        LocalTransactionStore::new(Arc::new(Mutex::new(LocalBlobStorage::in_memory())))
    }

    #[test]
    fn uses_primary_when_available() {
        let fallback = local_store();
        let mut store = FallbackStore::new(StubPrimary::working(), fallback.clone());

        let transaction = store.create(builder()).unwrap();

        assert!(store.primary.inner.get(transaction.id, UserId::new(1)).is_ok());
        assert_eq!(
            fallback.get(transaction.id, UserId::new(1)),
            Err(Error::NotFound),
            "fallback should be untouched while the primary works"
        );
    }

    #[test]
    fn writes_to_fallback_when_primary_is_unreachable() {
        let fallback = local_store();
        let mut store = FallbackStore::new(StubPrimary::unreachable(), fallback.clone());

        let transaction = store.create(builder()).unwrap();

        assert!(fallback.get(transaction.id, UserId::new(1)).is_ok());
    }

    #[test]
    fn retries_on_fallback_when_primary_call_errors() {
        let fallback = local_store();
        let mut store = FallbackStore::new(StubPrimary::erroring(), fallback.clone());

        let transaction = store.create(builder()).unwrap();

        assert!(fallback.get(transaction.id, UserId::new(1)).is_ok());
    }

    #[test]
    fn get_finds_records_that_only_exist_in_the_fallback() {
        let mut fallback = local_store();
        let transaction = fallback.create(builder()).unwrap();
        let store = FallbackStore::new(StubPrimary::working(), fallback);

        let got = store.get(transaction.id, UserId::new(1));

        assert_eq!(got, Ok(transaction));
    }

    #[test]
    fn not_found_only_when_both_stores_miss() {
        let store = FallbackStore::new(StubPrimary::working(), local_store());

        let got = store.get(42, UserId::new(1));

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn domain_errors_are_not_retried_on_the_fallback() {
        let fallback = local_store();
        let mut store = FallbackStore::new(StubPrimary::working(), fallback.clone());
        let future_date = time::OffsetDateTime::now_utc().date() + time::Duration::days(1);
        let future_builder = TransactionBuilder {
            date: future_date,
            ..builder()
        };

        let got = store.create(future_builder);

        assert_eq!(got, Err(Error::FutureDate(future_date)));
        assert_eq!(
            fallback.count(&TransactionQuery::for_user(UserId::new(1))),
            Ok(0)
        );
    }

    #[test]
    fn update_missing_from_both_stores_surfaces_the_primary_error() {
        let mut store = FallbackStore::new(StubPrimary::working(), local_store());
        let transaction = Transaction {
            id: 42,
            user_id: UserId::new(1),
            account_id: None,
            budget_id: None,
            amount: 1.0,
            kind: TransactionKind::Expense,
            category: "groceries".to_owned(),
            description: String::new(),
            date: date!(2025 - 08 - 10),
            created_at: time::OffsetDateTime::now_utc(),
        };

        let got = store.update(&transaction);

        assert_eq!(got, Err(Error::UpdateMissingTransaction));
    }
}
