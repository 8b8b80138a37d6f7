//! Repository traits for transactions and budgets, with swappable backends.
//!
//! The primary backend is the SQLite database. A local JSON blob acts as a
//! best-effort fallback when the database is unavailable, composed with the
//! primary via [FallbackStore].

mod budget;
mod fallback;
mod local;
mod sqlite;
mod transaction;

pub use budget::BudgetStore;
pub use fallback::FallbackStore;
pub use local::{LocalBlobStorage, LocalBudgetStore, LocalTransactionStore};
pub use sqlite::{SqliteBudgetStore, SqliteTransactionStore};
pub use transaction::{SortOrder, TransactionQuery, TransactionStore};

/// Probes whether a storage backend can currently serve requests.
pub trait Connectivity {
    /// Whether the backend is reachable right now.
    ///
    /// A false result means calls should be routed to a fallback backend.
    fn is_available(&self) -> bool;
}

/// The repository the application uses for transactions.
pub type TransactionRepository = FallbackStore<SqliteTransactionStore, LocalTransactionStore>;

/// The repository the application uses for budgets.
pub type BudgetRepository = FallbackStore<SqliteBudgetStore, LocalBudgetStore>;
