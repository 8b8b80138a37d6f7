//! Defines the budget store trait.

use crate::{
    Error,
    auth::UserId,
    budget::{Budget, NewBudget, Period},
    database_id::DatabaseID,
};

/// Handles the creation and retrieval of budgets.
///
/// Implementers must enforce at most one budget per user, category and period.
pub trait BudgetStore {
    /// Create a new budget in the store.
    fn create(&mut self, budget: NewBudget) -> Result<Budget, Error>;

    /// Retrieve a budget owned by `user_id` from the store.
    fn get(&self, id: DatabaseID, user_id: UserId) -> Result<Budget, Error>;

    /// Retrieve all budgets owned by `user_id`, optionally restricted to `period`.
    fn get_for_user(&self, user_id: UserId, period: Option<Period>) -> Result<Vec<Budget>, Error>;

    /// Overwrite the stored budget with the same ID as `budget`.
    fn update(&mut self, budget: &Budget) -> Result<(), Error>;

    /// Remove the budget with `id` owned by `user_id` from the store.
    fn delete(&mut self, id: DatabaseID, user_id: UserId) -> Result<(), Error>;
}
