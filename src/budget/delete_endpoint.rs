//! Defines the endpoint for deleting a budget.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    auth::UserId,
    database_id::DatabaseID,
    stores::{BudgetRepository, BudgetStore},
};

/// The state needed to delete a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    /// The store for managing budgets.
    pub budget_store: BudgetRepository,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
        }
    }
}

/// A route handler for deleting the budget with `budget_id`.
///
/// Returns an empty OK response so htmx removes the swap target.
pub async fn delete_budget_endpoint(
    State(mut state): State<DeleteBudgetState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<DatabaseID>,
) -> Response {
    if let Err(error) = state.budget_store.delete(budget_id, user_id) {
        return error.into_alert_response();
    }

    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::UserId,
        budget::{NewBudget, Period},
        db::initialize,
        stores::{
            BudgetStore, FallbackStore, LocalBlobStorage, LocalBudgetStore, SqliteBudgetStore,
        },
    };

    use super::{DeleteBudgetState, delete_budget_endpoint};

    fn get_test_state() -> DeleteBudgetState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let storage = Arc::new(Mutex::new(LocalBlobStorage::in_memory()));

        DeleteBudgetState {
            budget_store: FallbackStore::new(
                SqliteBudgetStore::new(connection),
                LocalBudgetStore::new(storage),
            ),
        }
    }

    #[tokio::test]
    async fn deletes_budget() {
        let mut state = get_test_state();
        let user_id = UserId::new(1);
        let budget = state
            .budget_store
            .create(NewBudget {
                user_id,
                category: "groceries".to_owned(),
                amount: 500.0,
                period: Period::Monthly,
            })
            .unwrap();

        let response =
            delete_budget_endpoint(State(state.clone()), Extension(user_id), Path(budget.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.budget_store.get(budget.id, user_id),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn returns_not_found_for_missing_budget() {
        let state = get_test_state();

        let response =
            delete_budget_endpoint(State(state), Extension(UserId::new(1)), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_budget() {
        let mut state = get_test_state();
        let budget = state
            .budget_store
            .create(NewBudget {
                user_id: UserId::new(1),
                category: "groceries".to_owned(),
                amount: 500.0,
                period: Period::Monthly,
            })
            .unwrap();

        let response = delete_budget_endpoint(
            State(state.clone()),
            Extension(UserId::new(2)),
            Path(budget.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            state.budget_store.get(budget.id, UserId::new(1)).is_ok(),
            "the budget should still exist after another user's delete attempt"
        );
    }
}
