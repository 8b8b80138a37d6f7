//! Defines the endpoint for deleting a category.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, auth::UserId, category::delete_category, database_id::DatabaseID};

/// The state needed to delete a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting the category with `category_id`.
///
/// Returns an empty OK response so htmx removes the swap target.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserId>,
    Path(category_id): Path<DatabaseID>,
) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| delete_category(category_id, user_id, &connection));

    if let Err(error) = result {
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
        auth::UserId,
        category::{create_category, get_categories},
        db::initialize,
        transaction::TransactionKind,
    };

    use super::{DeleteCategoryState, delete_category_endpoint};

    fn get_test_state() -> DeleteCategoryState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DeleteCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn deletes_category() {
        let state = get_test_state();
        let user_id = UserId::new(1);
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category("groceries", TransactionKind::Expense, user_id, &connection).unwrap()
        };

        let response =
            delete_category_endpoint(State(state.clone()), Extension(user_id), Path(category.id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_categories(user_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn returns_not_found_for_missing_category() {
        let state = get_test_state();

        let response =
            delete_category_endpoint(State(state), Extension(UserId::new(1)), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_category() {
        let state = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                "groceries",
                TransactionKind::Expense,
                UserId::new(1),
                &connection,
            )
            .unwrap()
        };

        let response = delete_category_endpoint(
            State(state.clone()),
            Extension(UserId::new(2)),
            Path(category.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert!(
            !get_categories(UserId::new(1), &connection).unwrap().is_empty(),
            "the category should still exist after another user's delete attempt"
        );
    }
}
