//! Defines the endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, account::delete_account, auth::UserId, database_id::DatabaseID};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting the account with `account_id`.
///
/// Returns an empty OK response so htmx removes the swap target.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<DatabaseID>,
) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| delete_account(account_id, user_id, &connection));

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
    use time::macros::date;

    use crate::{
        Error,
        account::{create_account, get_account},
        auth::UserId,
        db::initialize,
    };

    use super::{DeleteAccountState, delete_account_endpoint};

    fn get_test_state() -> DeleteAccountState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DeleteAccountState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn deletes_account() {
        let state = get_test_state();
        let user_id = UserId::new(1);
        let account = {
            let connection = state.db_connection.lock().unwrap();
            create_account("Checking", 100.0, date!(2025 - 10 - 01), user_id, &connection).unwrap()
        };

        let response =
            delete_account_endpoint(State(state.clone()), Extension(user_id), Path(account.id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_account(account.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn returns_not_found_for_missing_account() {
        let state = get_test_state();

        let response =
            delete_account_endpoint(State(state), Extension(UserId::new(1)), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_account() {
        let state = get_test_state();
        let account = {
            let connection = state.db_connection.lock().unwrap();
            create_account(
                "Checking",
                100.0,
                date!(2025 - 10 - 01),
                UserId::new(1),
                &connection,
            )
            .unwrap()
        };

        let response = delete_account_endpoint(
            State(state.clone()),
            Extension(UserId::new(2)),
            Path(account.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert!(
            get_account(account.id, UserId::new(1), &connection).is_ok(),
            "the account should still exist after another user's delete attempt"
        );
    }
}
