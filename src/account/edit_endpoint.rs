//! Defines the endpoint for updating an existing account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, create_endpoint::AccountForm, update_account},
    auth::UserId,
    database_id::DatabaseID,
    endpoints,
};

/// The state needed to update an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for overwriting the account with `account_id`, redirects to
/// the accounts view on success.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<DatabaseID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let account = Account {
        id: account_id,
        user_id,
        name: form.name,
        balance: form.balance,
        date: form.date,
    };

    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| update_account(&account, &connection));

    if let Err(error) = result {
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
        (),
    )
        .into_response()
}
