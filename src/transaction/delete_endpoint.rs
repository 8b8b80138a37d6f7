//! Defines the endpoint for deleting a transaction.

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
    stores::{TransactionRepository, TransactionStore},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The store for managing transactions.
    pub transaction_store: TransactionRepository,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler for deleting the transaction with `transaction_id`.
///
/// Returns an empty OK response so htmx removes the swap target.
pub async fn delete_transaction_endpoint(
    State(mut state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseID>,
) -> Response {
    if let Err(error) = state.transaction_store.delete(transaction_id, user_id) {
        return error.into_alert_response();
    }

    StatusCode::OK.into_response()
}
