//! Defines the endpoint for updating an existing transaction.

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

use crate::{
    AppState, Error,
    auth::UserId,
    database_id::DatabaseID,
    endpoints,
    stores::{TransactionRepository, TransactionStore},
    transaction::{Transaction, create_endpoint::TransactionForm},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The store for managing transactions.
    pub transaction_store: TransactionRepository,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler for overwriting the transaction with `transaction_id`,
/// redirects to the transactions view on success.
///
/// The stored transaction is fetched first so the edit keeps its creation
/// timestamp.
pub async fn edit_transaction_endpoint(
    State(mut state): State<EditTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = match state.transaction_store.get(transaction_id, user_id) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    let transaction = Transaction {
        account_id: form.account_id,
        budget_id: form.budget_id,
        amount: form.amount,
        kind: form.kind,
        category: form.category,
        description: form.description,
        date: form.date,
        ..transaction
    };

    if let Err(error) = state.transaction_store.update(&transaction) {
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        (),
    )
        .into_response()
}
