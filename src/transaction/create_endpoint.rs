//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, auth::UserId, database_id::DatabaseID, endpoints,
    stores::{TransactionRepository, TransactionStore},
    transaction::{Transaction, TransactionKind},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The store for managing transactions.
    pub transaction_store: TransactionRepository,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category of the transaction.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The ID of the account the transaction belongs to, if any.
    #[serde(default)]
    pub account_id: Option<DatabaseID>,
    /// The ID of the budget the transaction counts towards, if any.
    #[serde(default)]
    pub budget_id: Option<DatabaseID>,
}

/// A route handler for creating a new transaction, redirects to the
/// transactions view on success.
pub async fn create_transaction_endpoint(
    State(mut state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let builder = Transaction::build(user_id, form.amount, form.kind, &form.category, form.date)
        .description(&form.description)
        .account_id(form.account_id)
        .budget_id(form.budget_id);

    if let Err(error) = state.transaction_store.create(builder) {
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        (),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, body::Body, extract::State, http::Response};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::UserId,
        db::initialize,
        stores::{
            FallbackStore, LocalBlobStorage, LocalTransactionStore, SqliteTransactionStore,
            TransactionQuery, TransactionStore,
        },
        transaction::TransactionKind,
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint};

    fn get_test_state() -> CreateTransactionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let storage = Arc::new(Mutex::new(LocalBlobStorage::in_memory()));

        CreateTransactionState {
            transaction_store: FallbackStore::new(
                SqliteTransactionStore::new(connection),
                LocalTransactionStore::new(storage),
            ),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();
        let form = TransactionForm {
            amount: 12.3,
            kind: TransactionKind::Expense,
            category: "groceries".to_owned(),
            date: OffsetDateTime::now_utc().date(),
            description: "test transaction".to_owned(),
            account_id: None,
            budget_id: None,
        };

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(UserId::new(1)),
            Form(form),
        )
        .await;

        assert_redirects_to_transactions_view(response);

        let transactions = state
            .transaction_store
            .get_query(&TransactionQuery::for_user(UserId::new(1)))
            .unwrap();
        assert_eq!(transactions.len(), 1, "want 1 transaction to be created");
        assert_eq!(transactions[0].amount, 12.3);
        assert_eq!(transactions[0].category, "groceries");
        assert_eq!(transactions[0].description, "test transaction");
    }

    #[tokio::test]
    async fn links_transaction_to_budget() {
        let state = get_test_state();
        let user_id = UserId::new(1);
        let form = TransactionForm {
            amount: 42.0,
            kind: TransactionKind::Expense,
            category: "groceries".to_owned(),
            date: OffsetDateTime::now_utc().date(),
            description: String::new(),
            account_id: None,
            budget_id: Some(3),
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                .await;

        assert_redirects_to_transactions_view(response);

        let linked = state
            .transaction_store
            .get_query(&TransactionQuery::for_user(user_id).budget_id(3))
            .unwrap();
        assert_eq!(linked.len(), 1, "want 1 linked transaction");
        assert_eq!(linked[0].budget_id, Some(3));
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let state = get_test_state();
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(1);
        let form = TransactionForm {
            amount: 12.3,
            kind: TransactionKind::Expense,
            category: "groceries".to_owned(),
            date: tomorrow,
            description: String::new(),
            account_id: None,
            budget_id: None,
        };

        let response =
            create_transaction_endpoint(State(state), Extension(UserId::new(1)), Form(form)).await;

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[track_caller]
    fn assert_redirects_to_transactions_view(response: Response<Body>) {
        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(
            location, "/transactions",
            "got redirect to {location:?}, want redirect to /transactions"
        );
    }
}
