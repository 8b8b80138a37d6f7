//! Defines the endpoint for downloading the user's transactions as a CSV file.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    auth::UserId,
    internal_server_error::InternalServerError,
    stores::{SortOrder, TransactionQuery, TransactionRepository, TransactionStore},
    transaction::Transaction,
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The store for retrieving transactions.
    pub transaction_store: TransactionRepository,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler that responds with all of the user's transactions as a CSV
/// attachment, newest first.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let query = TransactionQuery::for_user(user_id).sort_date(SortOrder::Descending);
    let transactions = match state.transaction_store.get_query(&query) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("could not get transactions for CSV export: {error}");
            return error.into_response();
        }
    };

    let csv = match write_csv(&transactions) {
        Ok(csv) => csv,
        Err(error) => {
            tracing::error!("could not write transactions as CSV: {error}");
            return InternalServerError::default().into_response();
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    )
        .into_response()
}

fn write_csv(transactions: &[Transaction]) -> Result<String, Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record(["Date", "Type", "Category", "Amount", "Description"])?;

    for transaction in transactions {
        writer.write_record([
            transaction.date.to_string(),
            transaction.kind.to_string(),
            transaction.category.clone(),
            format!("{:.2}", transaction.amount),
            transaction.description.clone(),
        ])?;
    }

    let bytes = writer.into_inner()?;

    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::UserId,
        db::initialize,
        stores::{
            FallbackStore, LocalBlobStorage, LocalTransactionStore, SqliteTransactionStore,
            TransactionStore,
        },
        test_utils::get_header,
        transaction::{Transaction, TransactionKind},
    };

    use super::{ExportTransactionsState, export_transactions_endpoint, write_csv};

    fn get_test_state() -> ExportTransactionsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let storage = Arc::new(Mutex::new(LocalBlobStorage::in_memory()));

        ExportTransactionsState {
            transaction_store: FallbackStore::new(
                SqliteTransactionStore::new(connection),
                LocalTransactionStore::new(storage),
            ),
        }
    }

    #[tokio::test]
    async fn exports_transactions_as_csv_attachment() {
        let mut state = get_test_state();
        let user_id = UserId::new(1);
        state
            .transaction_store
            .create(
                Transaction::build(
                    user_id,
                    12.5,
                    TransactionKind::Expense,
                    "groceries",
                    date!(2025 - 10 - 04),
                )
                .description("weekly shop"),
            )
            .unwrap();

        let response = export_transactions_endpoint(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            get_header(&response, "content-disposition"),
            "attachment; filename=\"transactions.csv\""
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body);
        assert!(
            text.starts_with("Date,Type,Category,Amount,Description\n"),
            "want CSV header row, got {text:?}"
        );
        assert!(
            text.contains("2025-10-04,expense,groceries,12.50,weekly shop"),
            "want CSV row for the transaction, got {text:?}"
        );
    }

    #[tokio::test]
    async fn does_not_export_other_users_transactions() {
        let mut state = get_test_state();
        state
            .transaction_store
            .create(Transaction::build(
                UserId::new(2),
                99.0,
                TransactionKind::Expense,
                "groceries",
                date!(2025 - 10 - 04),
            ))
            .unwrap();

        let response = export_transactions_endpoint(State(state), Extension(UserId::new(1))).await;

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body);
        assert_eq!(
            text.trim(),
            "Date,Type,Category,Amount,Description",
            "want only the header row for a user with no transactions"
        );
    }

    #[test]
    fn quotes_fields_containing_commas() {
        let transactions = vec![Transaction {
            id: 1,
            user_id: UserId::new(1),
            account_id: None,
            budget_id: None,
            amount: 10.0,
            kind: TransactionKind::Expense,
            category: "groceries".to_owned(),
            description: "milk, eggs and \"bread\"".to_owned(),
            date: date!(2025 - 10 - 04),
            created_at: time::OffsetDateTime::now_utc(),
        }];

        let csv = write_csv(&transactions).unwrap();

        assert!(
            csv.contains("\"milk, eggs and \"\"bread\"\"\""),
            "want description with commas and quotes to be escaped, got {csv:?}"
        );
    }
}
