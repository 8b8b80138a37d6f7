//! Defines the route handler for the page for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    account::{Account, get_accounts},
    auth::UserId,
    budget::{Budget, get_budgets},
    category::{Category, get_categories},
    database_id::DatabaseID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    stores::{TransactionRepository, TransactionStore},
    timezone::get_local_offset,
    transaction::{
        Transaction,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

fn edit_transaction_view(
    transaction: &Transaction,
    max_date: Date,
    categories: &[Category],
    accounts: &[Account],
    budgets: &[Budget],
) -> Markup {
    let edit_transaction_route = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            kind: transaction.kind,
            amount: Some(transaction.amount),
            date: transaction.date,
            category: Some(&transaction.category),
            description: Some(&transaction.description),
            account_id: transaction.account_id,
            budget_id: transaction.budget_id,
            max_date,
            autofocus_amount: false,
        },
        categories,
        accounts,
        budgets,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(edit_transaction_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Save Changes"
                }
            }
        }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing categories and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store for retrieving the transaction being edited.
    pub transaction_store: TransactionRepository,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Response, Error> {
    let transaction = state
        .transaction_store
        .get(transaction_id, user_id)
        .inspect_err(|error| {
            tracing::error!("could not get transaction {transaction_id}: {error}")
        })?;

    let (categories, accounts, budgets) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let categories = get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get categories for edit transaction page: {error}")
        })?;
        let accounts = get_accounts(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get accounts for edit transaction page: {error}")
        })?;
        let budgets = get_budgets(user_id, None, &connection).inspect_err(|error| {
            tracing::error!("could not get budgets for edit transaction page: {error}")
        })?;

        (categories, accounts, budgets)
    };

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let max_date = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    Ok(
        edit_transaction_view(&transaction, max_date, &categories, &accounts, &budgets)
            .into_response(),
    )
}
