//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
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
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        TransactionKind,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

fn create_transaction_view(
    max_date: Date,
    categories: &[Category],
    accounts: &[Account],
    budgets: &[Budget],
) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            kind: TransactionKind::Expense,
            amount: None,
            date: max_date,
            category: None,
            description: None,
            account_id: None,
            budget_id: None,
            max_date,
            autofocus_amount: true,
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
                hx-post=(create_transaction_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the create transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing categories and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let (categories, accounts, budgets) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let categories = get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get categories for new transaction page: {error}")
        })?;
        let accounts = get_accounts(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get accounts for new transaction page: {error}")
        })?;
        let budgets = get_budgets(user_id, None, &connection).inspect_err(|error| {
            tracing::error!("could not get budgets for new transaction page: {error}")
        })?;

        (categories, accounts, budgets)
    };

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let max_date = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    Ok(create_transaction_view(max_date, &categories, &accounts, &budgets).into_response())
}

#[cfg(test)]
mod view_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::ElementRef;
    use time::OffsetDateTime;

    use crate::{
        auth::UserId,
        db::initialize,
        endpoints,
        test_utils::{assert_valid_html, must_get_form, parse_html_document},
        transaction::{create_page::CreateTransactionPageState, get_create_transaction_page},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[tokio::test]
    async fn new_transaction_returns_form() {
        let conn = get_test_connection();
        let state = CreateTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_create_transaction_page(State(state), Extension(UserId::new(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::TRANSACTIONS_API),
            "want form with attribute hx-post=\"{}\", got {hx_post:?}",
            endpoints::TRANSACTIONS_API,
        );

        assert_correct_inputs(&form);
        assert_has_submit_button(&form);
    }

    #[track_caller]
    fn assert_correct_inputs(form: &ElementRef) {
        let expected_input_types = vec![
            ("amount", "number"),
            ("date", "date"),
            ("description", "text"),
        ];

        for (name, element_type) in expected_input_types {
            let selector_string = format!("input[type={element_type}]");
            let input_selector = scraper::Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(
                inputs.len(),
                1,
                "want 1 {element_type} input, got {}",
                inputs.len()
            );

            let input = inputs.first().unwrap();

            let input_name = input.value().attr("name");
            assert_eq!(
                input_name,
                Some(name),
                "want {element_type} with name=\"{name}\", got {input_name:?}"
            );

            if input_name == Some("date") {
                let today = OffsetDateTime::now_utc().date();
                let max_date = input.value().attr("max");

                assert_eq!(
                    Some(today.to_string().as_str()),
                    max_date,
                    "the date for a new transaction should be limited to the current date {today}, but got {max_date:?}"
                );
            }
        }

        let category_selector = scraper::Selector::parse("select[name=category]").unwrap();
        assert!(
            form.select(&category_selector).next().is_some(),
            "want a category select in the form"
        );
    }

    #[track_caller]
    fn assert_has_submit_button(form: &ElementRef) {
        let button_selector = scraper::Selector::parse("button").unwrap();
        let buttons = form.select(&button_selector).collect::<Vec<_>>();
        assert_eq!(buttons.len(), 1, "want 1 button, got {}", buttons.len());
        let button_type = buttons.first().unwrap().value().attr("type");
        assert_eq!(
            button_type,
            Some("submit"),
            "want button with type=\"submit\", got {button_type:?}"
        );
    }
}
