//! Defines the route handler for the page for editing an existing budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    budget::{Budget, create_page::budget_form_fields},
    category::{Category, get_categories},
    database_id::DatabaseID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    stores::{BudgetRepository, BudgetStore},
};

fn edit_budget_view(budget: &Budget, categories: &[Category]) -> Markup {
    let edit_budget_route = format_endpoint(endpoints::BUDGET_API, budget.id);
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = budget_form_fields(
        Some(&budget.category),
        Some(budget.amount),
        budget.period,
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(edit_budget_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Budget" }

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

    base("Edit Budget", &[dollar_input_styles()], &content)
}

/// The state needed for the edit budget page.
#[derive(Debug, Clone)]
pub struct EditBudgetPageState {
    /// The database connection for accessing categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store for retrieving the budget being edited.
    pub budget_store: BudgetRepository,
}

impl FromRef<AppState> for EditBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            budget_store: state.budget_store.clone(),
        }
    }
}

/// Renders the page for editing a budget.
pub async fn get_edit_budget_page(
    State(state): State<EditBudgetPageState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Response, Error> {
    let budget = state
        .budget_store
        .get(budget_id, user_id)
        .inspect_err(|error| tracing::error!("could not get budget {budget_id}: {error}"))?;

    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get categories for edit budget page: {error}")
        })?
    };

    Ok(edit_budget_view(&budget, &categories).into_response())
}
