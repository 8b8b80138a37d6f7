//! Defines the route handler for the page for creating a new budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    budget::Period,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

pub(crate) fn budget_form_fields(
    category: Option<&str>,
    amount: Option<f64>,
    period: Period,
    categories: &[Category],
) -> Markup {
    let amount_str = amount.map(|amount| format!("{amount:.2}"));
    let period_label = |period: Period| match period {
        Period::Monthly => "Monthly",
        Period::Quarterly => "Quarterly",
        Period::Yearly => "Yearly",
    };
    let expense_categories = categories
        .iter()
        .filter(|candidate| candidate.kind == TransactionKind::Expense)
        .collect::<Vec<_>>();

    html!(
        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            @if expense_categories.is_empty() {
                input
                    name="category"
                    id="category"
                    type="text"
                    placeholder="Category"
                    required
                    value=[category]
                    class=(FORM_TEXT_INPUT_STYLE);
            } @else {
                select
                    name="category"
                    id="category"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select a category" }

                    @for candidate in expense_categories {
                        @if Some(candidate.name.as_str()) == category {
                            option value=(candidate.name) selected { (candidate.name) }
                        } @else {
                            option value=(candidate.name) { (candidate.name) }
                        }
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Limit"
            }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    required
                    value=[amount_str.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="period"
                class=(FORM_LABEL_STYLE)
            {
                "Period"
            }

            select
                name="period"
                id="period"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for candidate in Period::ALL {
                    @if candidate == period {
                        option value=(candidate) selected { (period_label(candidate)) }
                    } @else {
                        option value=(candidate) { (period_label(candidate)) }
                    }
                }
            }
        }
    )
}

fn create_budget_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = budget_form_fields(None, None, Period::Monthly, categories);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::BUDGETS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Budget" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Budget"
                }
            }
        }
    };

    base("Create Budget", &[dollar_input_styles()], &content)
}

/// The state needed for the create budget page.
#[derive(Debug, Clone)]
pub struct CreateBudgetPageState {
    /// The database connection for accessing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a budget.
pub async fn get_create_budget_page(
    State(state): State<CreateBudgetPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("could not get categories for new budget page: {error}")
        })?
    };

    Ok(create_budget_view(&categories).into_response())
}
