//! Categories listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

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
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesViewState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page with transaction counts.
pub async fn get_categories_page(
    State(state): State<CategoriesViewState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not count transactions per category: {error}")
        })?;

    Ok(categories_view(&categories, &transactions_per_category).into_response())
}

fn count_transactions_per_category(
    user_id: UserId,
    connection: &Connection,
) -> Result<HashMap<(String, TransactionKind), u32>, Error> {
    let result: Result<HashMap<(String, TransactionKind), u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category, kind, COUNT(1) FROM \"transaction\"
             WHERE user_id = ?1 GROUP BY category, kind",
        )?
        .query_map([user_id.as_i64()], |row| {
            let category = row.get(0)?;
            let kind = row.get(1)?;
            let count = row.get(2)?;

            Ok(((category, kind), count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn categories_view(
    categories: &[Category],
    transactions_per_category: &HashMap<(String, TransactionKind), u32>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let expense_categories = categories
        .iter()
        .filter(|category| category.kind == TransactionKind::Expense)
        .collect::<Vec<_>>();
    let income_categories = categories
        .iter()
        .filter(|category| category.kind == TransactionKind::Income)
        .collect::<Vec<_>>();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-3xl lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Categories" }

                (create_category_form())

                (category_list_view(
                    "Expense categories",
                    &expense_categories,
                    transactions_per_category,
                ))
                (category_list_view(
                    "Income categories",
                    &income_categories,
                    transactions_per_category,
                ))
            }
        }
    );

    base("Categories", &[], &content)
}

fn create_category_form() -> Markup {
    html!(
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="flex flex-wrap items-end gap-4 rounded border border-gray-200 bg-white
                px-4 py-3 dark:border-gray-700 dark:bg-gray-800"
        {
            div class="grow"
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    name="name"
                    id="name"
                    type="text"
                    placeholder="subscriptions"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    div class="flex items-center gap-2"
                    {
                        input
                            type="radio"
                            name="kind"
                            id="kind-expense"
                            value="expense"
                            checked
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for="kind-expense" class=(FORM_RADIO_LABEL_STYLE) { "Expense" }
                    }

                    div class="flex items-center gap-2"
                    {
                        input
                            type="radio"
                            name="kind"
                            id="kind-income"
                            value="income"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for="kind-income" class=(FORM_RADIO_LABEL_STYLE) { "Income" }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    )
}

fn category_list_view(
    heading: &str,
    categories: &[&Category],
    transactions_per_category: &HashMap<(String, TransactionKind), u32>,
) -> Markup {
    html!(
        section class="space-y-2"
        {
            h2 class="text-lg font-semibold" { (heading) }

            ul class="space-y-2"
            {
                @for category in categories {
                    @let transaction_count = transactions_per_category
                        .get(&(category.name.clone(), category.kind))
                        .copied()
                        .unwrap_or(0);
                    @let delete_url = format_endpoint(endpoints::CATEGORY_API, category.id);
                    @let confirm_message = format!(
                        "Are you sure you want to delete '{}'? {} transaction(s) will keep the \
                         name but the category will no longer be offered in forms.",
                        category.name, transaction_count
                    );

                    li
                        data-category-row="true"
                        class="flex items-center justify-between gap-3 rounded border
                            border-gray-200 bg-white px-4 py-2 dark:border-gray-700
                            dark:bg-gray-800"
                    {
                        span class="text-sm text-gray-900 dark:text-white" { (category.name) }

                        div class="flex items-center gap-4"
                        {
                            span class="text-sm tabular-nums text-gray-500 dark:text-gray-400"
                            {
                                (transaction_count) " transaction(s)"
                            }

                            button
                                type="button"
                                hx-delete=(delete_url)
                                hx-confirm=(confirm_message)
                                hx-target="closest [data-category-row='true']"
                                hx-swap="outerHTML"
                                hx-target-error="#alert-container"
                                class=(BUTTON_DELETE_STYLE)
                            {
                                "Delete"
                            }
                        }
                    }
                }

                @if categories.is_empty() {
                    li
                        data-empty-state="true"
                        class="rounded border border-dashed border-gray-300 bg-white px-4 py-4
                            text-center text-sm text-gray-500 dark:border-gray-700
                            dark:bg-gray-800 dark:text-gray-400"
                    {
                        "No categories yet."
                    }
                }
            }
        }
    )
}
