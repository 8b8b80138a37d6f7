//! Dashboard route handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::get_total_account_balance,
    auth::UserId,
    budget::{BudgetAlert, Period, Severity, compute_budget_status},
    endpoints,
    html::{
        BADGE_DANGER_STYLE, BADGE_WARNING_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    stores::{
        BudgetRepository, BudgetStore, SortOrder, TransactionQuery, TransactionRepository,
        TransactionStore,
    },
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind},
};

/// How many of the most recent transactions to show on the dashboard.
const RECENT_TRANSACTION_COUNT: u64 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for looking up account balances.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store for the user's transactions.
    pub transaction_store: TransactionRepository,
    /// The store for the user's budgets.
    pub budget_store: BudgetRepository,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_store: state.transaction_store.clone(),
            budget_store: state.budget_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's data for the current month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();
    let month_window = Period::Monthly.window(today);

    let month_transactions = state
        .transaction_store
        .get_query(
            &TransactionQuery::for_user(user_id).date_range(month_window),
        )
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let income = sum_amounts(&month_transactions, TransactionKind::Income);
    let expenses = sum_amounts(&month_transactions, TransactionKind::Expense);

    let budgets = state
        .budget_store
        .get_for_user(user_id, Some(Period::Monthly))
        .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;
    let month_expenses = month_transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .cloned()
        .collect::<Vec<_>>();
    let report = compute_budget_status(&budgets, &month_expenses);

    let recent_transactions = state
        .transaction_store
        .get_query(
            &TransactionQuery::for_user(user_id)
                .sort_date(SortOrder::Descending)
                .page(RECENT_TRANSACTION_COUNT, 0),
        )
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    let total_balance = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_total_account_balance(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get total account balance: {error}"))?
    };

    Ok(dashboard_view(
        income,
        expenses,
        total_balance,
        &report.alerts,
        &recent_transactions,
    )
    .into_response())
}

fn sum_amounts(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .map(|transaction| transaction.amount)
        .sum()
}

fn dashboard_view(
    income: f64,
    expenses: f64,
    total_balance: f64,
    alerts: &[BudgetAlert],
    recent_transactions: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let net = income - expenses;

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                @if !alerts.is_empty() {
                    (alerts_banner(alerts))
                }

                div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
                {
                    (summary_card("Income this month", income, "income"))
                    (summary_card("Expenses this month", expenses, "expenses"))
                    (summary_card("Net this month", net, "net"))
                    (summary_card("Total balance", total_balance, "balance"))
                }

                (recent_transactions_view(recent_transactions))
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn summary_card(label: &str, amount: f64, data_summary: &str) -> Markup {
    html!(
        div class="rounded-lg border border-gray-200 bg-white p-4 shadow-md
            dark:border-gray-700 dark:bg-gray-800"
        {
            div class="text-sm text-gray-600 dark:text-gray-400" { (label) }

            div class="text-2xl font-bold tabular-nums" data-summary=(data_summary)
            {
                (format_currency(amount))
            }
        }
    )
}

fn alerts_banner(alerts: &[BudgetAlert]) -> Markup {
    html!(
        section
            data-budget-alerts="true"
            class="rounded border border-amber-300 bg-amber-50 px-4 py-3
                dark:border-amber-700 dark:bg-amber-950"
        {
            div class="flex flex-wrap items-center gap-2"
            {
                span class="text-sm font-semibold" { "Budget alerts:" }

                @for alert in alerts {
                    @let badge_style = match alert.severity {
                        Severity::High => BADGE_DANGER_STYLE,
                        Severity::Medium => BADGE_WARNING_STYLE,
                    };

                    span class=(badge_style)
                    {
                        (alert.category) " " (format!("{:.0}%", alert.raw_progress))
                    }
                }

                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "View budgets" }
            }
        }
    )
}

fn recent_transactions_view(transactions: &[Transaction]) -> Markup {
    html!(
        section class="space-y-2"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h2 class="text-lg font-semibold" { "Recent transactions" }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            section class="w-full overflow-x-auto dark:bg-gray-800"
            {
                table class="w-full text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            @let signed_amount = match transaction.kind {
                                TransactionKind::Income => transaction.amount,
                                TransactionKind::Expense => -transaction.amount,
                            };

                            tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    time datetime=(transaction.date) { (transaction.date) }
                                }

                                td class=(TABLE_CELL_STYLE) { (transaction.category) }

                                td class="px-6 py-4 text-right tabular-nums"
                                {
                                    (format_currency(signed_amount))
                                }
                            }
                        }

                        @if transactions.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    data-empty-state="true"
                                    class="px-6 py-4 text-center
                                        text-gray-500 dark:text-gray-400"
                                {
                                    "No transactions recorded yet. Add one "
                                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                    {
                                        "here"
                                    }
                                    "."
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}
