//! Defines the route handler for the page that shows budgets and their spending progress.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserId,
    budget::{
        BudgetAlert, BudgetReport, BudgetStatus, Period, Severity, StatusKind,
        compute_budget_status,
    },
    endpoints::{self, format_endpoint},
    html::{
        BADGE_DANGER_STYLE, BADGE_STYLE, BADGE_WARNING_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        PROGRESS_BAR_EXCEEDED_STYLE, PROGRESS_BAR_OK_STYLE, PROGRESS_BAR_WARNING_STYLE,
        PROGRESS_TRACK_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    stores::{
        BudgetRepository, BudgetStore, TransactionQuery, TransactionRepository, TransactionStore,
    },
    timezone::get_local_offset,
    transaction::TransactionKind,
};

/// The query parameters for the budgets page.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetsPageQuery {
    period: Option<String>,
}

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsViewState {
    /// The store for retrieving budgets.
    pub budget_store: BudgetRepository,
    /// The store for retrieving the spending recorded against budgets.
    pub transaction_store: TransactionRepository,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render an overview of the user's budgets for the selected period.
///
/// Spending is aggregated over the period's current window, e.g. the current
/// calendar month for monthly budgets.
pub async fn get_budgets_page(
    State(state): State<BudgetsViewState>,
    Extension(user_id): Extension<UserId>,
    Query(query_params): Query<BudgetsPageQuery>,
) -> Result<Response, Error> {
    let period = query_params
        .period
        .as_deref()
        .and_then(|period| period.parse::<Period>().ok())
        .unwrap_or(Period::Monthly);

    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let budgets = state
        .budget_store
        .get_for_user(user_id, Some(period))
        .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;
    let transactions = state
        .transaction_store
        .get_query(
            &TransactionQuery::for_user(user_id)
                .kind(TransactionKind::Expense)
                .date_range(period.window(today)),
        )
        .inspect_err(|error| tracing::error!("could not get transactions for budgets: {error}"))?;

    let report = compute_budget_status(&budgets, &transactions);

    Ok(budgets_view(&report, period).into_response())
}

fn budgets_view(report: &BudgetReport, period: Period) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Add Budget"
                    }
                }

                (period_selector(period))

                @if !report.alerts.is_empty() {
                    (alerts_banner(&report.alerts))
                }

                (summary_line(report))

                ul class="space-y-4"
                {
                    @for status in &report.statuses {
                        (status_card(status))
                    }

                    @if report.statuses.is_empty() {
                        li
                            data-empty-state="true"
                            class="rounded border border-dashed border-gray-300 bg-white
                                px-4 py-6 text-center text-sm text-gray-500
                                dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                        {
                            "No budgets found for this period. Create a budget "
                            a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                            {
                                "here"
                            }
                            "."
                        }
                    }
                }
            }
        }
    );

    base("Budgets", &[], &content)
}

fn period_selector(selected: Period) -> Markup {
    let label = |period: Period| match period {
        Period::Monthly => "Monthly",
        Period::Quarterly => "Quarterly",
        Period::Yearly => "Yearly",
    };

    html!(
        nav class="flex gap-2" aria-label="Budget period"
        {
            @for period in Period::ALL {
                @if period == selected {
                    span
                        aria-current="page"
                        class="px-3 py-1 rounded-full text-sm font-semibold
                            text-white bg-blue-600 dark:bg-blue-500"
                    {
                        (label(period))
                    }
                } @else {
                    a
                        href=(format!("{}?period={period}", endpoints::BUDGETS_VIEW))
                        class="px-3 py-1 rounded-full text-sm font-semibold
                            text-gray-700 bg-gray-100 hover:bg-gray-200
                            dark:text-gray-300 dark:bg-gray-700 dark:hover:bg-gray-600"
                    {
                        (label(period))
                    }
                }
            }
        }
    )
}

fn alerts_banner(alerts: &[BudgetAlert]) -> Markup {
    html!(
        section
            data-budget-alerts="true"
            class="rounded border border-yellow-300 bg-yellow-50 px-4 py-3
                dark:border-yellow-700 dark:bg-yellow-900/30"
        {
            h2 class="text-sm font-semibold mb-2" { "Budget alerts" }

            ul class="flex flex-wrap gap-2"
            {
                @for alert in alerts {
                    li
                    {
                        @let badge_style = match alert.severity {
                            Severity::High => BADGE_DANGER_STYLE,
                            Severity::Medium => BADGE_WARNING_STYLE,
                        };
                        span class=(badge_style)
                        {
                            (alert.category) " " (format!("{:.0}%", alert.raw_progress))
                        }
                    }
                }
            }
        }
    )
}

fn summary_line(report: &BudgetReport) -> Markup {
    html!(
        p class="text-sm text-gray-500 dark:text-gray-400"
        {
            "Spent "
            span class="font-semibold" { (format_currency(report.summary.total_spent)) }
            " of "
            span class="font-semibold" { (format_currency(report.summary.total_budgeted)) }
            " budgeted."
        }
    )
}

fn status_card(status: &BudgetStatus) -> Markup {
    let (bar_style, badge_style, badge_text) = match status.status {
        StatusKind::Ok => (PROGRESS_BAR_OK_STYLE, BADGE_STYLE, "On track"),
        StatusKind::Warning => (PROGRESS_BAR_WARNING_STYLE, BADGE_WARNING_STYLE, "Warning"),
        StatusKind::Exceeded => (PROGRESS_BAR_EXCEEDED_STYLE, BADGE_DANGER_STYLE, "Exceeded"),
        StatusKind::Unbudgeted => (PROGRESS_BAR_WARNING_STYLE, BADGE_WARNING_STYLE, "Unbudgeted"),
    };
    let progress_width = format!("width: {:.0}%", status.progress);

    html!(
        li
            data-budget-card="true"
            class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm
                dark:border-gray-700 dark:bg-gray-800"
        {
            div class="flex items-start justify-between gap-3"
            {
                div class="text-sm font-semibold text-gray-900 dark:text-white"
                {
                    (status.category)
                }

                span class=(badge_style) { (badge_text) }
            }

            div class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                @if status.status == StatusKind::Unbudgeted {
                    (format_currency(status.spent)) " spent with no budget"
                } @else {
                    (format_currency(status.spent))
                    " of "
                    (format_currency(status.budgeted))
                    " spent, "
                    (format_currency(status.remaining))
                    " remaining"
                }
            }

            div class="mt-2"
            {
                div class=(PROGRESS_TRACK_STYLE)
                {
                    div class=(bar_style) style=(progress_width) {}
                }
            }

            @if let Some(id) = status.id {
                div class="mt-2 flex items-center gap-4 text-sm"
                {
                    a
                        href=(format!("{}?budget_id={id}", endpoints::TRANSACTIONS_VIEW))
                        class=(LINK_STYLE)
                    {
                        "View transactions"
                    }

                    (edit_delete_action_links(
                        &format_endpoint(endpoints::EDIT_BUDGET_VIEW, id),
                        &format_endpoint(endpoints::BUDGET_API, id),
                        &format!(
                            "Are you sure you want to delete the budget for '{}'? This cannot be undone.",
                            status.category
                        ),
                        "closest [data-budget-card='true']",
                        "outerHTML",
                    ))
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::Query, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{ElementRef, Html, Selector};
    use time::OffsetDateTime;

    use crate::{
        auth::UserId,
        budget::{NewBudget, Period},
        db::initialize,
        stores::{
            BudgetStore, FallbackStore, LocalBlobStorage, LocalBudgetStore, LocalTransactionStore,
            SqliteBudgetStore, SqliteTransactionStore, TransactionStore,
        },
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Transaction, TransactionKind},
    };

    use super::{BudgetsPageQuery, BudgetsViewState, get_budgets_page};

    fn get_test_state() -> BudgetsViewState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let storage = Arc::new(Mutex::new(LocalBlobStorage::in_memory()));

        BudgetsViewState {
            budget_store: FallbackStore::new(
                SqliteBudgetStore::new(connection.clone()),
                LocalBudgetStore::new(storage.clone()),
            ),
            transaction_store: FallbackStore::new(
                SqliteTransactionStore::new(connection),
                LocalTransactionStore::new(storage),
            ),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn budgets_page_shows_progress_and_alerts() {
        let mut state = get_test_state();
        let user_id = UserId::new(1);
        let today = OffsetDateTime::now_utc().date();
        state
            .budget_store
            .create(NewBudget {
                user_id,
                category: "groceries".to_owned(),
                amount: 100.0,
                period: Period::Monthly,
            })
            .unwrap();
        state
            .transaction_store
            .create(Transaction::build(
                user_id,
                120.0,
                TransactionKind::Expense,
                "groceries",
                today,
            ))
            .unwrap();

        let response = get_budgets_page(
            State(state),
            Extension(user_id),
            Query(BudgetsPageQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let cards = budget_cards(&html);
        assert_eq!(cards.len(), 1, "want 1 budget card, got {}", cards.len());
        let card_text = cards[0].text().collect::<String>();
        assert!(
            card_text.contains("Exceeded"),
            "want card to show Exceeded status, got {card_text:?}"
        );

        let alerts_selector = Selector::parse("[data-budget-alerts='true']").unwrap();
        let alerts = html
            .select(&alerts_selector)
            .next()
            .expect("want an alerts banner for an exceeded budget");
        let alerts_text = alerts.text().collect::<String>();
        assert!(
            alerts_text.contains("groceries"),
            "want alert for groceries, got {alerts_text:?}"
        );
        assert!(
            alerts_text.contains("120%"),
            "want alert to show 120% progress, got {alerts_text:?}"
        );

        let link_selector = Selector::parse("[data-budget-card='true'] a").unwrap();
        let has_transactions_link = cards[0]
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href"))
            .any(|href| href.contains("budget_id="));
        assert!(
            has_transactions_link,
            "want a link to the budget's transactions on the card"
        );
    }

    #[tokio::test]
    async fn budgets_page_shows_unbudgeted_spending() {
        let mut state = get_test_state();
        let user_id = UserId::new(1);
        let today = OffsetDateTime::now_utc().date();
        state
            .transaction_store
            .create(Transaction::build(
                user_id,
                42.0,
                TransactionKind::Expense,
                "dining",
                today,
            ))
            .unwrap();

        let response = get_budgets_page(
            State(state),
            Extension(user_id),
            Query(BudgetsPageQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let cards = budget_cards(&html);
        assert_eq!(cards.len(), 1, "want 1 card, got {}", cards.len());
        let card_text = cards[0].text().collect::<String>();
        assert!(
            card_text.contains("Unbudgeted"),
            "want card to show Unbudgeted status, got {card_text:?}"
        );

        let alerts_selector = Selector::parse("[data-budget-alerts='true']").unwrap();
        assert!(
            html.select(&alerts_selector).next().is_none(),
            "unbudgeted spending should not raise alerts"
        );
    }

    #[tokio::test]
    async fn budgets_page_shows_empty_state() {
        let state = get_test_state();

        let response = get_budgets_page(
            State(state),
            Extension(UserId::new(1)),
            Query(BudgetsPageQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let empty_selector = Selector::parse("[data-empty-state='true']").unwrap();
        html.select(&empty_selector)
            .next()
            .expect("want an empty state when there are no budgets");
    }

    #[tokio::test]
    async fn budgets_page_filters_by_period() {
        let mut state = get_test_state();
        let user_id = UserId::new(1);
        state
            .budget_store
            .create(NewBudget {
                user_id,
                category: "groceries".to_owned(),
                amount: 100.0,
                period: Period::Monthly,
            })
            .unwrap();
        state
            .budget_store
            .create(NewBudget {
                user_id,
                category: "travel".to_owned(),
                amount: 1000.0,
                period: Period::Yearly,
            })
            .unwrap();

        let response = get_budgets_page(
            State(state),
            Extension(user_id),
            Query(BudgetsPageQuery {
                period: Some("yearly".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let cards = budget_cards(&html);
        assert_eq!(cards.len(), 1, "want 1 yearly budget card, got {}", cards.len());
        let card_text = cards[0].text().collect::<String>();
        assert!(
            card_text.contains("travel"),
            "want the yearly budget card, got {card_text:?}"
        );
    }

    fn budget_cards(html: &Html) -> Vec<ElementRef<'_>> {
        let card_selector = Selector::parse("[data-budget-card='true']").unwrap();
        html.select(&card_selector).collect()
    }
}
