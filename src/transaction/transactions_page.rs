//! Defines the route handler for the page that displays transactions as a table.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    database_id::DatabaseID,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BADGE_WARNING_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
    stores::{SortOrder, TransactionQuery, TransactionRepository, TransactionStore},
    transaction::{Transaction, TransactionKind},
};

/// The raw query parameters for the transactions page.
///
/// Values come from the filter form, so empty strings are treated the same as
/// missing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsPageQuery {
    page: Option<u64>,
    page_size: Option<u64>,
    category: Option<String>,
    kind: Option<String>,
    from: Option<String>,
    to: Option<String>,
    budget_id: Option<DatabaseID>,
}

/// Validated filters derived from the query parameters.
#[derive(Debug, Clone, PartialEq)]
struct TransactionFilters {
    category: Option<String>,
    kind: Option<TransactionKind>,
    from: Option<Date>,
    to: Option<Date>,
    budget_id: Option<DatabaseID>,
}

impl TransactionFilters {
    fn from_query(query: &TransactionsPageQuery) -> Self {
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);
        let kind = query
            .kind
            .as_deref()
            .and_then(|kind| kind.parse::<TransactionKind>().ok());
        let from = query.from.as_deref().and_then(parse_date_param);
        let to = query.to.as_deref().and_then(parse_date_param);

        Self {
            category,
            kind,
            from,
            to,
            budget_id: query.budget_id,
        }
    }

    fn apply(&self, query: TransactionQuery) -> TransactionQuery {
        let mut query = query;

        if let Some(category) = &self.category {
            query = query.category(category);
        }

        if let Some(kind) = self.kind {
            query = query.kind(kind);
        }

        match (self.from, self.to) {
            (Some(from), Some(to)) if from <= to => query = query.date_range(from..=to),
            (Some(from), None) => query = query.date_range(from..=Date::MAX),
            (None, Some(to)) => query = query.date_range(Date::MIN..=to),
            _ => {}
        }

        if let Some(budget_id) = self.budget_id {
            query = query.budget_id(budget_id);
        }

        query
    }

    fn to_query_string(&self, page: u64, page_size: u64) -> String {
        let mut query = format!("page={page}&page_size={page_size}");

        if let Some(category) = &self.category {
            let encoded = serde_urlencoded::to_string([("category", category)])
                .unwrap_or_default();
            query.push('&');
            query.push_str(&encoded);
        }

        if let Some(kind) = self.kind {
            query.push_str(&format!("&kind={kind}"));
        }

        if let Some(from) = self.from {
            query.push_str(&format!("&from={from}"));
        }

        if let Some(to) = self.to {
            query.push_str(&format!("&to={to}"));
        }

        if let Some(budget_id) = self.budget_id {
            query.push_str(&format!("&budget_id={budget_id}"));
        }

        query
    }
}

fn parse_date_param(value: &str) -> Option<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");

    Date::parse(value.trim(), &format).ok()
}

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The store for retrieving transactions.
    pub transaction_store: TransactionRepository,
    /// The config that controls how to display pages of transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Render an overview of the user's transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserId>,
    Query(query_params): Query<TransactionsPageQuery>,
) -> Result<Response, Error> {
    let filters = TransactionFilters::from_query(&query_params);
    let page = query_params
        .page
        .unwrap_or(state.pagination_config.default_page)
        .max(1);
    let page_size = query_params
        .page_size
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

    let base_query = filters.apply(TransactionQuery::for_user(user_id));
    let transaction_count = state
        .transaction_store
        .count(&base_query)
        .inspect_err(|error| tracing::error!("could not count transactions: {error}"))?;
    let page_count = (transaction_count as u64).div_ceil(page_size).max(1);
    let page = page.min(page_count);

    let transactions = state
        .transaction_store
        .get_query(
            &base_query
                .sort_date(SortOrder::Descending)
                .page(page_size, (page - 1) * page_size),
        )
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let indicators =
        create_pagination_indicators(page, page_count, state.pagination_config.max_pages);

    Ok(transactions_view(&transactions, &filters, &indicators, page_size).into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    filters: &TransactionFilters,
    indicators: &[PaginationIndicator],
    page_size: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::EXPORT_TRANSACTIONS) class=(LINK_STYLE) download
                        {
                            "Export CSV"
                        }

                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                        {
                            "Add Transaction"
                        }
                    }
                }

                (filter_form(filters))

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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (table_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. Create a transaction "
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

                (pagination_nav(indicators, filters, page_size))
            }
        }
    );

    base("Transactions", &[], &content)
}

fn table_row(transaction: &Transaction) -> Markup {
    let amount_str = format_currency(transaction.amount);
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
    let kind_badge_style = match transaction.kind {
        TransactionKind::Income => BADGE_STYLE,
        TransactionKind::Expense => BADGE_WARNING_STYLE,
    };
    let action_links = edit_delete_action_links(
        &edit_url,
        &delete_url,
        "Are you sure you want to delete this transaction? This cannot be undone.",
        "closest tr",
        "delete",
    );

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                time datetime=(transaction.date) { (transaction.date) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(kind_badge_style) { (transaction.kind) }
            }

            td class=(TABLE_CELL_STYLE) { (transaction.category) }

            td class="px-6 py-4 text-right tabular-nums" { (amount_str) }

            td class=(TABLE_CELL_STYLE) { (transaction.description) }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (action_links)
                }
            }
        }
    )
}

fn filter_form(filters: &TransactionFilters) -> Markup {
    let kind_option = |kind: TransactionKind, label: &str| {
        html!(
            @if filters.kind == Some(kind) {
                option value=(kind) selected { (label) }
            } @else {
                option value=(kind) { (label) }
            }
        )
    };

    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    name="from"
                    id="from"
                    type="date"
                    value=[filters.from.map(|date| date.to_string())]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    name="to"
                    id="to"
                    type="date"
                    value=[filters.to.map(|date| date.to_string())]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                input
                    name="category"
                    id="category"
                    type="text"
                    value=[filters.category.as_deref()]
                    placeholder="Any category"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }
                select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All" }
                    (kind_option(TransactionKind::Expense, "Expense"))
                    (kind_option(TransactionKind::Income, "Income"))
                }
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Filter"
            }
        }
    )
}

fn pagination_nav(
    indicators: &[PaginationIndicator],
    filters: &TransactionFilters,
    page_size: u64,
) -> Markup {
    let page_url = |page: u64| {
        format!(
            "{}?{}",
            endpoints::TRANSACTIONS_VIEW,
            filters.to_query_string(page, page_size)
        )
    };
    let link_style = "flex items-center justify-center px-3 h-8 leading-tight
        text-gray-500 bg-white border border-gray-300 hover:bg-gray-100
        hover:text-gray-700 dark:bg-gray-800 dark:border-gray-700
        dark:text-gray-400 dark:hover:bg-gray-700 dark:hover:text-white";
    let current_style = "flex items-center justify-center px-3 h-8 leading-tight
        text-blue-600 border border-gray-300 bg-blue-50 hover:bg-blue-100
        hover:text-blue-700 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

    html!(
        nav class="pagination" aria-label="Transaction pages"
        {
            ul class="pagination inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(link_style) { "Previous" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(current_style) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(link_style) { "..." }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(link_style) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    )
}
