//! Shared form fields for the create and edit transaction pages.

use maud::{Markup, html};
use time::Date;

use crate::{
    account::Account,
    budget::Budget,
    category::Category,
    database_id::DatabaseID,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::TransactionKind,
};

pub struct TransactionFormDefaults<'a> {
    pub kind: TransactionKind,
    pub amount: Option<f64>,
    pub date: Date,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub account_id: Option<DatabaseID>,
    pub budget_id: Option<DatabaseID>,
    pub max_date: Date,
    pub autofocus_amount: bool,
}

pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
    accounts: &[Account],
    budgets: &[Budget],
) -> Markup {
    let is_expense = matches!(defaults.kind, TransactionKind::Expense);
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));
    let amount_placeholder = amount_str.as_deref().unwrap_or("0.00");
    let description_placeholder = defaults.description.unwrap_or("Description");

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="transaction-kind-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="transaction-kind-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
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
                "Amount"
            }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder=(amount_placeholder)
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category"
                id="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for category in categories {
                    @if Some(category.name.as_str()) == defaults.category {
                        option value=(category.name) selected { (category.name) }
                    } @else {
                        option value=(category.name) { (category.name) }
                    }
                }
            }
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder=(description_placeholder)
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if !accounts.is_empty() {
            div
            {
                label
                    for="account_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Account"
                }

                select
                    name="account_id"
                    id="account_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select an account" }

                    @for account in accounts {
                        @if Some(account.id) == defaults.account_id {
                            option value=(account.id) selected { (account.name) }
                        } @else {
                            option value=(account.id) { (account.name) }
                        }
                    }
                }
            }
        }

        @if !budgets.is_empty() {
            div
            {
                label
                    for="budget_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Budget"
                }

                select
                    name="budget_id"
                    id="budget_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No budget" }

                    @for budget in budgets {
                        @if Some(budget.id) == defaults.budget_id {
                            option value=(budget.id) selected {
                                (budget.category) " (" (budget.period) ")"
                            }
                        } @else {
                            option value=(budget.id) {
                                (budget.category) " (" (budget.period) ")"
                            }
                        }
                    }
                }
            }
        }
    }
}
