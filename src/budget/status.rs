//! Computes how a user's spending is tracking against their budgets.

use std::collections::HashMap;

use crate::{
    budget::Budget,
    database_id::DatabaseID,
    transaction::{Transaction, TransactionKind},
};

/// Progress at or above this percentage flags a budget for attention.
pub const WARNING_THRESHOLD: f64 = 80.0;

/// Progress at or above this percentage means the budget limit is blown.
pub const EXCEEDED_THRESHOLD: f64 = 100.0;

/// How a budget is tracking against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Spending is comfortably within the limit.
    Ok,
    /// Spending has reached 80% of the limit.
    Warning,
    /// Spending has reached or passed the limit.
    Exceeded,
    /// Spending in a category with no budget.
    Unbudgeted,
}

/// How urgently an alert needs the user's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The budget is close to its limit.
    Medium,
    /// The budget limit has been reached or passed.
    High,
}

/// A budget combined with the spending recorded against its category.
///
/// Computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    /// The ID of the budget, or None for spending with no matching budget.
    pub id: Option<DatabaseID>,
    /// The category of spending.
    pub category: String,
    /// The budget limit. Zero for unbudgeted categories.
    pub budgeted: f64,
    /// The total spent in the category.
    pub spent: f64,
    /// How much of the limit is left. Negative once the limit is passed.
    pub remaining: f64,
    /// The percentage of the limit spent, capped to the range [0, 100] for display.
    pub progress: f64,
    /// The percentage of the limit spent, uncapped. Used for alert ordering.
    pub raw_progress: f64,
    /// How the budget is tracking.
    pub status: StatusKind,
}

/// A budget status flagged for the user's attention.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    /// The category of the budget the alert is for.
    pub category: String,
    /// The uncapped percentage of the limit spent.
    pub raw_progress: f64,
    /// How urgently the alert needs attention.
    pub severity: Severity,
}

/// Spending totals across every status row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BudgetSummary {
    /// The sum of all budget limits.
    pub total_budgeted: f64,
    /// The sum of all expense spending, including unbudgeted categories.
    pub total_spent: f64,
}

/// The full picture of a user's budgets for a period.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetReport {
    /// One status per budget, plus one per unbudgeted category with spending.
    pub statuses: Vec<BudgetStatus>,
    /// Statuses flagged for attention, most urgent first.
    pub alerts: Vec<BudgetAlert>,
    /// Totals across all status rows.
    pub summary: BudgetSummary,
}

/// Compute per-category budget statuses, alerts and summary totals.
///
/// `transactions` should already be restricted to the period window the
/// budgets apply to. Income transactions are ignored. The function is pure,
/// so calling it twice with the same inputs yields the same report.
///
/// Statuses are ordered as the budgets were given, followed by unbudgeted
/// categories in alphabetical order. Unbudgeted categories never produce
/// alerts.
pub fn compute_budget_status(budgets: &[Budget], transactions: &[Transaction]) -> BudgetReport {
    let mut spending_by_category: HashMap<&str, f64> = HashMap::new();
    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        *spending_by_category
            .entry(transaction.category.as_str())
            .or_default() += transaction.amount;
    }

    let mut statuses: Vec<BudgetStatus> = budgets
        .iter()
        .map(|budget| {
            let spent = spending_by_category
                .remove(budget.category.as_str())
                .unwrap_or(0.0);

            budget_status(budget, spent)
        })
        .collect();

    let mut unbudgeted: Vec<BudgetStatus> = spending_by_category
        .into_iter()
        .map(|(category, spent)| BudgetStatus {
            id: None,
            category: category.to_owned(),
            budgeted: 0.0,
            spent,
            remaining: -spent,
            progress: 100.0,
            raw_progress: 100.0,
            status: StatusKind::Unbudgeted,
        })
        .collect();
    unbudgeted.sort_by(|a, b| a.category.cmp(&b.category));
    statuses.extend(unbudgeted);

    let mut alerts: Vec<BudgetAlert> = statuses
        .iter()
        .filter(|status| matches!(status.status, StatusKind::Warning | StatusKind::Exceeded))
        .map(|status| BudgetAlert {
            category: status.category.clone(),
            raw_progress: status.raw_progress,
            severity: if status.raw_progress >= EXCEEDED_THRESHOLD {
                Severity::High
            } else {
                Severity::Medium
            },
        })
        .collect();
    alerts.sort_by(|a, b| b.raw_progress.total_cmp(&a.raw_progress));

    let summary = BudgetSummary {
        total_budgeted: statuses.iter().map(|status| status.budgeted).sum(),
        total_spent: statuses.iter().map(|status| status.spent).sum(),
    };

    BudgetReport {
        statuses,
        alerts,
        summary,
    }
}

fn budget_status(budget: &Budget, spent: f64) -> BudgetStatus {
    // A zero limit cannot meaningfully express progress as a percentage, so
    // any spending against it counts as fully exceeded.
    let raw_progress = if budget.amount == 0.0 {
        if spent > 0.0 { EXCEEDED_THRESHOLD } else { 0.0 }
    } else {
        spent / budget.amount * 100.0
    };

    let status = if raw_progress >= EXCEEDED_THRESHOLD {
        StatusKind::Exceeded
    } else if raw_progress >= WARNING_THRESHOLD {
        StatusKind::Warning
    } else {
        StatusKind::Ok
    };

    BudgetStatus {
        id: Some(budget.id),
        category: budget.category.clone(),
        budgeted: budget.amount,
        spent,
        remaining: budget.amount - spent,
        progress: raw_progress.clamp(0.0, 100.0),
        raw_progress,
        status,
    }
}
