//! Per-category spending budgets and budget status reporting.

mod budgets_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod status;

pub use budgets_page::{BudgetsViewState, get_budgets_page};
pub use core::{
    Budget, NewBudget, Period, create_budget, create_budget_table, delete_budget, get_budget,
    get_budgets, map_budget_row, update_budget,
};
pub use create_endpoint::{CreateBudgetState, create_budget_endpoint};
pub use create_page::{CreateBudgetPageState, get_create_budget_page};
pub use delete_endpoint::{DeleteBudgetState, delete_budget_endpoint};
pub use edit_endpoint::{EditBudgetState, edit_budget_endpoint};
pub use edit_page::{EditBudgetPageState, get_edit_budget_page};
pub use status::{
    BudgetAlert, BudgetReport, BudgetStatus, BudgetSummary, EXCEEDED_THRESHOLD, Severity,
    StatusKind, WARNING_THRESHOLD, compute_budget_status,
};
