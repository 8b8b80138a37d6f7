//! Defines the endpoint for creating a new budget.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState,
    auth::UserId,
    budget::{NewBudget, Period},
    endpoints,
    stores::{BudgetRepository, BudgetStore},
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The store for managing budgets.
    pub budget_store: BudgetRepository,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
        }
    }
}

/// The form data for creating or updating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The category of spending the budget limits.
    pub category: String,
    /// The spending limit for the period.
    pub amount: f64,
    /// The recurring timeframe the limit applies to.
    pub period: Period,
}

/// A route handler for creating a new budget, redirects to the budgets view
/// on success.
pub async fn create_budget_endpoint(
    State(mut state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let budget = NewBudget {
        user_id,
        category: form.category,
        amount: form.amount,
        period: form.period,
    };

    if let Err(error) = state.budget_store.create(budget) {
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
        (),
    )
        .into_response()
}
