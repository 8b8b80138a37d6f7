//! Defines the endpoint for updating an existing budget.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error,
    auth::UserId,
    budget::{Budget, create_endpoint::BudgetForm},
    database_id::DatabaseID,
    endpoints,
    stores::{BudgetRepository, BudgetStore},
};

/// The state needed to update a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    /// The store for managing budgets.
    pub budget_store: BudgetRepository,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
        }
    }
}

/// A route handler for overwriting the budget with `budget_id`, redirects to
/// the budgets view on success.
///
/// The stored budget is fetched first so the edit keeps its creation
/// timestamp.
pub async fn edit_budget_endpoint(
    State(mut state): State<EditBudgetState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<DatabaseID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let budget = match state.budget_store.get(budget_id, user_id) {
        Ok(budget) => budget,
        Err(Error::NotFound) => return Error::UpdateMissingBudget.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    let budget = Budget {
        category: form.category,
        amount: form.amount,
        period: form.period,
        ..budget
    };

    if let Err(error) = state.budget_store.update(&budget) {
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
        (),
    )
        .into_response()
}
