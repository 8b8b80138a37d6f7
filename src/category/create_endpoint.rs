//! Defines the endpoint for creating a new category.

use std::sync::{Arc, Mutex};

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
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, auth::UserId, category::create_category, endpoints,
    transaction::TransactionKind,
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub kind: TransactionKind,
}

/// A route handler for creating a new category, redirects to the categories
/// view on success.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_category(&form.name, form.kind, user_id, &connection));

    if let Err(error) = result {
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
        (),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;

    use crate::{
        auth::UserId, category::get_categories, db::initialize,
        test_utils::parse_html_fragment, transaction::TransactionKind,
    };

    use super::{CategoryForm, CreateCategoryState, create_category_endpoint};

    fn get_test_state() -> CreateCategoryState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn creates_category_and_redirects() {
        let state = get_test_state();
        let user_id = UserId::new(1);
        let form = CategoryForm {
            name: "subscriptions".to_owned(),
            kind: TransactionKind::Expense,
        };

        let response =
            create_category_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(location, "/categories");

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories(user_id, &connection).unwrap();
        assert_eq!(
            categories.len(),
            1,
            "want 1 category, got {}",
            categories.len()
        );
        assert_eq!(categories[0].name, "subscriptions");
    }

    #[tokio::test]
    async fn empty_name_returns_bad_request() {
        let state = get_test_state();
        let form = CategoryForm {
            name: "   ".to_owned(),
            kind: TransactionKind::Expense,
        };

        let response =
            create_category_endpoint(State(state), Extension(UserId::new(1)), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let fragment = parse_html_fragment(response).await;
        let text = fragment.root_element().text().collect::<String>();
        assert!(
            text.to_lowercase().contains("category"),
            "want an alert mentioning the category name, got {text}"
        );
    }
}
