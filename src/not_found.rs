//! Defines the 404 Not Found page and route handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// The error page shown when a resource cannot be found.
pub struct NotFoundError;

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            error_view(
                "Not Found",
                "404",
                "Sorry, the page you were looking for does not exist.",
                "Check the URL for typos, or head back to the dashboard.",
            ),
        )
            .into_response()
    }
}

/// Route handler for unmatched routes.
pub async fn get_404_not_found() -> Response {
    NotFoundError.into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::parse_html_document;

    use super::NotFoundError;

    #[tokio::test]
    async fn renders_404_page() {
        let response = NotFoundError.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("404"),
            "want page text to contain \"404\", got {text:?}"
        );
    }
}
