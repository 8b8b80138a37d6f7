//! Alert messages for displaying success and error notifications to users.
//!
//! Endpoints called via htmx return these as HTML fragments which the client
//! swaps into the alert container at the bottom of the page.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const SUCCESS_STYLE: &str = "w-full p-4 mb-4 text-sm text-green-800 rounded-lg \
    bg-green-50 dark:bg-gray-800 dark:text-green-400 border border-green-300 \
    dark:border-green-800 shadow";

const ERROR_STYLE: &str = "w-full p-4 mb-4 text-sm text-red-800 rounded-lg \
    bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300 \
    dark:border-red-800 shadow";

/// An alert message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Indicates an operation completed successfully.
    Success {
        /// A short summary of what succeeded.
        message: String,
        /// Extra detail, e.g. counts or timing.
        details: String,
    },
    /// A success alert without details.
    SuccessSimple {
        /// A short summary of what succeeded.
        message: String,
    },
    /// Indicates an operation failed.
    Error {
        /// A short summary of what went wrong.
        message: String,
        /// Extra detail, e.g. how the user can fix the problem.
        details: String,
    },
    /// An error alert without details.
    ErrorSimple {
        /// A short summary of what went wrong.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
            Alert::ErrorSimple { message } => (ERROR_STYLE, message, String::new()),
        };

        html! {
            div class=(style) role="alert"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty()
                {
                    p { (details) }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn success_alert_renders_message_and_details() {
        let alert = Alert::Success {
            message: "Budget created".to_owned(),
            details: "You can edit it from the budgets page.".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());
        let paragraph_selector = Selector::parse("div[role=alert] > p").unwrap();
        let paragraphs: Vec<String> = html
            .select(&paragraph_selector)
            .map(|p| p.text().collect())
            .collect();

        assert_eq!(
            paragraphs,
            vec![
                "Budget created".to_owned(),
                "You can edit it from the budgets page.".to_owned()
            ],
            "want alert with message and details paragraphs, got {paragraphs:?}"
        );
    }

    #[test]
    fn simple_error_alert_omits_details_paragraph() {
        let alert = Alert::ErrorSimple {
            message: "Something went wrong".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());
        let paragraph_selector = Selector::parse("div[role=alert] > p").unwrap();
        let paragraph_count = html.select(&paragraph_selector).count();

        assert_eq!(
            paragraph_count, 1,
            "want one paragraph for a simple alert, got {paragraph_count}"
        );
    }
}
