//! The page explaining how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{LINK_STYLE, base},
};

/// Display the page with password reset instructions.
///
/// Passwords are reset with the `reset_password` program on the machine
/// hosting the server, so this page only explains the steps.
pub async fn get_forgot_password_page() -> Response {
    let content = html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        "Forgot your password?"
                    }

                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "Passwords can only be reset from the machine hosting the server. \
                        Ask the person running the server to run the "
                        code { "reset_password" }
                        " program against the application's database file and follow the prompts."
                    }

                    p class="text-gray-500 dark:text-gray-400"
                    {
                        a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Back to log in" }
                    }
                }
            }
        }
    };

    base("Forgot Password", &[], &content).into_response()
}

#[cfg(test)]
mod forgot_password_tests {
    use axum::http::StatusCode;

    use crate::{
        auth::get_forgot_password_page,
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    #[tokio::test]
    async fn page_renders_with_reset_instructions_and_log_in_link() {
        let response = get_forgot_password_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let code_selector = scraper::Selector::parse("code").unwrap();
        let code_text = document
            .select(&code_selector)
            .flat_map(|element| element.text())
            .collect::<String>();
        assert_eq!(code_text, "reset_password");

        let link_selector = scraper::Selector::parse("a[href]").unwrap();
        let hrefs = document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .collect::<Vec<_>>();
        assert!(
            hrefs.contains(&endpoints::LOG_IN_VIEW),
            "want link to {}, got {:?}",
            endpoints::LOG_IN_VIEW,
            hrefs
        );
    }
}
