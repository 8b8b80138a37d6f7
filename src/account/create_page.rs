//! Defines the route handler for the page for creating a new account.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// Renders the shared name, balance and date fields for the account forms.
pub(crate) fn account_form_fields(
    name: Option<&str>,
    balance: Option<f64>,
    date: Option<Date>,
    max_date: Date,
) -> Markup {
    let balance_value = balance.map(|balance| format!("{balance:.2}"));

    html!(
        div
        {
            label
                for="name"
                class=(FORM_LABEL_STYLE)
            {
                "Name"
            }

            input
                name="name"
                id="name"
                type="text"
                value=[name]
                placeholder="Everyday Checking"
                required
                autofocus[name.is_none()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="balance"
                class=(FORM_LABEL_STYLE)
            {
                "Balance"
            }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="balance"
                    id="balance"
                    type="number"
                    value=[balance_value]
                    step="0.01"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Balance as of"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(date.unwrap_or(max_date))
                max=(max_date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    )
}

fn create_account_view(max_date: Date) -> Markup {
    let create_account_route = endpoints::ACCOUNTS_API;
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = account_form_fields(None, None, None, max_date);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_account_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Create Account" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Account"
                }
            }
        }
    };

    base("Create Account", &[dollar_input_styles()], &content)
}

/// The state needed for the create account page.
#[derive(Debug, Clone)]
pub struct CreateAccountPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating an account.
pub async fn get_create_account_page(
    State(state): State<CreateAccountPageState>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let max_date = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    Ok(create_account_view(max_date).into_response())
}
