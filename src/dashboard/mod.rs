//! The dashboard summarising the user's finances for the current month.

mod dashboard_page;

pub use dashboard_page::{DashboardState, get_dashboard_page};
