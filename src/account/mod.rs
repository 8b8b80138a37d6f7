//! Bank and cash accounts with their running balances.

mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;

pub use accounts_page::{AccountsViewState, get_accounts_page};
pub use core::{
    Account, create_account, create_account_table, delete_account, get_account, get_accounts,
    get_total_account_balance, map_account_row, update_account,
};
pub use create_endpoint::{CreateAccountState, create_account_endpoint};
pub use create_page::{CreateAccountPageState, get_create_account_page};
pub use delete_endpoint::{DeleteAccountState, delete_account_endpoint};
pub use edit_endpoint::{EditAccountState, edit_account_endpoint};
pub use edit_page::{EditAccountPageState, get_edit_account_page};
