//! Recording, browsing, editing and exporting income and expense transactions.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod export_endpoint;
mod form;
mod transactions_page;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, map_transaction_row,
    update_transaction,
};
pub use create_endpoint::{CreateTransactionState, create_transaction_endpoint};
pub use create_page::{CreateTransactionPageState, get_create_transaction_page};
pub use delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint};
pub use edit_endpoint::{EditTransactionState, edit_transaction_endpoint};
pub use edit_page::{EditTransactionPageState, get_edit_transaction_page};
pub use export_endpoint::{ExportTransactionsState, export_transactions_endpoint};
pub use transactions_page::{TransactionsViewState, get_transactions_page};
