//! Income and expense records, the transactions page and the transaction API.

mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod list_endpoint;
mod transactions_page;

pub use create_endpoint::create_transaction_endpoint;
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_owned_transactions,
    get_transactions, update_transaction,
};
pub use delete_endpoint::delete_transaction_endpoint;
pub use domain::{
    NewTransaction, OwnedTransaction, Transaction, TransactionForm, TransactionID,
    TransactionScope,
};
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use transactions_page::get_transactions_page;
