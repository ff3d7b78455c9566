//! Monthly summaries of the transaction history and the CSV export.

mod export_endpoint;
mod reports_page;
mod summary;

pub use export_endpoint::export_transactions_endpoint;
pub use reports_page::get_reports_page;
pub use summary::{MonthlySummary, Totals, summarise_by_month, totals};
