//! Searchable, sortable and paginated tables with a create/edit modal.
//!
//! Pages describe their table with a [TableConfig] and supply rows that
//! implement [TableRecord]. The table state lives in the page URL, see
//! [TableQuery].

mod column;
mod config;
mod modal;
mod query;
mod record;
mod state;
mod view;

pub use column::Column;
pub use config::TableConfig;
pub use modal::ModalKind;
pub use query::TableQuery;
pub use record::{CellValue, TableRecord};
pub use view::{TableProps, table_view};
