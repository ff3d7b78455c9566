use super::{
    column::Column,
    modal::{ModalKind, ModalState},
};

/// The static description of a table on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub title: &'static str,
    /// The path of the page that shows the table, used to build links.
    pub path: &'static str,
    pub columns: Vec<Column>,
    /// The kind of modal to open when the user asks to add a record.
    pub add_kind: ModalKind,
}

impl TableConfig {
    /// Open `modal` for creating a new record of this table's kind.
    pub fn on_add<R>(&self, modal: &mut ModalState<R>) {
        modal.open(self.add_kind, None);
    }
}
