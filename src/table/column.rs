/// Describes a column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The key used to look up the column's value in a [super::TableRecord].
    pub key: &'static str,
    /// The text shown in the column header.
    pub label: &'static str,
    pub sortable: bool,
}

impl Column {
    /// A sortable column.
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
        }
    }

    /// A column that cannot be sorted by clicking its header.
    pub const fn unsortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
        }
    }
}
