//! The values a table can display and the trait for rows of a table.

use std::fmt::Display;

/// A value in a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A missing value.
    Null,
    Number(f64),
    Text(String),
    /// A group of named values, e.g. an owner's name and email.
    Nested(Vec<(String, CellValue)>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Null is an empty string, numbers use their shortest decimal form and nested
/// values are joined by a single space.
impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Number(number) => write!(f, "{number}"),
            CellValue::Text(text) => write!(f, "{text}"),
            CellValue::Nested(values) => {
                let joined = values
                    .iter()
                    .map(|(_, value)| value.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");

                write!(f, "{joined}")
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// A row that can be searched, sorted and displayed in a table.
pub trait TableRecord {
    /// The stable identifier of the record, used as the target of edits and deletes.
    fn id(&self) -> Option<i64>;

    /// Every cell of the record, keyed by column key.
    fn cells(&self) -> Vec<(&'static str, CellValue)>;

    /// The value for the column `key`, or [CellValue::Null] if the record has no such column.
    fn cell(&self, key: &str) -> CellValue {
        self.cells()
            .into_iter()
            .find(|(cell_key, _)| *cell_key == key)
            .map_or(CellValue::Null, |(_, value)| value)
    }

    /// Precomputed, lowercase text to match search queries against.
    fn search_blob(&self) -> Option<String> {
        None
    }

    /// The text to show for the column `key`.
    fn display_cell(&self, key: &str) -> String {
        self.cell(key).to_string()
    }
}
