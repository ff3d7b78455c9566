//! Search, sort and page state for a table, and the derivation of the visible rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::record::{CellValue, TableRecord};

/// The number of rows shown on each page of a table.
pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The column to sort by, if any, and in which direction.
///
/// With no key the rows keep the order they were given in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

/// The user controlled state of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    search: String,
    sort: SortState,
    page: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortState::default(),
            page: 1,
        }
    }
}

/// The rows of a table after filtering, sorting and paging.
#[derive(Debug, PartialEq)]
pub struct TableView<'a, R> {
    /// The rows on the current page.
    pub rows: Vec<&'a R>,
    /// The current page after clamping to the available pages.
    pub page: usize,
    pub total_pages: usize,
    /// The number of rows that matched the search.
    pub filtered_count: usize,
}

impl TableState {
    pub fn new(search: &str, sort: SortState, page: usize) -> Self {
        Self {
            search: search.to_owned(),
            sort,
            page: page.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// The requested page. It may be past the last page, see [TableView::page].
    pub fn page(&self) -> usize {
        self.page
    }

    /// Replace the search text and go back to the first page.
    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_owned();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Sort by `key`, flipping the direction if the table is already sorted by `key`.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort.key.as_deref() == Some(key) {
            self.sort.direction = self.sort.direction.flip();
        } else {
            self.sort = SortState {
                key: Some(key.to_owned()),
                direction: SortDirection::Ascending,
            };
        }
    }

    /// Filter, sort and page `records`.
    pub fn derive<'a, R: TableRecord>(&self, records: &'a [R]) -> TableView<'a, R> {
        let mut rows = filter_records(records, &self.search);
        sort_records(&mut rows, &self.sort);

        let filtered_count = rows.len();
        let (page_rows, page) = paginate(&rows, self.page);

        TableView {
            rows: page_rows.to_vec(),
            page,
            total_pages: total_pages(filtered_count),
            filtered_count,
        }
    }
}

/// Keep the records that match `search`, ignoring case and surrounding whitespace.
///
/// A record matches if its search blob or the text of any of its cells contains
/// the search text. An empty search matches every record.
pub fn filter_records<'a, R: TableRecord>(records: &'a [R], search: &str) -> Vec<&'a R> {
    let query = search.trim().to_lowercase();

    if query.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            record
                .search_blob()
                .is_some_and(|blob| blob.contains(&query))
                || record
                    .cells()
                    .iter()
                    .any(|(_, value)| value.to_string().to_lowercase().contains(&query))
        })
        .collect()
}

/// Stable sort of `records` by the column in `sort`.
///
/// Nulls come first when ascending and last when descending. Two numbers
/// compare numerically and anything else compares as lowercase text.
pub fn sort_records<R: TableRecord>(records: &mut [&R], sort: &SortState) {
    let Some(key) = sort.key.as_deref() else {
        return;
    };

    records.sort_by(|a, b| {
        let ordering = compare_cells(&a.cell(key), &b.cell(key));

        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Less,
        (_, CellValue::Null) => Ordering::Greater,
        (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
        (a, b) => a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()),
    }
}

/// The number of pages needed for `count` rows. There is always at least one page.
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Get the rows on `page` along with the page number after clamping it to the available pages.
pub fn paginate<T>(records: &[T], page: usize) -> (&[T], usize) {
    let page = page.clamp(1, total_pages(records.len()));
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(records.len());

    (&records[start..end], page)
}
