//! Table state carried in the URL query string.
//!
//! Every user action on a table (searching, sorting, changing page, opening
//! the create or edit modal) is a link or GET form to the same page with an
//! updated query string.

use serde::{Deserialize, Serialize};

use super::{
    config::TableConfig,
    modal::{ModalKind, ModalState},
    record::TableRecord,
    state::{SortDirection, SortState, TableState},
};

/// The query parameters of a page with a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal: Option<ModalKind>,
    /// The ID of the record to edit in the modal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<i64>,
}

impl TableQuery {
    /// The query for `state` with the modal closed.
    pub fn from_state(state: &TableState) -> Self {
        let search = state.search();
        let sort = state.sort();

        Self {
            search: (!search.is_empty()).then(|| search.to_owned()),
            sort: sort.key.clone(),
            direction: sort.key.as_ref().map(|_| sort.direction),
            page: (state.page() > 1).then_some(state.page()),
            modal: None,
            selected: None,
        }
    }

    pub fn table_state(&self) -> TableState {
        let sort = SortState {
            key: self.sort.clone().filter(|key| !key.is_empty()),
            direction: self.direction.unwrap_or_default(),
        };

        TableState::new(
            self.search.as_deref().unwrap_or_default(),
            sort,
            self.page.unwrap_or(1),
        )
    }

    pub fn with_modal(mut self, kind: ModalKind, selected: Option<i64>) -> Self {
        self.modal = Some(kind);
        self.selected = selected;
        self
    }

    /// The link to `path` with this query.
    pub fn to_url(&self, path: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{path}?{query}"),
            Ok(_) => path.to_owned(),
            Err(error) => {
                tracing::error!("Could not encode table query {self:?}: {error}");
                path.to_owned()
            }
        }
    }

    /// The modal requested by this query.
    ///
    /// The modal stays closed if the requested kind does not belong to the
    /// table or the selected record is not in `records`.
    pub fn modal_state<R: TableRecord + Clone>(
        &self,
        config: &TableConfig,
        records: &[R],
    ) -> ModalState<R> {
        let mut modal = ModalState::default();

        match (self.modal, self.selected) {
            (Some(kind), Some(id)) if kind == config.add_kind => {
                if let Some(record) = records.iter().find(|record| record.id() == Some(id)) {
                    modal.open(kind, Some(record.clone()));
                }
            }
            (Some(kind), None) if kind == config.add_kind => config.on_add(&mut modal),
            _ => {}
        }

        modal
    }
}
