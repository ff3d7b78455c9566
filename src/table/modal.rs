use serde::{Deserialize, Serialize};

/// The kinds of records that can be created or edited in a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    Income,
    User,
}

/// Whether the create/edit modal of a table is open, and for which record.
///
/// The fields can only change through [ModalState::open] and [ModalState::close],
/// so a closed modal never has a kind or a selected record.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalState<R> {
    kind: Option<ModalKind>,
    selected: Option<R>,
}

impl<R> Default for ModalState<R> {
    fn default() -> Self {
        Self {
            kind: None,
            selected: None,
        }
    }
}

impl<R> ModalState<R> {
    /// Open the modal, replacing whatever it was showing before.
    ///
    /// `selected` is the record to edit, or `None` to create a new record.
    pub fn open(&mut self, kind: ModalKind, selected: Option<R>) {
        self.kind = Some(kind);
        self.selected = selected;
    }

    pub fn close(&mut self) {
        self.kind = None;
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Option<ModalKind> {
        self.kind
    }

    pub fn selected(&self) -> Option<&R> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::{ModalKind, ModalState};

    #[test]
    fn starts_closed() {
        let modal = ModalState::<i64>::default();

        assert!(!modal.is_open());
        assert_eq!(modal.kind(), None);
        assert_eq!(modal.selected(), None);
    }

    #[test]
    fn close_resets_kind_and_selection() {
        let mut modal = ModalState::default();
        modal.open(ModalKind::User, Some(7));

        modal.close();

        assert!(!modal.is_open());
        assert_eq!(modal.kind(), None);
        assert_eq!(modal.selected(), None);
    }

    #[test]
    fn reopening_overwrites_previous_state() {
        let mut modal = ModalState::default();
        modal.open(ModalKind::User, Some(7));

        modal.open(ModalKind::Income, None);

        assert!(modal.is_open());
        assert_eq!(modal.kind(), Some(ModalKind::Income));
        assert_eq!(modal.selected(), None);
    }
}
