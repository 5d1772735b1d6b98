//! Bulk-action selection state.
//!
//! # Invariants
//! - Ids keep the order they were selected in and appear at most once.
//! - Ids are never checked against a store; stale ids are kept until
//!   [`SelectionSet::retain_existing`] prunes them.

use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<Uuid>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Flips membership of `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if let Some(index) = self.ids.iter().position(|selected| *selected == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Replaces the selection with the given ids (duplicates collapse).
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = Uuid>,
    {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops ids missing from `current`; returns how many were removed.
    pub fn retain_existing(&mut self, current: &[Uuid]) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| current.contains(id));
        before - self.ids.len()
    }

    /// True when `current` is non-empty and every id in it is selected.
    pub fn all_selected_of(&self, current: &[Uuid]) -> bool {
        !current.is_empty() && current.iter().all(|id| self.contains(*id))
    }

    /// True when some, but not all, of `current` is selected.
    pub fn partially_selected_of(&self, current: &[Uuid]) -> bool {
        current.iter().any(|id| self.contains(*id)) && !self.all_selected_of(current)
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
