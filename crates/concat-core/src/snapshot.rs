//! Target state handed to a composer's `apply`.
//!
//! A [`Snapshot`] is an ordered set of identifiers plus the identifiers whose
//! content changed and must be reloaded in place. Identity is whatever `Eq`
//! and `Hash` say it is: value equality for items, allocation identity for
//! [`SectionHandle`](crate::SectionHandle)s.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;

/// Ordered, duplicate-free description of what a composer should display.
///
/// Every builder method panics on caller bugs (duplicates, unknown anchors)
/// instead of producing a state the surface could not represent.
#[derive(Clone)]
pub struct Snapshot<T> {
    elements: IndexSet<T>,
    pending_reloads: IndexSet<T>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            elements: IndexSet::new(),
            pending_reloads: IndexSet::new(),
        }
    }
}

impl<T> Snapshot<T>
where
    T: Hash + Eq + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `items` after the current last element.
    pub fn append(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push_unique(item);
        }
    }

    /// Inserts `items`, in order, right after `anchor`.
    pub fn insert_after(&mut self, items: impl IntoIterator<Item = T>, anchor: &T) {
        let index = self.anchor_index(anchor, "insert after") + 1;
        self.insert_at(index, items);
    }

    /// Inserts `items`, in order, right before `anchor`.
    pub fn insert_before(&mut self, items: impl IntoIterator<Item = T>, anchor: &T) {
        let index = self.anchor_index(anchor, "insert before");
        self.insert_at(index, items);
    }

    /// Removes `items`. Identifiers that are not part of the snapshot are
    /// ignored. Removed identifiers are also dropped from the pending reloads.
    pub fn delete<'a>(&mut self, items: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for item in items {
            self.elements.shift_remove(item);
            self.pending_reloads.shift_remove(item);
        }
    }

    /// Removes every element but keeps the pending reloads, so a snapshot
    /// can be rebuilt from scratch after marking reloads. Reloads whose
    /// identifiers are not appended again panic on `apply`.
    pub fn delete_all(&mut self) {
        self.elements.clear();
    }

    /// Moves `item` so that it directly follows `anchor`.
    pub fn move_after(&mut self, item: &T, anchor: &T) {
        if item == anchor {
            return;
        }
        let value = self.take_for_move(item, anchor);
        let index = self.anchor_index(anchor, "move after") + 1;
        self.elements.shift_insert(index, value);
    }

    /// Moves `item` so that it directly precedes `anchor`.
    pub fn move_before(&mut self, item: &T, anchor: &T) {
        if item == anchor {
            return;
        }
        let value = self.take_for_move(item, anchor);
        let index = self.anchor_index(anchor, "move before");
        self.elements.shift_insert(index, value);
    }

    /// Marks `items` for an in-place content reload on the next `apply`.
    pub fn reload_items(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            assert!(
                self.elements.contains(&item),
                "cannot reload {item:?}: identifier is not part of the snapshot"
            );
            self.pending_reloads.insert(item);
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.elements.contains(item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.elements.get_index_of(item)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn items(&self) -> Vec<T> {
        self.elements.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.elements.iter()
    }

    pub fn pending_reloads(&self) -> Vec<T> {
        self.pending_reloads.iter().cloned().collect()
    }

    /// Splits the snapshot into its ordered elements and pending reloads.
    pub fn into_parts(self) -> (Vec<T>, Vec<T>) {
        (
            self.elements.into_iter().collect(),
            self.pending_reloads.into_iter().collect(),
        )
    }

    fn push_unique(&mut self, item: T) {
        if self.elements.contains(&item) {
            panic!("duplicate identifier {item:?} in snapshot");
        }
        self.elements.insert(item);
    }

    fn insert_at(&mut self, mut index: usize, items: impl IntoIterator<Item = T>) {
        for item in items {
            if self.elements.contains(&item) {
                panic!("duplicate identifier {item:?} in snapshot");
            }
            self.elements.shift_insert(index, item);
            index += 1;
        }
    }

    fn anchor_index(&self, anchor: &T, action: &str) -> usize {
        match self.elements.get_index_of(anchor) {
            Some(index) => index,
            None => panic!("cannot {action} {anchor:?}: anchor is not part of the snapshot"),
        }
    }

    fn take_for_move(&mut self, item: &T, anchor: &T) -> T {
        if !self.elements.contains(anchor) {
            panic!("cannot move {item:?} next to {anchor:?}: anchor is not part of the snapshot");
        }
        match self.elements.shift_take(item) {
            Some(value) => value,
            None => panic!("cannot move {item:?}: identifier is not part of the snapshot"),
        }
    }
}

impl<T> FromIterator<T> for Snapshot<T>
where
    T: Hash + Eq + Clone + fmt::Debug,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        snapshot.append(iter);
        snapshot
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("elements", &self.elements)
            .field("pending_reloads", &self.pending_reloads)
            .finish()
    }
}
