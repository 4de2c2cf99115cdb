//! Sequence differ shared by both composer levels.
//!
//! [`diff`] computes a longest-common-subsequence alignment between two
//! ordered, duplicate-free identifier lists and then infers moves: an identifier removed at
//! one position and inserted at another is reported once as a [`Move`]
//! instead of a removal plus an insertion.
//!
//! Removal and move-source indices refer to the old sequence, insertion and
//! move-destination indices to the new one, which is exactly how a batch of
//! surface mutations is addressed.

use std::hash::Hash;

use crate::collections::map_with_capacity;

/// An identifier that changed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

/// Minimal edit script turning one sequence into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    /// Positions in the new sequence, ascending.
    pub inserted: Vec<usize>,
    /// Positions in the old sequence, ascending.
    pub removed: Vec<usize>,
    /// Moves ordered by destination.
    pub moved: Vec<Move>,
}

impl EditScript {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.inserted.len() + self.removed.len() + self.moved.len()
    }

    /// Rebuilds the target sequence from `old` using batch semantics.
    ///
    /// Inserted elements are taken from `new`. Panics if the script does not
    /// describe a valid transformation of `old` into a sequence of
    /// `new.len()` elements.
    pub fn replay<T: Clone>(&self, old: &[T], new: &[T]) -> Vec<T> {
        let mut slots: Vec<Option<T>> = vec![None; new.len()];
        let mut consumed = vec![false; old.len()];

        for &index in &self.removed {
            consumed[index] = true;
        }
        for &index in &self.inserted {
            slots[index] = Some(new[index].clone());
        }
        for step in &self.moved {
            assert!(
                slots[step.to].is_none(),
                "move destination {} is already occupied",
                step.to
            );
            consumed[step.from] = true;
            slots[step.to] = Some(old[step.from].clone());
        }

        let mut survivors = old
            .iter()
            .zip(&consumed)
            .filter(|(_, consumed)| !**consumed)
            .map(|(value, _)| value.clone());
        let result: Vec<T> = slots
            .into_iter()
            .map(|slot| {
                slot.or_else(|| survivors.next())
                    .expect("edit script leaves a position unfilled")
            })
            .collect();
        assert!(
            survivors.next().is_none(),
            "edit script leaves surviving elements without a position"
        );
        result
    }
}

/// Computes the edit script that turns `old` into `new`.
///
/// Both slices must be free of duplicates. Equal-cost alignments keep the
/// identifiers that come first in `new` in place, so the result only depends
/// on the inputs.
pub fn diff<T: Hash + Eq>(old: &[T], new: &[T]) -> EditScript {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(left, right)| left == right)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(left, right)| left == right)
        .count();

    let old_window = &old[prefix..old.len() - suffix];
    let new_window = &new[prefix..new.len() - suffix];
    if old_window.is_empty() && new_window.is_empty() {
        return EditScript::default();
    }

    let (raw_removed, raw_inserted) = align(old_window, new_window, prefix);

    let mut removed_at = map_with_capacity(raw_removed.len());
    for &index in &raw_removed {
        removed_at.insert(&old[index], index);
    }

    let mut script = EditScript::default();
    for index in raw_inserted {
        match removed_at.remove(&new[index]) {
            Some(from) => script.moved.push(Move { from, to: index }),
            None => script.inserted.push(index),
        }
    }
    script.removed = raw_removed
        .into_iter()
        .filter(|index| removed_at.contains_key(&old[*index]))
        .collect();
    script
}

/// Aligns the trimmed windows on a longest common subsequence. Returned
/// indices are absolute.
///
/// Identifiers are unique, so a common subsequence is a run of shared
/// identifiers whose old positions increase in new order. The longest one is
/// found with a patience pass in O(n log n) time and linear memory.
fn align<T: Hash + Eq>(old: &[T], new: &[T], offset: usize) -> (Vec<usize>, Vec<usize>) {
    let mut old_position = map_with_capacity(old.len());
    for (index, item) in old.iter().enumerate() {
        old_position.insert(item, index);
    }
    // (new index, old index) of every identifier present on both sides.
    let shared: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(j, item)| old_position.get(item).map(|&i| (j, i)))
        .collect();
    let origins: Vec<usize> = shared.iter().map(|&(_, i)| i).collect();

    let mut kept_old = vec![false; old.len()];
    let mut kept_new = vec![false; new.len()];
    for (&(j, i), kept) in shared.iter().zip(longest_increasing(&origins)) {
        if kept {
            kept_old[i] = true;
            kept_new[j] = true;
        }
    }

    let removed = (0..old.len())
        .filter(|&i| !kept_old[i])
        .map(|i| offset + i)
        .collect();
    let inserted = (0..new.len())
        .filter(|&j| !kept_new[j])
        .map(|j| offset + j)
        .collect();
    (removed, inserted)
}

/// Marks one longest strictly increasing subsequence of `values`.
///
/// Among equally long candidates the one ending at the earliest position
/// wins, so identifiers that come first in the new order stay in place.
fn longest_increasing(values: &[usize]) -> Vec<bool> {
    // tails[k]: position of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = Vec::with_capacity(values.len());
    let mut end = None;
    for (position, &value) in values.iter().enumerate() {
        let length = tails.partition_point(|&tail| values[tail] < value);
        previous.push(length.checked_sub(1).map(|k| tails[k]));
        if length == tails.len() {
            tails.push(position);
            end = Some(position);
        } else {
            tails[length] = position;
        }
    }

    let mut kept = vec![false; values.len()];
    let mut cursor = end;
    while let Some(position) = cursor {
        kept[position] = true;
        cursor = previous[position];
    }
    kept
}
