#![doc = r"Diffing and reconciliation engine for composable list sections."]

pub mod collections;
pub mod concat;
pub mod data_source;
pub mod diff;
pub mod index_path;
pub mod section;
pub mod snapshot;
pub mod static_section;
pub mod surface;

pub use concat::{ConcatDataSource, SectionsSnapshot};
pub use data_source::{DataSource, SectionDataSource, SectionHandle};
pub use diff::{diff, EditScript, Move};
pub use index_path::IndexPath;
pub use section::{CellProvider, DiffableSection, SupplementaryViewProvider};
pub use snapshot::Snapshot;
pub use static_section::StaticSection;
pub use surface::{Completion, EditingStyle, RowAnimation, Surface};

use std::fmt;

/// Errors returned by the recoverable parts of the composer API.
///
/// Contract violations (duplicate identifiers, out-of-range coordinates,
/// missing cells) are not represented here; those panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatError {
    AlreadyAttached,
}

impl fmt::Display for ConcatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcatError::AlreadyAttached => {
                write!(f, "data source is already attached to a surface")
            }
        }
    }
}

impl std::error::Error for ConcatError {}

/// Shared contract of the two composer levels.
///
/// A composer owns an ordered list of identifiers and reconciles it against
/// each applied [`Snapshot`], mutating its surface with the minimal edit
/// script when attached.
pub trait Composer {
    type Item: std::hash::Hash + Eq + Clone + fmt::Debug;

    fn apply(&self, snapshot: Snapshot<Self::Item>, animate: bool, completion: Option<Completion>);

    fn snapshot(&self) -> Snapshot<Self::Item>;

    fn empty_snapshot(&self) -> Snapshot<Self::Item> {
        Snapshot::new()
    }
}

#[cfg(test)]
#[path = "tests/index_path_tests.rs"]
mod index_path_tests;
