//! Query-side contracts between the surface, the root and its sections.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::{ConcatDataSource, EditingStyle, IndexPath, Surface};

/// What the surface asks of the composed data source.
///
/// All coordinates are flat surface coordinates.
pub trait DataSource<S: Surface> {
    fn section_count(&self) -> usize;
    fn item_count(&self, section: usize) -> usize;
    fn render(&self, surface: &mut S, path: IndexPath) -> S::Cell;
    fn render_supplementary(&self, surface: &mut S, kind: &str, path: IndexPath) -> S::View;
    fn title_for_header(&self, section: usize) -> Option<String>;
    fn title_for_footer(&self, section: usize) -> Option<String>;
    fn can_edit_item(&self, path: IndexPath) -> bool;
    fn commit_edit(&self, style: EditingStyle, path: IndexPath);
    fn can_move_item(&self, path: IndexPath) -> bool;
    fn move_item(&self, from: IndexPath, to: IndexPath);
    /// Returns `true` when some section handled the selection.
    fn did_select_item(&self, path: IndexPath) -> bool;
}

/// Capability set of one section hosted by a [`ConcatDataSource`].
///
/// Every coordinate handed to a section is local: `section` is always `0`
/// and `item` indexes into the section's own items. Only `item_count` and
/// `render` are mandatory; the remaining hooks default to declining.
pub trait SectionDataSource<S: Surface> {
    /// Called by the root on every `apply` that lists this section.
    fn set_parent(&self, parent: Weak<ConcatDataSource<S>>) {
        let _ = parent;
    }

    fn item_count(&self) -> usize;

    /// Panics when no cell can be produced for `path`.
    fn render(&self, surface: &mut S, path: IndexPath) -> S::Cell;

    fn render_supplementary(&self, surface: &mut S, kind: &str, path: IndexPath) -> Option<S::View> {
        let _ = (surface, kind, path);
        None
    }

    fn title_for_header(&self) -> Option<String> {
        None
    }

    fn title_for_footer(&self) -> Option<String> {
        None
    }

    fn can_edit_item(&self, path: IndexPath) -> bool {
        let _ = path;
        false
    }

    fn commit_edit(&self, style: EditingStyle, path: IndexPath) {
        let _ = (style, path);
    }

    /// `None` means the section has no opinion, which the root treats as
    /// not movable.
    fn can_move_item(&self, path: IndexPath) -> Option<bool> {
        let _ = path;
        None
    }

    fn move_item(&self, from: IndexPath, to: IndexPath) {
        let _ = (from, to);
    }

    fn did_select_item(&self, path: IndexPath) -> bool {
        let _ = path;
        false
    }
}

/// Reference-identity handle to a section.
///
/// Two handles are equal only when they point at the same allocation, so
/// structurally identical sections are never mistaken for one another when
/// the root diffs its children.
pub struct SectionHandle<S: Surface>(Rc<dyn SectionDataSource<S>>);

impl<S: Surface> SectionHandle<S> {
    pub fn new(source: Rc<dyn SectionDataSource<S>>) -> Self {
        Self(source)
    }

    pub fn source(&self) -> &dyn SectionDataSource<S> {
        &*self.0
    }

    /// Whether this handle points at `section`.
    pub fn is<D: ?Sized>(&self, section: &D) -> bool {
        self.address() == section as *const D as *const ()
    }

    fn address(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl<S, D> From<Rc<D>> for SectionHandle<S>
where
    S: Surface,
    D: SectionDataSource<S> + 'static,
{
    fn from(source: Rc<D>) -> Self {
        Self(source)
    }
}

impl<S: Surface> Clone for SectionHandle<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S: Surface> PartialEq for SectionHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<S: Surface> Eq for SectionHandle<S> {}

impl<S: Surface> Hash for SectionHandle<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<S: Surface> fmt::Debug for SectionHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionHandle({:p})", self.address())
    }
}
