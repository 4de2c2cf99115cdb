//! Presentation surface abstraction.
//!
//! The surface is the list or grid widget that displays the composed
//! sections. The engine never renders anything itself: it only tells the
//! surface which rows and sections were inserted, removed, moved or need to
//! be reloaded, and answers the surface's queries through
//! [`DataSource`](crate::DataSource).

use crate::IndexPath;

/// Callback invoked once the surface has visually committed a transaction.
pub type Completion = Box<dyn FnOnce() + 'static>;

/// Animation hint forwarded with every row and section mutation.
///
/// Surfaces without per-row animation styles are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowAnimation {
    #[default]
    Automatic,
    Fade,
    Left,
    Right,
    Top,
    Bottom,
    Middle,
    None,
}

/// Editing action committed by the user on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditingStyle {
    Delete,
    Insert,
}

/// Mutation side of the presentation surface.
///
/// Batch semantics follow the usual list-widget contract: inside one
/// `begin_batch`/`end_batch` pair, deletions and move sources are addressed
/// in pre-batch coordinates while insertions and move destinations are
/// addressed in post-batch coordinates.
pub trait Surface {
    /// Cell handle produced by item cell providers.
    type Cell;
    /// Header, footer or decoration view handle.
    type View;

    /// Whether the surface can animate incremental updates. When `false`
    /// the composers fall back to [`Surface::full_reload`].
    fn supports_incremental_updates(&self) -> bool {
        true
    }

    /// Runs `body` inside a visual transaction.
    ///
    /// No mutation issued inside `body` may animate when `animated` is
    /// `false`. `completion` must fire exactly once after everything issued
    /// in `body` has been committed, including when `body` issued nothing.
    ///
    /// The surface never invokes `completion` from inside this call: the
    /// caller still holds the surface borrowed, and completions may apply
    /// follow-up snapshots. A surface that commits synchronously returns the
    /// completion instead, and the caller runs it once the borrow is
    /// released. A surface that commits later keeps it and returns `None`.
    #[must_use = "a returned completion has to be invoked by the caller"]
    fn run_transaction(
        &mut self,
        animated: bool,
        completion: Option<Completion>,
        body: impl FnOnce(&mut Self),
    ) -> Option<Completion>
    where
        Self: Sized;

    fn begin_batch(&mut self);
    fn end_batch(&mut self);

    /// Issues `updates` as one atomic batch.
    fn batch_updates(&mut self, updates: impl FnOnce(&mut Self))
    where
        Self: Sized,
    {
        self.begin_batch();
        updates(self);
        self.end_batch();
    }

    fn insert_sections(&mut self, sections: &[usize], animation: RowAnimation);
    fn delete_sections(&mut self, sections: &[usize], animation: RowAnimation);
    fn move_section(&mut self, from: usize, to: usize);
    fn reload_sections(&mut self, sections: &[usize], animation: RowAnimation);

    fn insert_items(&mut self, paths: &[IndexPath], animation: RowAnimation);
    fn delete_items(&mut self, paths: &[IndexPath], animation: RowAnimation);
    fn move_item(&mut self, from: IndexPath, to: IndexPath);
    fn reload_items(&mut self, paths: &[IndexPath], animation: RowAnimation);

    /// Discards everything the surface shows and queries the data source
    /// again from scratch.
    fn full_reload(&mut self);

    fn deselect_item(&mut self, path: IndexPath, animated: bool) {
        let _ = (path, animated);
    }
}
