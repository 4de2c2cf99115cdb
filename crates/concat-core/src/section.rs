//! Diffable section: the item-level composer.
//!
//! A [`DiffableSection`] owns the ordered identifiers of one section. Until
//! a [`ConcatDataSource`] lists it (and that root is bound to a live
//! surface), `apply` just replaces the identifiers. Afterwards every `apply`
//! diffs the old identifiers against the snapshot and sends the surface one
//! structural batch followed by one reload batch.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::data_source::SectionDataSource;
use crate::{
    diff, Completion, Composer, ConcatDataSource, EditingStyle, IndexPath, RowAnimation, Snapshot,
    Surface,
};

/// Produces the cell for an item. Returning `None` for an item the section
/// owns is a contract violation.
pub type CellProvider<T, S> = Box<dyn Fn(&mut S, IndexPath, &T) -> Option<<S as Surface>::Cell>>;

/// Produces header, footer or decoration views for a section.
pub type SupplementaryViewProvider<S> =
    Rc<dyn Fn(&mut S, &str, IndexPath) -> Option<<S as Surface>::View>>;

type SelectionHandler<T> = Rc<dyn Fn(&T)>;
type EditHandler<T> = Rc<dyn Fn(EditingStyle, &T)>;
type ReorderHandler<T> = Rc<dyn Fn(&T, usize, usize)>;

pub struct DiffableSection<T, S: Surface> {
    elements: RefCell<Vec<T>>,
    cell_provider: CellProvider<T, S>,
    parent: RefCell<Option<Weak<ConcatDataSource<S>>>>,
    supplementary_provider: RefCell<Option<SupplementaryViewProvider<S>>>,
    header_title: RefCell<Option<String>>,
    footer_title: RefCell<Option<String>>,
    default_row_animation: Cell<RowAnimation>,
    selection_handler: RefCell<Option<SelectionHandler<T>>>,
    edit_handler: RefCell<Option<EditHandler<T>>>,
    reorder_handler: RefCell<Option<ReorderHandler<T>>>,
}

impl<T, S> DiffableSection<T, S>
where
    T: Hash + Eq + Clone + fmt::Debug + 'static,
    S: Surface + 'static,
{
    pub fn new(cell_provider: impl Fn(&mut S, IndexPath, &T) -> Option<S::Cell> + 'static) -> Self {
        Self {
            elements: RefCell::new(Vec::new()),
            cell_provider: Box::new(cell_provider),
            parent: RefCell::new(None),
            supplementary_provider: RefCell::new(None),
            header_title: RefCell::new(None),
            footer_title: RefCell::new(None),
            default_row_animation: Cell::new(RowAnimation::default()),
            selection_handler: RefCell::new(None),
            edit_handler: RefCell::new(None),
            reorder_handler: RefCell::new(None),
        }
    }

    /// Replaces the section's identifiers with the snapshot's, animating the
    /// difference when the section is attached to a surface.
    pub fn apply(&self, snapshot: Snapshot<T>, animate: bool, completion: Option<Completion>) {
        let (new_elements, reloads) = snapshot.into_parts();
        let Some((surface, section)) = self.attachment() else {
            log::debug!(
                "section is detached, replacing {} items without surface updates",
                new_elements.len()
            );
            *self.elements.borrow_mut() = new_elements;
            if let Some(completion) = completion {
                completion();
            }
            return;
        };

        let animation = self.default_row_animation.get();
        let ready = surface.borrow_mut().run_transaction(animate, completion, move |surface: &mut S| {
            if !surface.supports_incremental_updates() {
                log::warn!("surface cannot apply incremental updates, reloading section {section}");
                *self.elements.borrow_mut() = new_elements;
                surface.full_reload();
                return;
            }

            let script = diff(self.elements.borrow().as_slice(), &new_elements);
            *self.elements.borrow_mut() = new_elements;

            if !script.is_empty() {
                log::debug!(
                    "section {section}: {} inserted, {} removed, {} moved",
                    script.inserted.len(),
                    script.removed.len(),
                    script.moved.len()
                );
                let inserted = paths_in(section, &script.inserted);
                let removed = paths_in(section, &script.removed);
                surface.batch_updates(|surface| {
                    if !inserted.is_empty() {
                        surface.insert_items(&inserted, animation);
                    }
                    if !removed.is_empty() {
                        surface.delete_items(&removed, animation);
                    }
                    for step in &script.moved {
                        log::trace!("section {section}: move item {} -> {}", step.from, step.to);
                        surface.move_item(
                            IndexPath::new(section, step.from),
                            IndexPath::new(section, step.to),
                        );
                    }
                });
            }

            if !reloads.is_empty() {
                let reloaded = self.reload_paths(section, &reloads);
                log::debug!("section {section}: reloading {} items", reloaded.len());
                surface.batch_updates(|surface| surface.reload_items(&reloaded, animation));
            }
        });
        if let Some(completion) = ready {
            completion();
        }
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.elements.borrow().iter().cloned().collect()
    }

    pub fn empty_snapshot(&self) -> Snapshot<T> {
        Snapshot::new()
    }

    /// Identifier at a local position. Panics when `index` is out of range.
    pub fn item_identifier(&self, index: usize) -> T {
        let elements = self.elements.borrow();
        match elements.get(index) {
            Some(item) => item.clone(),
            None => panic!(
                "item index {index} out of bounds for section with {} items",
                elements.len()
            ),
        }
    }

    pub fn try_item_identifier(&self, index: usize) -> Option<T> {
        self.elements.borrow().get(index).cloned()
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.elements.borrow().iter().position(|candidate| candidate == item)
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Index this section currently occupies in its parent, if any.
    pub fn section_index(&self) -> Option<usize> {
        let parent = self.parent.borrow().as_ref()?.upgrade()?;
        parent.section_index_of(self)
    }

    pub fn set_supplementary_view_provider(
        &self,
        provider: impl Fn(&mut S, &str, IndexPath) -> Option<S::View> + 'static,
    ) {
        *self.supplementary_provider.borrow_mut() = Some(Rc::new(provider));
    }

    pub fn set_header_title(&self, title: Option<String>) {
        *self.header_title.borrow_mut() = title;
    }

    pub fn set_footer_title(&self, title: Option<String>) {
        *self.footer_title.borrow_mut() = title;
    }

    pub fn default_row_animation(&self) -> RowAnimation {
        self.default_row_animation.get()
    }

    pub fn set_default_row_animation(&self, animation: RowAnimation) {
        self.default_row_animation.set(animation);
    }

    /// Makes items selectable. The surface deselects the row and `handler`
    /// receives the selected identifier.
    pub fn set_selection_handler(&self, handler: impl Fn(&T) + 'static) {
        *self.selection_handler.borrow_mut() = Some(Rc::new(handler));
    }

    /// Makes items editable; committed edits are forwarded to `handler`.
    pub fn set_edit_handler(&self, handler: impl Fn(EditingStyle, &T) + 'static) {
        *self.edit_handler.borrow_mut() = Some(Rc::new(handler));
    }

    /// Makes items reorderable by the user. The handler receives the moved
    /// identifier with its old and new local index after the section has
    /// updated its own order.
    pub fn set_reorder_handler(&self, handler: impl Fn(&T, usize, usize) + 'static) {
        *self.reorder_handler.borrow_mut() = Some(Rc::new(handler));
    }

    fn attachment(&self) -> Option<(Rc<RefCell<S>>, usize)> {
        let parent = self.parent.borrow().as_ref()?.upgrade()?;
        let surface = parent.surface()?;
        let section = parent.section_index_of(self)?;
        Some((surface, section))
    }

    fn reload_paths(&self, section: usize, reloads: &[T]) -> Vec<IndexPath> {
        let elements = self.elements.borrow();
        let mut paths: Vec<IndexPath> = reloads
            .iter()
            .map(|item| match elements.iter().position(|candidate| candidate == item) {
                Some(index) => IndexPath::new(section, index),
                None => panic!("cannot reload {item:?}: identifier is not in section {section}"),
            })
            .collect();
        paths.sort();
        paths
    }
}

fn paths_in(section: usize, items: &[usize]) -> Vec<IndexPath> {
    items
        .iter()
        .map(|&item| IndexPath::new(section, item))
        .collect()
}

impl<T, S> SectionDataSource<S> for DiffableSection<T, S>
where
    T: Hash + Eq + Clone + fmt::Debug + 'static,
    S: Surface + 'static,
{
    fn set_parent(&self, parent: Weak<ConcatDataSource<S>>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    fn item_count(&self) -> usize {
        self.len()
    }

    fn render(&self, surface: &mut S, path: IndexPath) -> S::Cell {
        let item = self.item_identifier(path.item);
        match (self.cell_provider)(surface, path, &item) {
            Some(cell) => cell,
            None => panic!("cell provider returned no cell for item {item:?} at {path}"),
        }
    }

    fn render_supplementary(&self, surface: &mut S, kind: &str, path: IndexPath) -> Option<S::View> {
        let provider = self.supplementary_provider.borrow().clone()?;
        provider(surface, kind, path)
    }

    fn title_for_header(&self) -> Option<String> {
        self.header_title.borrow().clone()
    }

    fn title_for_footer(&self) -> Option<String> {
        self.footer_title.borrow().clone()
    }

    fn can_edit_item(&self, path: IndexPath) -> bool {
        path.item < self.len() && self.edit_handler.borrow().is_some()
    }

    fn commit_edit(&self, style: EditingStyle, path: IndexPath) {
        let Some(handler) = self.edit_handler.borrow().clone() else {
            return;
        };
        let item = self.item_identifier(path.item);
        handler(style, &item);
    }

    fn can_move_item(&self, path: IndexPath) -> Option<bool> {
        let _ = path;
        self.reorder_handler.borrow().as_ref().map(|_| true)
    }

    fn move_item(&self, from: IndexPath, to: IndexPath) {
        let Some(handler) = self.reorder_handler.borrow().clone() else {
            return;
        };
        let item = {
            let mut elements = self.elements.borrow_mut();
            let len = elements.len();
            assert!(
                from.item < len && to.item < len,
                "cannot move item {} to {}: section has {len} items",
                from.item,
                to.item
            );
            let item = elements.remove(from.item);
            elements.insert(to.item, item.clone());
            item
        };
        handler(&item, from.item, to.item);
    }

    fn did_select_item(&self, path: IndexPath) -> bool {
        let Some(handler) = self.selection_handler.borrow().clone() else {
            return false;
        };
        if let Some((surface, section)) = self.attachment() {
            surface
                .borrow_mut()
                .deselect_item(path.in_section(section), true);
        }
        let item = self.item_identifier(path.item);
        handler(&item);
        true
    }
}

impl<T, S> Composer for DiffableSection<T, S>
where
    T: Hash + Eq + Clone + fmt::Debug + 'static,
    S: Surface + 'static,
{
    type Item = T;

    fn apply(&self, snapshot: Snapshot<T>, animate: bool, completion: Option<Completion>) {
        DiffableSection::apply(self, snapshot, animate, completion);
    }

    fn snapshot(&self) -> Snapshot<T> {
        DiffableSection::snapshot(self)
    }
}

impl<T: fmt::Debug, S: Surface> fmt::Debug for DiffableSection<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffableSection")
            .field("elements", &self.elements.borrow())
            .field("attached", &self.parent.borrow().is_some())
            .field("default_row_animation", &self.default_row_animation.get())
            .finish()
    }
}
