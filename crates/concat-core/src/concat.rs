//! Root composer: concatenates independent sections onto one surface.
//!
//! [`ConcatDataSource`] keeps the ordered list of child sections by identity.
//! Applying a [`SectionsSnapshot`] diffs that list and issues section-level
//! mutations; everything item-level is delegated to the child that owns the
//! section, with coordinates rewritten to the child's local space.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::data_source::{DataSource, SectionHandle};
use crate::{
    diff, Completion, Composer, ConcatError, EditingStyle, IndexPath, RowAnimation, Snapshot,
    Surface,
};

/// Snapshot of a root's children.
pub type SectionsSnapshot<S> = Snapshot<SectionHandle<S>>;

enum Attachment<S> {
    Detached,
    Attached(Weak<RefCell<S>>),
}

pub struct ConcatDataSource<S: Surface> {
    this: Weak<ConcatDataSource<S>>,
    children: RefCell<Vec<SectionHandle<S>>>,
    attachment: RefCell<Attachment<S>>,
    default_row_animation: Cell<RowAnimation>,
}

impl<S: Surface + 'static> ConcatDataSource<S> {
    /// Creates a root bound to `surface`.
    ///
    /// The root only keeps a weak reference; once the surface is dropped,
    /// applies update the children silently.
    pub fn new(surface: &Rc<RefCell<S>>) -> Rc<Self> {
        Self::with_attachment(Attachment::Attached(Rc::downgrade(surface)))
    }

    /// Creates a root that is not bound to any surface yet. Snapshots
    /// applied before [`ConcatDataSource::attach`] are taken silently.
    pub fn detached() -> Rc<Self> {
        Self::with_attachment(Attachment::Detached)
    }

    fn with_attachment(attachment: Attachment<S>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            children: RefCell::new(Vec::new()),
            attachment: RefCell::new(attachment),
            default_row_animation: Cell::new(RowAnimation::default()),
        })
    }

    /// Binds a detached root to `surface` and asks the surface to load the
    /// current tree. A root can only ever be attached once.
    pub fn attach(&self, surface: &Rc<RefCell<S>>) -> Result<(), ConcatError> {
        {
            let mut attachment = self.attachment.borrow_mut();
            if let Attachment::Attached(_) = *attachment {
                return Err(ConcatError::AlreadyAttached);
            }
            *attachment = Attachment::Attached(Rc::downgrade(surface));
        }
        log::debug!(
            "attached data source with {} sections",
            self.children.borrow().len()
        );
        surface.borrow_mut().full_reload();
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        matches!(*self.attachment.borrow(), Attachment::Attached(_))
    }

    /// The bound surface, if the root is attached and the surface is alive.
    pub fn surface(&self) -> Option<Rc<RefCell<S>>> {
        match &*self.attachment.borrow() {
            Attachment::Attached(surface) => surface.upgrade(),
            Attachment::Detached => None,
        }
    }

    /// Replaces the children with the snapshot's, animating the difference
    /// when attached.
    pub fn apply(&self, snapshot: SectionsSnapshot<S>, animate: bool, completion: Option<Completion>) {
        let (new_children, reloads) = snapshot.into_parts();
        for child in &new_children {
            child.source().set_parent(self.this.clone());
        }

        let Some(surface) = self.surface() else {
            log::debug!(
                "data source is detached, replacing {} sections without surface updates",
                new_children.len()
            );
            *self.children.borrow_mut() = new_children;
            if let Some(completion) = completion {
                completion();
            }
            return;
        };

        let animation = self.default_row_animation.get();
        let ready = surface.borrow_mut().run_transaction(animate, completion, move |surface: &mut S| {
            if !surface.supports_incremental_updates() {
                log::warn!("surface cannot apply incremental updates, reloading everything");
                *self.children.borrow_mut() = new_children;
                surface.full_reload();
                return;
            }

            let script = diff(self.children.borrow().as_slice(), &new_children);
            *self.children.borrow_mut() = new_children;

            if !script.is_empty() {
                log::debug!(
                    "sections: {} inserted, {} removed, {} moved",
                    script.inserted.len(),
                    script.removed.len(),
                    script.moved.len()
                );
                surface.batch_updates(|surface| {
                    if !script.inserted.is_empty() {
                        surface.insert_sections(&script.inserted, animation);
                    }
                    if !script.removed.is_empty() {
                        surface.delete_sections(&script.removed, animation);
                    }
                    for step in &script.moved {
                        log::trace!("move section {} -> {}", step.from, step.to);
                        surface.move_section(step.from, step.to);
                    }
                });
            }

            if !reloads.is_empty() {
                let mut reloaded: Vec<usize> = reloads
                    .iter()
                    .map(|child| match self.section_index(child) {
                        Some(index) => index,
                        None => panic!("cannot reload {child:?}: section is not part of the data source"),
                    })
                    .collect();
                reloaded.sort_unstable();
                log::debug!("reloading {} sections", reloaded.len());
                surface.batch_updates(|surface| surface.reload_sections(&reloaded, animation));
            }
        });
        if let Some(completion) = ready {
            completion();
        }
    }

    pub fn snapshot(&self) -> SectionsSnapshot<S> {
        self.children.borrow().iter().cloned().collect()
    }

    pub fn empty_snapshot(&self) -> SectionsSnapshot<S> {
        Snapshot::new()
    }

    pub fn section_index(&self, section: &SectionHandle<S>) -> Option<usize> {
        self.children
            .borrow()
            .iter()
            .position(|child| child == section)
    }

    /// Position of the child whose data source lives at `section`'s address.
    pub fn section_index_of<D: ?Sized>(&self, section: &D) -> Option<usize> {
        self.children
            .borrow()
            .iter()
            .position(|child| child.is(section))
    }

    /// Child at `index`. Panics when `index` is out of range.
    pub fn section(&self, index: usize) -> SectionHandle<S> {
        let children = self.children.borrow();
        match children.get(index) {
            Some(child) => child.clone(),
            None => panic!(
                "section index {index} out of bounds for data source with {} sections",
                children.len()
            ),
        }
    }

    pub fn sections(&self) -> Vec<SectionHandle<S>> {
        self.children.borrow().clone()
    }

    pub fn default_row_animation(&self) -> RowAnimation {
        self.default_row_animation.get()
    }

    pub fn set_default_row_animation(&self, animation: RowAnimation) {
        self.default_row_animation.set(animation);
    }
}

impl<S: Surface + 'static> DataSource<S> for ConcatDataSource<S> {
    fn section_count(&self) -> usize {
        self.children.borrow().len()
    }

    fn item_count(&self, section: usize) -> usize {
        self.section(section).source().item_count()
    }

    fn render(&self, surface: &mut S, path: IndexPath) -> S::Cell {
        self.section(path.section).source().render(surface, path.local())
    }

    fn render_supplementary(&self, surface: &mut S, kind: &str, path: IndexPath) -> S::View {
        let child = self.section(path.section);
        match child.source().render_supplementary(surface, kind, path.local()) {
            Some(view) => view,
            None => panic!("section {} returned no `{kind}` view at {path}", path.section),
        }
    }

    fn title_for_header(&self, section: usize) -> Option<String> {
        self.section(section).source().title_for_header()
    }

    fn title_for_footer(&self, section: usize) -> Option<String> {
        self.section(section).source().title_for_footer()
    }

    fn can_edit_item(&self, path: IndexPath) -> bool {
        self.section(path.section).source().can_edit_item(path.local())
    }

    fn commit_edit(&self, style: EditingStyle, path: IndexPath) {
        self.section(path.section)
            .source()
            .commit_edit(style, path.local());
    }

    fn can_move_item(&self, path: IndexPath) -> bool {
        self.section(path.section)
            .source()
            .can_move_item(path.local())
            .unwrap_or(false)
    }

    fn move_item(&self, from: IndexPath, to: IndexPath) {
        let source = self.section(from.section);
        let destination = self.section(to.section);
        if source != destination {
            log::debug!("ignoring move from {from} to {to}: items cannot change sections");
            return;
        }
        source.source().move_item(from.local(), to.local());
    }

    fn did_select_item(&self, path: IndexPath) -> bool {
        self.section(path.section)
            .source()
            .did_select_item(path.local())
    }
}

impl<S: Surface + 'static> Composer for ConcatDataSource<S> {
    type Item = SectionHandle<S>;

    fn apply(&self, snapshot: SectionsSnapshot<S>, animate: bool, completion: Option<Completion>) {
        ConcatDataSource::apply(self, snapshot, animate, completion);
    }

    fn snapshot(&self) -> SectionsSnapshot<S> {
        ConcatDataSource::snapshot(self)
    }
}

impl<S: Surface> fmt::Debug for ConcatDataSource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attached = matches!(*self.attachment.borrow(), Attachment::Attached(_));
        f.debug_struct("ConcatDataSource")
            .field("children", &self.children.borrow())
            .field("attached", &attached)
            .field("default_row_animation", &self.default_row_animation.get())
            .finish()
    }
}
