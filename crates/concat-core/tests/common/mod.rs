#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use concat_core::{ConcatDataSource, DiffableSection, SectionHandle, SectionsSnapshot, Snapshot};
use concat_testing::RecordingSurface;

pub type SharedSurface = Rc<RefCell<RecordingSurface>>;
pub type Section = DiffableSection<&'static str, RecordingSurface>;
pub type Root = ConcatDataSource<RecordingSurface>;

pub fn items(values: &[&'static str]) -> Snapshot<&'static str> {
    values.iter().copied().collect()
}

/// Section whose cells are its identifiers.
pub fn label_section(values: &[&'static str]) -> Rc<Section> {
    let section = Rc::new(Section::new(|_, _, item| Some(item.to_string())));
    section.apply(items(values), false, None);
    section
}

pub fn handle(section: &Rc<Section>) -> SectionHandle<RecordingSurface> {
    SectionHandle::from(Rc::clone(section))
}

pub fn sections(children: &[&Rc<Section>]) -> SectionsSnapshot<RecordingSurface> {
    children.iter().map(|section| handle(section)).collect()
}

/// Root bound to a fresh surface that already shows `children`. The call
/// log is cleared before returning.
pub fn mounted(children: &[&Rc<Section>]) -> (SharedSurface, Rc<Root>) {
    let surface = RecordingSurface::shared();
    let root = ConcatDataSource::new(&surface);
    root.apply(sections(children), false, None);
    sync(&surface, &root);
    surface.borrow_mut().clear_calls();
    (surface, root)
}

pub fn sync(surface: &SharedSurface, root: &Rc<Root>) {
    surface.borrow_mut().sync(&**root);
}

/// Completion that bumps the returned counter.
pub fn counting_completion() -> (Rc<std::cell::Cell<usize>>, concat_core::Completion) {
    let fired = Rc::new(std::cell::Cell::new(0));
    let counter = Rc::clone(&fired);
    (fired, Box::new(move || counter.set(counter.get() + 1)))
}
