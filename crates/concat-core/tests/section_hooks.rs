mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use concat_core::{ConcatDataSource, DataSource, EditingStyle, IndexPath, SectionHandle, StaticSection};
use concat_testing::{RecordingSurface, SurfaceCall};

#[test]
fn selection_deselects_and_reports_identifier() {
    let plain = label_section(&["X"]);
    let section = label_section(&["A", "B"]);
    let selected = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&selected);
    section.set_selection_handler(move |item| sink.borrow_mut().push(*item));
    let (surface, root) = mounted(&[&plain, &section]);

    assert!(root.did_select_item(IndexPath::new(1, 1)));
    assert!(!root.did_select_item(IndexPath::new(0, 0)));
    assert_eq!(*selected.borrow(), vec!["B"]);
    assert_eq!(
        surface.borrow().calls().to_vec(),
        vec![SurfaceCall::DeselectItem {
            path: IndexPath::new(1, 1),
            animated: true,
        }]
    );
}

#[test]
fn edits_are_forwarded_with_identifier() {
    let section = label_section(&["A", "B"]);
    let (surface, root) = mounted(&[&section]);
    assert!(!root.can_edit_item(IndexPath::new(0, 0)));

    let committed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&committed);
    let weak = Rc::downgrade(&section);
    section.set_edit_handler(move |style, item| {
        sink.borrow_mut().push((style, *item));
        if style != EditingStyle::Delete {
            return;
        }
        if let Some(section) = weak.upgrade() {
            let mut snapshot = section.snapshot();
            snapshot.delete([item]);
            section.apply(snapshot, true, None);
        }
    });
    assert!(root.can_edit_item(IndexPath::new(0, 1)));
    assert!(!root.can_edit_item(IndexPath::new(0, 2)));

    root.commit_edit(EditingStyle::Delete, IndexPath::new(0, 1));
    assert_eq!(*committed.borrow(), vec![(EditingStyle::Delete, "B")]);
    assert_eq!(
        surface.borrow().structural_calls(),
        vec![SurfaceCall::DeleteItems(vec![IndexPath::new(0, 1)])]
    );
    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["A"]);
}

#[test]
fn user_reorder_updates_order_without_surface_calls() {
    let section = label_section(&["A", "B", "C"]);
    let (surface, root) = mounted(&[&section]);
    assert!(!root.can_move_item(IndexPath::new(0, 0)));

    let moves = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&moves);
    section.set_reorder_handler(move |item, from, to| sink.borrow_mut().push((*item, from, to)));
    assert!(root.can_move_item(IndexPath::new(0, 0)));

    root.move_item(IndexPath::new(0, 0), IndexPath::new(0, 2));
    assert_eq!(section.snapshot().items(), vec!["B", "C", "A"]);
    assert_eq!(*moves.borrow(), vec![("A", 0, 2)]);
    assert!(surface.borrow().calls().is_empty());
}

#[test]
fn moves_across_sections_are_ignored() {
    let first = label_section(&["A", "B", "C"]);
    let second = label_section(&["D"]);
    for section in [&first, &second] {
        section.set_reorder_handler(|_, _, _| panic!("reorder handler reached"));
    }
    let (surface, root) = mounted(&[&first, &second]);

    root.move_item(IndexPath::new(0, 2), IndexPath::new(1, 0));
    assert_eq!(first.snapshot().items(), vec!["A", "B", "C"]);
    assert_eq!(second.snapshot().items(), vec!["D"]);
    assert!(surface.borrow().calls().is_empty());
}

#[test]
fn titles_and_supplementary_views_use_local_coordinates() {
    let plain = label_section(&["X"]);
    let section = label_section(&["A"]);
    section.set_header_title(Some("Tickets".to_string()));
    section.set_footer_title(Some("2 open".to_string()));
    section.set_supplementary_view_provider(|_, kind, path| Some(format!("{kind}@{path}")));
    let (surface, root) = mounted(&[&plain, &section]);

    assert_eq!(root.title_for_header(1).as_deref(), Some("Tickets"));
    assert_eq!(root.title_for_footer(1).as_deref(), Some("2 open"));
    assert_eq!(root.title_for_header(0), None);

    let view = root.render_supplementary(&mut surface.borrow_mut(), "header", IndexPath::new(1, 0));
    assert_eq!(view, "header@[0, 0]");
}

#[test]
#[should_panic(expected = "returned no `footer` view")]
fn missing_supplementary_view_panics() {
    let plain = label_section(&["X"]);
    let (surface, root) = mounted(&[&plain]);
    root.render_supplementary(&mut surface.borrow_mut(), "footer", IndexPath::new(0, 0));
}

#[test]
#[should_panic(expected = "cell provider returned no cell")]
fn missing_cell_panics() {
    let section = Rc::new(Section::new(|_, _, item| (*item != "B").then(|| item.to_string())));
    section.apply(items(&["A", "B"]), false, None);
    let surface = RecordingSurface::shared();
    let root = ConcatDataSource::new(&surface);
    root.apply(sections(&[&section]), false, None);
    assert_eq!(root.render(&mut surface.borrow_mut(), IndexPath::new(0, 0)), "A");
    root.render(&mut surface.borrow_mut(), IndexPath::new(0, 1));
}

#[test]
fn static_sections_mix_with_diffable_sections() {
    let banner = Rc::new(StaticSection::<RecordingSurface>::new(2, |_, path| {
        Some(format!("banner {}", path.item))
    }));
    let header_only = Rc::new(StaticSection::<RecordingSurface>::supplementary_only(
        |_, kind, _| Some(kind.to_string()),
    ));
    let section = label_section(&["A"]);

    let surface = RecordingSurface::shared();
    let root = ConcatDataSource::new(&surface);
    let mut snapshot = root.empty_snapshot();
    snapshot.append([
        SectionHandle::from(Rc::clone(&banner)),
        SectionHandle::from(Rc::clone(&header_only)),
        handle(&section),
    ]);
    root.apply(snapshot, false, None);
    sync(&surface, &root);
    assert_eq!(
        surface.borrow().all_rows(),
        vec![vec!["banner 0", "banner 1"], vec![], vec!["A"]]
    );
    assert_eq!(
        root.render_supplementary(&mut surface.borrow_mut(), "header", IndexPath::new(1, 0)),
        "header"
    );

    surface.borrow_mut().clear_calls();
    section.apply(items(&["A", "B"]), true, None);
    assert_eq!(
        surface.borrow().structural_calls(),
        vec![SurfaceCall::InsertItems(vec![IndexPath::new(2, 1)])]
    );

    let mut snapshot = root.snapshot();
    snapshot.delete([&SectionHandle::from(banner)]);
    root.apply(snapshot, true, None);
    sync(&surface, &root);
    assert_eq!(surface.borrow().all_rows(), vec![vec![], vec!["A", "B"]]);
    assert_eq!(section.section_index(), Some(1));
}
