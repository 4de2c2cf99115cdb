mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use concat_core::{Composer, IndexPath, RowAnimation};
use concat_testing::{RecordingSurface, SurfaceCall};

#[test]
fn detached_section_applies_silently() {
    let section = label_section(&[]);
    section.apply(items(&["A", "B"]), true, None);
    assert_eq!(section.snapshot().items(), vec!["A", "B"]);
    assert_eq!(section.section_index(), None);
}

#[test]
fn detached_apply_runs_completion_immediately() {
    let section = label_section(&["A"]);
    let (fired, completion) = counting_completion();
    section.apply(items(&["B"]), true, Some(completion));
    assert_eq!(fired.get(), 1);
}

#[test]
fn apply_round_trips_and_is_idempotent() {
    let section = label_section(&["A", "B", "C"]);
    let (surface, _root) = mounted(&[&section]);

    let target = items(&["C", "A", "D"]);
    section.apply(target.clone(), true, None);
    assert_eq!(section.snapshot().items(), target.items());
    assert!(!surface.borrow().structural_calls().is_empty());

    surface.borrow_mut().clear_calls();
    section.apply(target, true, None);
    assert!(surface.borrow().structural_calls().is_empty());
    assert_eq!(surface.borrow().transaction_count(), 1);
}

#[test]
fn mixed_edit_is_addressed_in_flat_coordinates() {
    let header = label_section(&["H"]);
    let section = label_section(&["A", "B", "C", "D"]);
    let (surface, root) = mounted(&[&header, &section]);
    assert_eq!(section.section_index(), Some(1));

    section.apply(items(&["C", "A", "E", "B"]), true, None);
    assert_eq!(
        surface.borrow().structural_calls(),
        vec![
            SurfaceCall::InsertItems(vec![IndexPath::new(1, 2)]),
            SurfaceCall::DeleteItems(vec![IndexPath::new(1, 3)]),
            SurfaceCall::MoveItem {
                from: IndexPath::new(1, 2),
                to: IndexPath::new(1, 0),
            },
        ]
    );

    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["H"]);
    assert_eq!(surface.borrow().rows(1), vec!["C", "A", "E", "B"]);
}

#[test]
fn reload_rerenders_only_marked_items() {
    let suffix = Rc::new(RefCell::new(String::new()));
    let provider_suffix = Rc::clone(&suffix);
    let section = Rc::new(Section::new(move |_, _, item| {
        Some(format!("{item}{}", provider_suffix.borrow()))
    }));
    section.apply(items(&["A", "B", "C"]), false, None);
    let (surface, root) = mounted(&[&section]);

    suffix.borrow_mut().push('!');
    let mut snapshot = section.snapshot();
    snapshot.reload_items(["B"]);
    section.apply(snapshot, true, None);

    assert_eq!(
        surface.borrow().mutations(),
        vec![SurfaceCall::ReloadItems(vec![IndexPath::new(0, 1)])]
    );
    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["A", "B!", "C"]);
}

#[test]
fn reloads_follow_structural_batch() {
    let section = label_section(&["A", "B", "C"]);
    let (surface, _root) = mounted(&[&section]);

    let mut snapshot = items(&["A", "B", "C", "D"]);
    snapshot.reload_items(["A"]);
    section.apply(snapshot, false, None);

    assert_eq!(
        surface.borrow().calls().to_vec(),
        vec![
            SurfaceCall::BeginTransaction { animated: false },
            SurfaceCall::BeginBatch,
            SurfaceCall::InsertItems(vec![IndexPath::new(0, 3)]),
            SurfaceCall::EndBatch,
            SurfaceCall::BeginBatch,
            SurfaceCall::ReloadItems(vec![IndexPath::new(0, 0)]),
            SurfaceCall::EndBatch,
            SurfaceCall::EndTransaction,
        ]
    );
}

#[test]
fn reload_uses_position_after_update() {
    let section = label_section(&["A", "B", "C"]);
    let (surface, root) = mounted(&[&section]);

    let mut snapshot = items(&["C", "A", "B"]);
    snapshot.reload_items(["A", "C"]);
    section.apply(snapshot, true, None);

    let calls = surface.borrow().mutations();
    assert_eq!(
        calls.last(),
        Some(&SurfaceCall::ReloadItems(vec![
            IndexPath::new(0, 0),
            IndexPath::new(0, 1),
        ]))
    );
    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["C", "A", "B"]);
}

#[test]
fn completion_fires_once_for_empty_apply() {
    let section = label_section(&["A"]);
    let (surface, _root) = mounted(&[&section]);

    let (fired, completion) = counting_completion();
    section.apply(section.snapshot(), true, Some(completion));
    assert_eq!(fired.get(), 0);
    assert!(surface.borrow().mutations().is_empty());

    assert_eq!(RecordingSurface::flush_completions(&surface), 1);
    assert_eq!(fired.get(), 1);
    RecordingSurface::flush_completions(&surface);
    assert_eq!(fired.get(), 1);
}

#[test]
fn completion_can_apply_follow_up_snapshot() {
    let section = label_section(&["A"]);
    let (surface, root) = mounted(&[&section]);

    let follow_up = Rc::downgrade(&section);
    section.apply(
        items(&["A", "B"]),
        true,
        Some(Box::new(move || {
            if let Some(section) = follow_up.upgrade() {
                section.apply(items(&["A", "B", "C"]), true, None);
            }
        })),
    );
    RecordingSurface::flush_completions(&surface);

    assert_eq!(section.snapshot().items(), vec!["A", "B", "C"]);
    assert_eq!(surface.borrow().transaction_count(), 2);
    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["A", "B", "C"]);
}

#[test]
fn synchronous_surface_completion_can_apply_follow_up_snapshot() {
    let section = label_section(&["A"]);
    let (surface, root) = mounted(&[&section]);
    surface.borrow_mut().set_eager_completions(true);

    let follow_up = Rc::downgrade(&section);
    section.apply(
        section.snapshot(),
        false,
        Some(Box::new(move || {
            if let Some(section) = follow_up.upgrade() {
                section.apply(items(&["A", "B"]), false, None);
            }
        })),
    );

    assert_eq!(section.snapshot().items(), vec!["A", "B"]);
    assert_eq!(surface.borrow().transaction_count(), 2);
    assert_eq!(surface.borrow().pending_completion_count(), 0);
    assert_eq!(
        surface.borrow().structural_calls(),
        vec![SurfaceCall::InsertItems(vec![IndexPath::new(0, 1)])]
    );
    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["A", "B"]);
}

#[test]
fn surface_without_incremental_updates_reloads_everything() {
    let section = label_section(&["A", "B"]);
    let (surface, root) = mounted(&[&section]);
    surface.borrow_mut().set_incremental_updates(false);

    section.apply(items(&["B", "C"]), true, None);
    assert_eq!(surface.borrow().mutations(), vec![SurfaceCall::FullReload]);
    assert_eq!(section.snapshot().items(), vec!["B", "C"]);

    sync(&surface, &root);
    assert_eq!(surface.borrow().rows(0), vec!["B", "C"]);
}

#[test]
fn default_row_animation_is_forwarded() {
    let section = label_section(&["A"]);
    section.set_default_row_animation(RowAnimation::Fade);
    let (surface, _root) = mounted(&[&section]);

    section.apply(items(&["A", "B"]), false, None);
    assert_eq!(surface.borrow().row_animations().to_vec(), vec![RowAnimation::Fade]);
    assert_eq!(surface.borrow().transaction_animations().to_vec(), vec![false]);
}

#[test]
fn section_removed_from_root_applies_silently() {
    let first = label_section(&["A"]);
    let second = label_section(&["B"]);
    let (surface, root) = mounted(&[&first, &second]);

    root.apply(sections(&[&first]), false, None);
    surface.borrow_mut().clear_calls();

    second.apply(items(&["B", "C"]), true, None);
    assert!(surface.borrow().calls().is_empty());
    assert_eq!(second.section_index(), None);
    assert_eq!(second.snapshot().items(), vec!["B", "C"]);
}

#[test]
fn composer_trait_drives_both_levels() {
    fn replace_all<C: Composer>(composer: &C, values: Vec<C::Item>) {
        let mut snapshot = composer.empty_snapshot();
        snapshot.append(values);
        composer.apply(snapshot, false, None);
    }

    let first = label_section(&["A"]);
    let second = label_section(&["B"]);
    let (surface, root) = mounted(&[&first]);

    replace_all(&*second, vec!["X", "Y"]);
    replace_all(&*root, vec![handle(&first), handle(&second)]);
    sync(&surface, &root);
    assert_eq!(surface.borrow().all_rows(), vec![vec!["A"], vec!["X", "Y"]]);
}

#[test]
#[should_panic(expected = "item index 3 out of bounds")]
fn item_identifier_out_of_range_panics() {
    label_section(&["A"]).item_identifier(3);
}

#[test]
fn lookups_by_identifier_and_index() {
    let section = label_section(&["A", "B"]);
    assert_eq!(section.index_of(&"B"), Some(1));
    assert_eq!(section.index_of(&"Q"), None);
    assert_eq!(section.item_identifier(0), "A");
    assert_eq!(section.try_item_identifier(2), None);
    assert_eq!(section.len(), 2);
    assert!(!section.is_empty());
    assert!(section.empty_snapshot().is_empty());
}
