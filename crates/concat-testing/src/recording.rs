//! In-memory [`Surface`] that records every call and keeps a row model.
//!
//! The model mirrors what a list widget would show. Batches are replayed
//! with list-widget semantics when the outermost batch ends, so an edit
//! script that does not describe a valid transformation panics right where
//! a real widget would reject it. Rows created by inserts or invalidated by
//! reloads stay stale until [`RecordingSurface::sync`] renders them again
//! through the data source.

use std::cell::RefCell;
use std::rc::Rc;

use concat_core::{Completion, DataSource, EditScript, IndexPath, Move, RowAnimation, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    BeginTransaction { animated: bool },
    EndTransaction,
    BeginBatch,
    EndBatch,
    InsertSections(Vec<usize>),
    DeleteSections(Vec<usize>),
    MoveSection { from: usize, to: usize },
    ReloadSections(Vec<usize>),
    InsertItems(Vec<IndexPath>),
    DeleteItems(Vec<IndexPath>),
    MoveItem { from: IndexPath, to: IndexPath },
    ReloadItems(Vec<IndexPath>),
    FullReload,
    DeselectItem { path: IndexPath, animated: bool },
}

impl SurfaceCall {
    /// Whether the call changes what the surface shows.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            SurfaceCall::BeginTransaction { .. }
                | SurfaceCall::EndTransaction
                | SurfaceCall::BeginBatch
                | SurfaceCall::EndBatch
                | SurfaceCall::DeselectItem { .. }
        )
    }

    fn is_structural(&self) -> bool {
        matches!(
            self,
            SurfaceCall::InsertSections(_)
                | SurfaceCall::DeleteSections(_)
                | SurfaceCall::MoveSection { .. }
                | SurfaceCall::InsertItems(_)
                | SurfaceCall::DeleteItems(_)
                | SurfaceCall::MoveItem { .. }
        )
    }
}

#[derive(Debug, Clone, Default)]
struct ModelSection {
    rows: Vec<Option<String>>,
    stale: bool,
}

impl ModelSection {
    fn pending() -> Self {
        Self {
            rows: Vec::new(),
            stale: true,
        }
    }
}

pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    incremental_updates: bool,
    sections: Vec<ModelSection>,
    needs_full_reload: bool,
    batch_depth: usize,
    batch: Vec<SurfaceCall>,
    animated: Vec<bool>,
    animations: Vec<RowAnimation>,
    pending_completions: Vec<Completion>,
    eager_completions: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            incremental_updates: true,
            sections: Vec::new(),
            needs_full_reload: true,
            batch_depth: 0,
            batch: Vec::new(),
            animated: Vec::new(),
            animations: Vec::new(),
            pending_completions: Vec::new(),
            eager_completions: false,
        }
    }

    /// Convenience constructor for the shared form composers bind to.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Toggles incremental update support; when off, composers must fall
    /// back to a full reload.
    pub fn set_incremental_updates(&mut self, enabled: bool) {
        self.incremental_updates = enabled;
    }

    /// When on, transactions hand their completion straight back to the
    /// composer instead of queueing it for [`RecordingSurface::flush_completions`].
    pub fn set_eager_completions(&mut self, eager: bool) {
        self.eager_completions = eager;
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.animated.clear();
        self.animations.clear();
    }

    /// Recorded calls that change what the surface shows.
    pub fn mutations(&self) -> Vec<SurfaceCall> {
        self.calls
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    pub fn structural_calls(&self) -> Vec<SurfaceCall> {
        self.calls
            .iter()
            .filter(|call| call.is_structural())
            .cloned()
            .collect()
    }

    pub fn full_reload_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == SurfaceCall::FullReload)
            .count()
    }

    pub fn transaction_count(&self) -> usize {
        self.animated.len()
    }

    /// `animated` flag of every transaction recorded since the last clear.
    pub fn transaction_animations(&self) -> &[bool] {
        &self.animated
    }

    /// Row animations passed with inserts, deletes and reloads.
    pub fn row_animations(&self) -> &[RowAnimation] {
        &self.animations
    }

    pub fn pending_completion_count(&self) -> usize {
        self.pending_completions.len()
    }

    /// Number of sections the model currently shows.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Rendered rows of `section`. Stale rows read as `"<stale>"`.
    pub fn rows(&self, section: usize) -> Vec<String> {
        match self.sections.get(section) {
            Some(model) => model
                .rows
                .iter()
                .map(|row| row.clone().unwrap_or_else(|| "<stale>".to_string()))
                .collect(),
            None => panic!(
                "section {section} out of bounds for surface with {} sections",
                self.sections.len()
            ),
        }
    }

    pub fn all_rows(&self) -> Vec<Vec<String>> {
        (0..self.sections.len())
            .map(|section| self.rows(section))
            .collect()
    }

    /// Reconciles the model with `source`: verifies that section and row
    /// counts agree, then renders every stale row.
    ///
    /// Panics when the counts disagree, which means the composers emitted
    /// mutations that do not match their own state.
    pub fn sync(&mut self, source: &dyn DataSource<RecordingSurface>) {
        assert_eq!(
            self.batch_depth, 0,
            "cannot sync the surface while a batch is open"
        );
        if self.needs_full_reload {
            self.sections = (0..source.section_count())
                .map(|_| ModelSection::pending())
                .collect();
            self.needs_full_reload = false;
        }
        assert_eq!(
            self.sections.len(),
            source.section_count(),
            "invalid number of sections: surface shows {}, data source reports {}",
            self.sections.len(),
            source.section_count()
        );

        for section in 0..self.sections.len() {
            let expected = source.item_count(section);
            if self.sections[section].stale {
                self.sections[section] = ModelSection {
                    rows: vec![None; expected],
                    stale: false,
                };
            }
            assert_eq!(
                self.sections[section].rows.len(),
                expected,
                "invalid number of rows in section {section}: surface shows {}, data source reports {expected}",
                self.sections[section].rows.len()
            );
            for item in 0..expected {
                if self.sections[section].rows[item].is_none() {
                    let cell = source.render(self, IndexPath::new(section, item));
                    self.sections[section].rows[item] = Some(cell);
                }
            }
        }
    }

    /// Runs the completions of committed transactions.
    ///
    /// Takes the shared handle so the surface borrow is released before any
    /// completion runs; completions are free to apply new snapshots.
    pub fn flush_completions(surface: &Rc<RefCell<RecordingSurface>>) -> usize {
        let pending = std::mem::take(&mut surface.borrow_mut().pending_completions);
        let count = pending.len();
        for completion in pending {
            completion();
        }
        count
    }

    fn record(&mut self, call: SurfaceCall) {
        log::trace!("surface call: {call:?}");
        if call.is_mutation() {
            if self.batch_depth > 0 {
                self.batch.push(call.clone());
            } else {
                self.commit(std::slice::from_ref(&call));
            }
        }
        self.calls.push(call);
    }

    fn commit(&mut self, batch: &[SurfaceCall]) {
        if batch.is_empty() {
            return;
        }
        if batch.iter().any(|call| *call == SurfaceCall::FullReload) {
            self.needs_full_reload = true;
            return;
        }
        if self.needs_full_reload {
            // Nothing is shown yet; the next sync rebuilds everything.
            return;
        }
        self.commit_sections(batch);
        self.commit_items(batch);
    }

    fn commit_sections(&mut self, batch: &[SurfaceCall]) {
        let mut script = EditScript::default();
        let mut reloaded: Vec<usize> = Vec::new();
        for call in batch {
            match call {
                SurfaceCall::InsertSections(indices) => script.inserted.extend(indices),
                SurfaceCall::DeleteSections(indices) => script.removed.extend(indices),
                SurfaceCall::MoveSection { from, to } => script.moved.push(Move {
                    from: *from,
                    to: *to,
                }),
                SurfaceCall::ReloadSections(indices) => reloaded.extend(indices),
                _ => {}
            }
        }
        if !script.is_empty() {
            self.sections = replay(&script, &self.sections, ModelSection::pending(), "sections");
        }
        for section in reloaded {
            match self.sections.get_mut(section) {
                Some(model) => *model = ModelSection::pending(),
                None => panic!("cannot reload section {section}: surface shows {} sections", self.sections.len()),
            }
        }
    }

    fn commit_items(&mut self, batch: &[SurfaceCall]) {
        let mut scripts: Vec<(usize, EditScript)> = Vec::new();
        let mut reloaded = Vec::new();
        for call in batch {
            match call {
                SurfaceCall::InsertItems(paths) => {
                    for path in paths {
                        script_for(&mut scripts, path.section).inserted.push(path.item);
                    }
                }
                SurfaceCall::DeleteItems(paths) => {
                    for path in paths {
                        script_for(&mut scripts, path.section).removed.push(path.item);
                    }
                }
                SurfaceCall::MoveItem { from, to } => {
                    assert_eq!(
                        from.section, to.section,
                        "rows cannot move between sections ({from} -> {to})"
                    );
                    script_for(&mut scripts, from.section).moved.push(Move {
                        from: from.item,
                        to: to.item,
                    });
                }
                SurfaceCall::ReloadItems(paths) => reloaded.extend(paths.iter().copied()),
                _ => {}
            }
        }

        for (section, mut script) in scripts {
            script.inserted.sort_unstable();
            script.removed.sort_unstable();
            let count = self.sections.len();
            let model = match self.sections.get_mut(section) {
                Some(model) => model,
                None => panic!("cannot update rows of section {section}: surface shows {count} sections"),
            };
            if model.stale {
                continue;
            }
            model.rows = replay(&script, &model.rows, None, "rows");
        }
        for path in reloaded {
            let model = match self.sections.get_mut(path.section) {
                Some(model) => model,
                None => panic!("cannot reload row {path}: section is not shown by the surface"),
            };
            if model.stale {
                continue;
            }
            match model.rows.get_mut(path.item) {
                Some(row) => *row = None,
                None => panic!("cannot reload row {path}: it is not shown by the surface"),
            }
        }
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn script_for(scripts: &mut Vec<(usize, EditScript)>, section: usize) -> &mut EditScript {
    let position = match scripts.iter().position(|(candidate, _)| *candidate == section) {
        Some(position) => position,
        None => {
            scripts.push((section, EditScript::default()));
            scripts.len() - 1
        }
    };
    &mut scripts[position].1
}

fn replay<T: Clone>(script: &EditScript, old: &[T], placeholder: T, what: &str) -> Vec<T> {
    let len = (old.len() + script.inserted.len())
        .checked_sub(script.removed.len())
        .unwrap_or_else(|| panic!("batch removes more {what} than the surface shows"));
    let placeholders = vec![placeholder; len];
    script.replay(old, &placeholders)
}

impl Surface for RecordingSurface {
    type Cell = String;
    type View = String;

    fn supports_incremental_updates(&self) -> bool {
        self.incremental_updates
    }

    fn run_transaction(
        &mut self,
        animated: bool,
        completion: Option<Completion>,
        body: impl FnOnce(&mut Self),
    ) -> Option<Completion> {
        self.animated.push(animated);
        self.record(SurfaceCall::BeginTransaction { animated });
        body(self);
        self.record(SurfaceCall::EndTransaction);
        if self.eager_completions {
            return completion;
        }
        self.pending_completions.extend(completion);
        None
    }

    fn begin_batch(&mut self) {
        self.batch_depth += 1;
        self.record(SurfaceCall::BeginBatch);
    }

    fn end_batch(&mut self) {
        assert!(self.batch_depth > 0, "end_batch without begin_batch");
        self.record(SurfaceCall::EndBatch);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let batch = std::mem::take(&mut self.batch);
            self.commit(&batch);
        }
    }

    fn insert_sections(&mut self, sections: &[usize], animation: RowAnimation) {
        self.animations.push(animation);
        self.record(SurfaceCall::InsertSections(sections.to_vec()));
    }

    fn delete_sections(&mut self, sections: &[usize], animation: RowAnimation) {
        self.animations.push(animation);
        self.record(SurfaceCall::DeleteSections(sections.to_vec()));
    }

    fn move_section(&mut self, from: usize, to: usize) {
        self.record(SurfaceCall::MoveSection { from, to });
    }

    fn reload_sections(&mut self, sections: &[usize], animation: RowAnimation) {
        self.animations.push(animation);
        self.record(SurfaceCall::ReloadSections(sections.to_vec()));
    }

    fn insert_items(&mut self, paths: &[IndexPath], animation: RowAnimation) {
        self.animations.push(animation);
        self.record(SurfaceCall::InsertItems(paths.to_vec()));
    }

    fn delete_items(&mut self, paths: &[IndexPath], animation: RowAnimation) {
        self.animations.push(animation);
        self.record(SurfaceCall::DeleteItems(paths.to_vec()));
    }

    fn move_item(&mut self, from: IndexPath, to: IndexPath) {
        self.record(SurfaceCall::MoveItem { from, to });
    }

    fn reload_items(&mut self, paths: &[IndexPath], animation: RowAnimation) {
        self.animations.push(animation);
        self.record(SurfaceCall::ReloadItems(paths.to_vec()));
    }

    fn full_reload(&mut self) {
        self.record(SurfaceCall::FullReload);
    }

    fn deselect_item(&mut self, path: IndexPath, animated: bool) {
        self.record(SurfaceCall::DeselectItem { path, animated });
    }
}

impl std::fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("sections", &self.section_count())
            .field("calls", &self.calls.len())
            .field("pending_completions", &self.pending_completions.len())
            .field("eager_completions", &self.eager_completions)
            .finish()
    }
}
