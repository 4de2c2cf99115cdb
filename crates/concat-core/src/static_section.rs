//! Sections whose content never changes shape.

use std::fmt;

use crate::data_source::SectionDataSource;
use crate::{IndexPath, Surface};

type StaticCellProvider<S> = Box<dyn Fn(&mut S, IndexPath) -> Option<<S as Surface>::Cell>>;
type StaticViewProvider<S> = Box<dyn Fn(&mut S, &str, IndexPath) -> Option<<S as Surface>::View>>;

/// A section with a fixed number of rows and no identifiers to diff.
///
/// Useful for banners, settings rows and header-only sections that sit
/// between diffable sections.
pub struct StaticSection<S: Surface> {
    item_count: usize,
    cell_provider: Option<StaticCellProvider<S>>,
    supplementary_provider: Option<StaticViewProvider<S>>,
}

impl<S: Surface> StaticSection<S> {
    pub fn new(
        item_count: usize,
        cell_provider: impl Fn(&mut S, IndexPath) -> Option<S::Cell> + 'static,
    ) -> Self {
        Self {
            item_count,
            cell_provider: Some(Box::new(cell_provider)),
            supplementary_provider: None,
        }
    }

    /// A section without rows that only contributes supplementary views.
    pub fn supplementary_only(
        provider: impl Fn(&mut S, &str, IndexPath) -> Option<S::View> + 'static,
    ) -> Self {
        Self {
            item_count: 0,
            cell_provider: None,
            supplementary_provider: Some(Box::new(provider)),
        }
    }

    pub fn with_supplementary_view_provider(
        mut self,
        provider: impl Fn(&mut S, &str, IndexPath) -> Option<S::View> + 'static,
    ) -> Self {
        self.supplementary_provider = Some(Box::new(provider));
        self
    }
}

impl<S: Surface> SectionDataSource<S> for StaticSection<S> {
    fn item_count(&self) -> usize {
        self.item_count
    }

    fn render(&self, surface: &mut S, path: IndexPath) -> S::Cell {
        assert!(
            path.item < self.item_count,
            "item index {} out of bounds for static section with {} items",
            path.item,
            self.item_count
        );
        let cell = self
            .cell_provider
            .as_ref()
            .and_then(|provider| provider(surface, path));
        match cell {
            Some(cell) => cell,
            None => panic!("static section returned no cell at {path}"),
        }
    }

    fn render_supplementary(&self, surface: &mut S, kind: &str, path: IndexPath) -> Option<S::View> {
        let provider = self.supplementary_provider.as_ref()?;
        provider(surface, kind, path)
    }
}

impl<S: Surface> fmt::Debug for StaticSection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSection")
            .field("item_count", &self.item_count)
            .field("has_supplementary_views", &self.supplementary_provider.is_some())
            .finish()
    }
}
