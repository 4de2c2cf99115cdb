use std::fmt;

/// Two-level coordinate on the presentation surface.
///
/// The root data source speaks in flat surface coordinates; sections only
/// ever see `section == 0` with their local item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    #[inline]
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Coordinate as seen from inside the owning section.
    #[inline]
    pub fn local(self) -> Self {
        Self {
            section: 0,
            item: self.item,
        }
    }

    #[inline]
    pub fn in_section(self, section: usize) -> Self {
        Self {
            section,
            item: self.item,
        }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}
