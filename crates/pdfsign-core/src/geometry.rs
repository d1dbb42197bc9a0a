//! Native page sizes reported as pages render

use std::collections::BTreeMap;

use tracing::debug;

use crate::coords::PageSize;

/// Per-page native size, filled in as the preview renders each page.
/// The first size recorded for a page is kept for the document's lifetime.
#[derive(Debug, Clone, Default)]
pub struct PageGeometry {
    pages: BTreeMap<u32, PageSize>,
}

impl PageGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page's size. Returns `false` if the page was already known
    /// or the size is degenerate.
    pub fn record(&mut self, page: u32, size: PageSize) -> bool {
        if !size.is_usable() || self.pages.contains_key(&page) {
            return false;
        }
        debug!(page, width = size.width, height = size.height, "page geometry captured");
        self.pages.insert(page, size);
        true
    }

    pub fn get(&self, page: u32) -> Option<PageSize> {
        self.pages.get(&page).copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_wins() {
        let mut geometry = PageGeometry::new();
        assert!(geometry.record(1, PageSize::letter()));
        assert!(!geometry.record(1, PageSize::a4()));
        assert_eq!(geometry.get(1), Some(PageSize::letter()));
        assert_eq!(geometry.get(2), None);
    }

    #[test]
    fn test_degenerate_sizes_not_recorded() {
        let mut geometry = PageGeometry::new();
        assert!(!geometry.record(1, PageSize::new(0.0, 0.0)));
        assert!(!geometry.record(1, PageSize::new(-612.0, 792.0)));
        assert!(!geometry.record(1, PageSize::new(f64::INFINITY, 792.0)));
        assert!(geometry.is_empty());
        assert!(geometry.record(1, PageSize::letter()));
    }

    #[test]
    fn test_clear_forgets_pages() {
        let mut geometry = PageGeometry::new();
        geometry.record(1, PageSize::letter());
        geometry.record(2, PageSize::a4());
        assert_eq!(geometry.len(), 2);
        geometry.clear();
        assert!(geometry.is_empty());
    }
}
