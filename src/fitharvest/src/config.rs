use crate::harvester::{ArchiveLayout, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub layout: ArchiveLayout,
    pub selection: Selection,
    /// Decode threads, 0 for one per core.
    pub workers: usize,
    pub cache_capacity: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            layout: ArchiveLayout::default(),
            selection: Selection::All,
            workers: 0,
            cache_capacity: 4,
        }
    }
}

impl HarvestConfig {
    pub fn with_layout(self, layout: ArchiveLayout) -> Self {
        Self { layout, ..self }
    }

    pub fn with_selection(self, selection: Selection) -> Self {
        Self { selection, ..self }
    }

    pub fn with_workers(self, workers: usize) -> Self {
        Self { workers, ..self }
    }

    pub fn with_cache_capacity(self, cache_capacity: usize) -> Self {
        Self {
            cache_capacity,
            ..self
        }
    }
}
