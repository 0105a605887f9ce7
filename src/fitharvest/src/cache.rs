use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;

use crate::{
    Dataset,
    harvester::{ArchiveFingerprint, Selection},
};

pub type DatasetKey = (ArchiveFingerprint, Selection);

/// Decoded datasets by archive contents and selection, so re-aggregating
/// never harvests or decodes again.
pub struct DatasetCache {
    datasets: LruCache<DatasetKey, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            datasets: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, key: &DatasetKey) -> Option<Arc<Dataset>> {
        self.datasets.get(key).cloned()
    }

    pub fn insert(&mut self, key: DatasetKey, dataset: Arc<Dataset>) {
        if let Some((evicted, _)) = self.datasets.push(key, dataset) {
            if evicted != key {
                debug!("evicted dataset {} ({})", evicted.0, evicted.1);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{export, zip_bytes};

    fn fingerprint(entries: usize) -> ArchiveFingerprint {
        let files = (0..entries)
            .map(|i| (format!("{i}.fit"), vec![0_u8]))
            .collect::<Vec<_>>();
        export(&[("UploadedFiles_0-_Part1.zip", zip_bytes(&files))])
            .fingerprint()
            .unwrap()
    }

    #[test]
    fn keyed_by_fingerprint_and_selection() {
        let mut cache = DatasetCache::new(4);
        let key = (fingerprint(1), Selection::All);
        cache.insert(key, Arc::new(Dataset::default()));

        assert!(cache.get(&key).is_some());
        assert!(cache.get(&(fingerprint(1), Selection::Newest(5))).is_none());
        assert!(cache.get(&(fingerprint(2), Selection::All)).is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = DatasetCache::new(2);
        let (a, b, c) = (
            (fingerprint(1), Selection::All),
            (fingerprint(2), Selection::All),
            (fingerprint(3), Selection::All),
        );
        cache.insert(a, Arc::new(Dataset::default()));
        cache.insert(b, Arc::new(Dataset::default()));
        cache.get(&a);
        cache.insert(c, Arc::new(Dataset::default()));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut cache = DatasetCache::new(0);
        cache.insert((fingerprint(1), Selection::All), Arc::new(Dataset::default()));
        assert_eq!(cache.len(), 1);
    }
}
