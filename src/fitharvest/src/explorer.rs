use std::{
    io::{Read, Seek},
    path::Path,
    sync::Arc,
};

use fitharvest_algos::{AggregationConfig, DailyAggregator, DailyTable};

use crate::{
    CancelFlag, Dataset, DatasetCache, Decoder, HarvestConfig, HarvestError,
    harvester::{ExportArchive, Selection},
};

/// Loads exports into cached datasets and aggregates them on request.
pub struct Explorer {
    config: HarvestConfig,
    decoder: Decoder,
    cache: DatasetCache,
}

impl Explorer {
    pub fn new(config: HarvestConfig, cancel: CancelFlag) -> Result<Self, HarvestError> {
        let decoder = Decoder::new(config.workers, cancel)?;
        let cache = DatasetCache::new(config.cache_capacity);
        Ok(Self {
            config,
            decoder,
            cache,
        })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.config.selection = selection;
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, HarvestError> {
        let archive = ExportArchive::open(path, self.config.layout.clone())?;
        self.load(archive)
    }

    pub fn load<R: Read + Seek>(
        &mut self,
        mut archive: ExportArchive<R>,
    ) -> Result<Arc<Dataset>, HarvestError> {
        let key = (archive.fingerprint()?, self.config.selection);
        if let Some(dataset) = self.cache.get(&key) {
            debug!("{}: reusing decoded dataset {}", archive.name(), key.0);
            return Ok(dataset);
        }

        let dataset = Arc::new(self.decoder.run(&mut archive, key.1));
        // A cancelled run is incomplete and must not be served again.
        if dataset.diagnostics.files_cancelled == 0 {
            self.cache.insert(key, dataset.clone());
        }
        Ok(dataset)
    }

    pub fn aggregate(
        &self,
        dataset: &Dataset,
        config: AggregationConfig,
    ) -> Result<DailyTable, HarvestError> {
        let table = DailyAggregator::new(config)?.aggregate(&dataset.samples);
        if table.is_empty() {
            warn!("no samples in window {}", table.config.time_window);
        }
        Ok(table)
    }
}
