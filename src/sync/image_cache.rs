//! Batched image prefetching

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::IMAGE_BATCH_SIZE;
use crate::sync::assets::AssetCache;

/// Outcome of one `ImageCacheManager::cache` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheReport {
    /// URLs that had a fetch attempt
    pub attempted: usize,
    /// Attempts that failed
    pub failed: usize,
    /// Size of each batch, in the order they ran
    pub batches: Vec<usize>,
}

impl CacheReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }
}

/// Warms an asset cache with bounded fan-out.
///
/// URLs are split into batches of `batch_size`. Batches run one after the
/// other; the fetches inside a batch run concurrently and the next batch only
/// starts once every fetch of the current one has resolved. Failed fetches are
/// logged and counted, never propagated.
pub struct ImageCacheManager {
    cache: Arc<dyn AssetCache>,
    batch_size: usize,
}

impl ImageCacheManager {
    pub fn new(cache: Arc<dyn AssetCache>) -> Self {
        Self::with_batch_size(cache, IMAGE_BATCH_SIZE)
    }

    pub fn with_batch_size(cache: Arc<dyn AssetCache>, batch_size: usize) -> Self {
        Self {
            cache,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The underlying asset cache
    pub fn asset_cache(&self) -> &Arc<dyn AssetCache> {
        &self.cache
    }

    /// Attempt every URL once, returning after all attempts resolved
    pub async fn cache(&self, urls: &[String]) -> CacheReport {
        let mut report = CacheReport::default();
        if urls.is_empty() {
            return report;
        }

        let started = Instant::now();
        let batch_count = urls.len().div_ceil(self.batch_size);

        for (index, batch) in urls.chunks(self.batch_size).enumerate() {
            debug!(
                "Caching image batch {}/{} ({} images)",
                index + 1,
                batch_count,
                batch.len()
            );

            let results = join_all(batch.iter().map(|url| async move {
                let result = self.cache.fetch(url).await;
                (url, result)
            }))
            .await;

            let failed = results
                .into_iter()
                .filter(|(url, result)| match result {
                    Ok(()) => false,
                    Err(e) => {
                        warn!("Failed to cache image {}: {}", url, e);
                        true
                    }
                })
                .count();

            report.attempted += batch.len();
            report.failed += failed;
            report.batches.push(batch.len());
        }

        info!(
            "Cached {}/{} images in {:?}",
            report.succeeded(),
            report.attempted,
            started.elapsed()
        );
        report
    }
}
