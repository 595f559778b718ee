//! Exam Activity Cache Handler
//!
//! [`CacheHandler`] keyed by [`ExamId`] and wired to [`ExamActivityCache`] values.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheFactory, CacheHandler, DistributedMap, ExamActivityCache, LocalClusterMap};
use crate::error::Result;
use crate::models::ExamId;

/// Creates populated exam caches and hands out the shared sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamActivityCacheFactory;

impl CacheFactory<ExamId> for ExamActivityCacheFactory {
    type Cache = ExamActivityCache;

    fn empty_cache_value(&self) -> Arc<ExamActivityCache> {
        ExamActivityCache::empty()
    }

    fn create_distributed_cache_value(&self, exam_id: &ExamId) -> ExamActivityCache {
        debug!("Creating exam activity cache for exam {}", exam_id);
        ExamActivityCache::populated(*exam_id)
    }
}

/// Cluster map type backing exam activity caches.
pub type ExamActivityMap = dyn DistributedMap<ExamId, ExamActivityCache>;

/// Handler for exam activity caches.
pub type ExamActivityCacheHandler = CacheHandler<ExamId, ExamActivityCacheFactory>;

impl ExamActivityCacheHandler {
    /// Creates a handler over a (possibly shared) cluster map.
    pub fn with_map(map: Arc<ExamActivityMap>) -> Self {
        Self::new(map, ExamActivityCacheFactory)
    }

    /// Creates a handler over a fresh map owned by this process alone.
    pub fn local() -> Self {
        Self::with_map(Arc::new(LocalClusterMap::<ExamId, ExamActivityCache>::new()))
    }

    /// Empties the activity map of `exam_id` if a cache exists.
    ///
    /// Never creates a cache. Returns whether one was present.
    pub fn clear(&self, exam_id: ExamId) -> Result<bool> {
        let cleared = self.perform_cache_write_if_present(&exam_id, |cache| {
            cache.clear()?;
            Ok(Some(cache))
        })?;
        Ok(cleared.is_some())
    }
}
