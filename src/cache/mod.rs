//! Cache Module
//!
//! Cluster-shared exam activity caches: the backing map, the generic handler
//! and the exam-specific cache with its empty sentinel.

mod cluster_map;
mod exam_activity;
mod exam_handler;
mod handler;


// Re-export public types
pub use cluster_map::{DistributedMap, KeyLockGuard, LocalClusterMap};
pub use exam_activity::{ExamActivityCache, PopulatedExamActivityCache};
pub use exam_handler::{ExamActivityCacheFactory, ExamActivityCacheHandler, ExamActivityMap};
pub use handler::{CacheFactory, CacheHandler};
