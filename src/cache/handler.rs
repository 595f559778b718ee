//! Cache Handler Module
//!
//! Generic access layer over a [`DistributedMap`]. It hides the backing store and
//! offers three access paths:
//!
//! - read access that falls back to a sentinel and never touches the store
//! - transient write access for fine-grained, in-place mutation of a live value
//! - atomic read-modify-write of a whole value under the key's lock

use std::sync::Arc;

use crate::cache::DistributedMap;
use crate::error::Result;

// == Cache Factory ==
/// Supplies the values a [`CacheHandler`] needs but cannot invent itself.
pub trait CacheFactory<K>: Send + Sync {
    /// Value type stored per key.
    type Cache: Send + Sync + 'static;

    /// Sentinel returned for keys that have no stored value.
    fn empty_cache_value(&self) -> Arc<Self::Cache>;

    /// Fresh value stored the first time a key is written.
    fn create_distributed_cache_value(&self, key: &K) -> Self::Cache;
}

// == Cache Handler ==
/// Mediates all access to a cluster-shared mapping from `K` to `F::Cache`.
pub struct CacheHandler<K, F>
where
    F: CacheFactory<K>,
{
    map: Arc<dyn DistributedMap<K, F::Cache>>,
    factory: F,
}

impl<K, F> CacheHandler<K, F>
where
    F: CacheFactory<K>,
{
    // == Constructor ==
    /// Creates a handler over `map` using `factory` for defaults and the sentinel.
    pub fn new(map: Arc<dyn DistributedMap<K, F::Cache>>, factory: F) -> Self {
        Self { map, factory }
    }

    // == Read ==
    /// Returns the value for `key`, or the sentinel if none exists.
    ///
    /// Never allocates in or mutates the backing store.
    pub fn get_read_cache_for(&self, key: &K) -> Arc<F::Cache> {
        self.map
            .get(key)
            .unwrap_or_else(|| self.factory.empty_cache_value())
    }

    // == Transient Write ==
    /// Returns the live value for `key`, creating it through the factory if absent.
    ///
    /// Only use the value's own fine-grained mutation methods on the result. A
    /// whole-value swap must go through [`CacheHandler::perform_cache_write`].
    pub fn get_transient_write_cache_for(&self, key: &K) -> Arc<F::Cache> {
        self.map.get_or_create(key, &|key: &K| {
            self.factory.create_distributed_cache_value(key)
        })
    }

    // == Atomic Write ==
    /// Loads the value for `key` (or a fresh default), applies `write` and stores
    /// the result, all while holding the key's lock.
    ///
    /// Returning `None` from `write` removes the key. No other write on the same
    /// key interleaves with this one.
    pub fn perform_cache_write<W>(&self, key: &K, write: W) -> Result<Option<Arc<F::Cache>>>
    where
        K: Clone,
        W: FnOnce(Arc<F::Cache>) -> Result<Option<Arc<F::Cache>>>,
    {
        let _guard = self.map.lock(key);
        let current = self
            .map
            .get(key)
            .unwrap_or_else(|| Arc::new(self.factory.create_distributed_cache_value(key)));
        let updated = write(current)?;
        Ok(self.store(key, updated))
    }

    /// Like [`CacheHandler::perform_cache_write`], but does nothing and returns
    /// `None` when `key` has no stored value.
    pub fn perform_cache_write_if_present<W>(
        &self,
        key: &K,
        write: W,
    ) -> Result<Option<Arc<F::Cache>>>
    where
        K: Clone,
        W: FnOnce(Arc<F::Cache>) -> Result<Option<Arc<F::Cache>>>,
    {
        let _guard = self.map.lock(key);
        let Some(current) = self.map.get(key) else {
            return Ok(None);
        };
        let updated = write(current)?;
        Ok(self.store(key, updated))
    }

    fn store(&self, key: &K, updated: Option<Arc<F::Cache>>) -> Option<Arc<F::Cache>>
    where
        K: Clone,
    {
        match updated {
            Some(value) => {
                self.map.set(key.clone(), Arc::clone(&value));
                Some(value)
            }
            None => {
                self.map.remove(key);
                None
            }
        }
    }

    // == Enumeration ==
    /// Every value currently present in the backing store.
    pub fn get_all_caches(&self) -> Vec<Arc<F::Cache>> {
        self.map.values()
    }

    // == Factories ==
    pub fn empty_cache_value(&self) -> Arc<F::Cache> {
        self.factory.empty_cache_value()
    }

    pub fn create_distributed_cache_value(&self, key: &K) -> F::Cache {
        self.factory.create_distributed_cache_value(key)
    }
}
